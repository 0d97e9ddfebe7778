//! Auth handlers — registration and login.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use zingram_core::error::AppError;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::AuthResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let hash = state.password_hasher.hash_password_async(&req.password).await?;
    let user = state
        .users
        .register(&req.name, &req.username, &req.phone, hash)?;
    let token = state.tokens.issue(user.id)?;

    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user = state
        .users
        .find_by_phone(&req.phone)
        .ok_or_else(|| AppError::unauthorized("Unknown phone number or wrong password"))?;

    let valid = state
        .password_hasher
        .verify_password_async(&req.password, &user.password_hash)
        .await?;
    if !valid {
        return Err(AppError::unauthorized("Unknown phone number or wrong password").into());
    }

    let token = state.tokens.issue(user.id)?;

    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}

//! Application state shared across all handlers.

use std::sync::Arc;

use zingram_auth::jwt::TokenService;
use zingram_auth::password::PasswordHasher;
use zingram_core::config::AppConfig;
use zingram_relay::RelayEngine;
use zingram_store::UserStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped (or internally `Arc`-backed) for cheap cloning across
/// tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Registered-user directory.
    pub users: Arc<UserStore>,
    /// The presence-and-signaling relay engine.
    pub relay: RelayEngine,
    /// Bearer token issuance/verification.
    pub tokens: Arc<TokenService>,
    /// Argon2id password hasher.
    pub password_hasher: Arc<PasswordHasher>,
}

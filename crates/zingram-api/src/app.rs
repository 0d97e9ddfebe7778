//! Application builder — wires config, state, and router together.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use zingram_auth::jwt::TokenService;
use zingram_auth::password::PasswordHasher;
use zingram_core::config::AppConfig;
use zingram_core::error::AppError;
use zingram_relay::RelayEngine;
use zingram_store::UserStore;

use crate::router::build_router;
use crate::state::AppState;

/// Constructs the full application state from configuration.
pub fn build_state(config: AppConfig) -> AppState {
    let tokens = Arc::new(TokenService::new(&config.auth));
    let relay = RelayEngine::new(config.relay.clone(), tokens.clone());

    AppState {
        config: Arc::new(config),
        users: Arc::new(UserStore::new()),
        relay,
        tokens,
        password_hasher: Arc::new(PasswordHasher::new()),
    }
}

/// Builds the complete Axum application.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the relay server until ctrl-c.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = build_state(config);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "Zingram relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

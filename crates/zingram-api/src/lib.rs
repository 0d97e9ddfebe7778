//! # zingram-api
//!
//! The outward-facing surface of the Zingram relay: HTTP endpoints for
//! registration, login, user search, and health, plus the `/ws` upgrade
//! that hands connections to the relay engine.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;

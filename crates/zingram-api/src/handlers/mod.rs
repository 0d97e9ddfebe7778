//! HTTP and WebSocket handlers.

pub mod auth;
pub mod health;
pub mod user;
pub mod ws;

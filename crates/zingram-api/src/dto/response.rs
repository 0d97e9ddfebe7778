//! Response DTOs.

use serde::{Deserialize, Serialize};

use zingram_store::PublicProfile;

/// Successful registration/login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer credential for the WebSocket `authenticate` event.
    pub token: String,
    /// The account's public profile.
    pub user: PublicProfile,
}

/// One user-search hit: a public profile annotated with live presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched profile.
    #[serde(flatten)]
    pub profile: PublicProfile,
    /// Whether the user currently has a reachable connection.
    pub online: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process is serving.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Open WebSocket connections, authenticated or not.
    pub connections: usize,
    /// Authenticated online users.
    pub online_users: usize,
}

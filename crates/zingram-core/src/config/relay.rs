//! Relay engine configuration.

use serde::{Deserialize, Serialize};

/// Relay (WebSocket event routing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Per-connection outbound buffer size. A full buffer drops events
    /// rather than blocking the router.
    #[serde(default = "default_send_buffer")]
    pub send_buffer_size: usize,
    /// Maximum accepted inbound frame size in bytes.
    #[serde(default = "default_max_frame")]
    pub max_frame_bytes: usize,
    /// Maximum chat message text length in characters.
    #[serde(default = "default_max_text")]
    pub max_text_length: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            send_buffer_size: default_send_buffer(),
            max_frame_bytes: default_max_frame(),
            max_text_length: default_max_text(),
        }
    }
}

fn default_send_buffer() -> usize {
    256
}

fn default_max_frame() -> usize {
    65_536
}

fn default_max_text() -> usize {
    4_096
}

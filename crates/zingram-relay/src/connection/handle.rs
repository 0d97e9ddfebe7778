//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

use zingram_core::types::ConnectionId;

use crate::message::types::ServerEvent;

/// A handle to a single live connection.
///
/// Owns the sender half of the connection's outbound channel; the WebSocket
/// task drains the receiver half and writes frames to the socket. A handle
/// is the only way any component may push data to a client.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound events.
    sender: mpsc::Sender<ServerEvent>,
    /// Whether the connection is still usable.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Creates a new handle wrapping an outbound channel sender.
    pub fn new(sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: ConnectionId::new(),
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
        }
    }

    /// Pushes an event to this connection.
    ///
    /// Best-effort: a full buffer drops the event, a closed channel marks
    /// the handle dead. Either way the caller gets `false` and must treat
    /// the target as unreachable — never an error.
    pub fn send(&self, event: ServerEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Outbound buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Whether the connection is still alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Marks the connection permanently unusable for forwarding.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

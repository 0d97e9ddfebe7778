//! Append-only in-memory chat message log.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zingram_core::types::{MessageId, UserId};

/// An immutable relayed chat message record.
///
/// `id` and `timestamp` are assigned by the relay at send time and are
/// never client-supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned message ID.
    pub id: MessageId,
    /// Verified sender identity.
    pub from: UserId,
    /// Target identity.
    pub to: UserId,
    /// Message text.
    pub text: String,
    /// Content kind, `"text"` unless the client says otherwise.
    #[serde(rename = "type")]
    pub kind: String,
    /// Server-assigned send time.
    pub timestamp: DateTime<Utc>,
    /// Read flag, always false at creation.
    pub read: bool,
}

impl ChatMessage {
    /// Creates a finalized message record with server-assigned id/timestamp.
    pub fn new(from: UserId, to: UserId, text: String, kind: Option<String>) -> Self {
        Self {
            id: MessageId::new(),
            from,
            to,
            text,
            kind: kind.unwrap_or_else(|| "text".to_string()),
            timestamp: Utc::now(),
            read: false,
        }
    }
}

/// Append-only message log retained for the process lifetime.
///
/// Write-only from the relay's perspective: there is no query interface
/// and no expiry.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Mutex<Vec<ChatMessage>>,
}

impl MessageLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message record.
    pub fn append(&self, message: ChatMessage) {
        self.entries
            .lock()
            .expect("message log lock poisoned")
            .push(message);
    }

    /// Number of logged messages.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("message log lock poisoned").len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Presence directory — the live mapping from authenticated identity to its
//! single reachable connection.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use zingram_core::types::{ConnectionId, UserId};

use crate::connection::handle::ConnectionHandle;

/// Maps each authenticated user to the one connection events are routed to.
///
/// Invariant: at most one entry per identity. A second authentication for
/// the same identity overwrites the entry; the superseded connection is no
/// longer reachable through lookups. Every operation is individually atomic
/// (dashmap shard lock); no compound operation needs cross-call atomicity.
#[derive(Debug, Default)]
pub struct PresenceDirectory {
    entries: DashMap<UserId, Arc<ConnectionHandle>>,
}

impl PresenceDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the mapping for `identity`.
    ///
    /// Returns the superseded handle when a different connection previously
    /// owned the entry.
    pub fn register(
        &self,
        identity: UserId,
        handle: Arc<ConnectionHandle>,
    ) -> Option<Arc<ConnectionHandle>> {
        let conn_id = handle.id;
        let previous = self.entries.insert(identity, handle);

        debug!(user_id = %identity, conn_id = %conn_id, "Presence registered");

        previous.filter(|old| old.id != conn_id)
    }

    /// Removes the mapping for `identity` only if `conn_id` still owns it.
    ///
    /// Returns whether an entry was removed. A connection that was
    /// superseded by a reconnect no longer owns the entry, so its
    /// disconnect is a no-op here — that is what prevents spurious offline
    /// broadcasts.
    pub fn unregister(&self, identity: UserId, conn_id: ConnectionId) -> bool {
        let removed = self
            .entries
            .remove_if(&identity, |_, handle| handle.id == conn_id)
            .is_some();

        if removed {
            debug!(user_id = %identity, conn_id = %conn_id, "Presence unregistered");
        }

        removed
    }

    /// Resolves the current connection for `identity`, if any.
    pub fn lookup(&self, identity: UserId) -> Option<Arc<ConnectionHandle>> {
        self.entries.get(&identity).map(|entry| entry.value().clone())
    }

    /// Whether `identity` currently has a reachable connection.
    pub fn is_online(&self, identity: UserId) -> bool {
        self.entries.contains_key(&identity)
    }

    /// Number of authenticated, reachable users.
    pub fn online_count(&self) -> usize {
        self.entries.len()
    }
}

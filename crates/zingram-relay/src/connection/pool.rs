//! Pool of all live connections, authenticated or not.
//!
//! Presence broadcasts (`user_online` / `user_offline`) go to every
//! connection, including ones that have not yet authenticated, so the pool
//! is tracked separately from the presence directory.

use std::sync::Arc;

use dashmap::DashMap;

use zingram_core::types::ConnectionId;

use crate::message::types::ServerEvent;

use super::handle::ConnectionHandle;

/// Thread-safe registry of every open connection.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Removes a connection, returning its handle if it was present.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(conn_id).map(|(_, handle)| handle)
    }

    /// Looks up a connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Pushes an event to every open connection, best-effort.
    pub fn broadcast(&self, event: &ServerEvent) {
        for entry in self.by_id.iter() {
            entry.value().send(event.clone());
        }
    }

    /// Number of open connections.
    pub fn count(&self) -> usize {
        self.by_id.len()
    }
}

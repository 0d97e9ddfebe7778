//! One live client connection and its optional attached identity.

use std::sync::Arc;

use zingram_core::types::{ConnectionId, UserId};

use crate::connection::handle::ConnectionHandle;

/// A relay session: the connection handle plus the identity attached after
/// a successful `authenticate` event.
///
/// Created by [`crate::RelayEngine::connect`]; the WebSocket task owns it
/// for the connection's lifetime and hands it back on disconnect.
#[derive(Debug)]
pub struct Session {
    handle: Arc<ConnectionHandle>,
    identity: Option<UserId>,
}

impl Session {
    /// Creates an unauthenticated session around a connection handle.
    pub(crate) fn new(handle: Arc<ConnectionHandle>) -> Self {
        Self {
            handle,
            identity: None,
        }
    }

    /// The connection's unique ID.
    pub fn connection_id(&self) -> ConnectionId {
        self.handle.id
    }

    /// The verified identity, if authentication has happened.
    pub fn identity(&self) -> Option<UserId> {
        self.identity
    }

    /// Whether this session has authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The connection handle.
    pub fn handle(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }

    /// Attaches a verified identity, returning the previous one if the
    /// session re-authenticated as someone else.
    pub(crate) fn attach_identity(&mut self, identity: UserId) -> Option<UserId> {
        self.identity.replace(identity).filter(|old| *old != identity)
    }
}

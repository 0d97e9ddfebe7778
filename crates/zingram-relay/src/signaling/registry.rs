//! Per-call signaling state, keyed by the pair of identities.
//!
//! The router consults this registry to sequence the invite → answer →
//! candidate-exchange → terminate handshake: out-of-order events are
//! rejected instead of forwarded, and an abrupt disconnect proactively
//! ends every call the disconnecting identity was part of.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use zingram_core::types::UserId;

use crate::message::types::CallKind;

/// Unordered identity pair identifying one call exchange.
///
/// At most one call may exist between any two identities at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CallKey(UserId, UserId);

impl CallKey {
    fn new(a: UserId, b: UserId) -> Self {
        if a.as_uuid() <= b.as_uuid() {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    fn involves(&self, user: UserId) -> bool {
        self.0 == user || self.1 == user
    }
}

/// Phase of a tracked call exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// Invite forwarded, answer pending.
    Invited,
    /// Answer forwarded; media presumed flowing.
    Answered,
}

/// One tracked call exchange.
#[derive(Debug, Clone)]
pub struct CallSession {
    /// Who placed the call.
    pub caller: UserId,
    /// Who was invited.
    pub callee: UserId,
    /// Audio or video.
    pub kind: CallKind,
    /// Current handshake phase.
    pub phase: CallPhase,
    /// When the invite was forwarded.
    pub started_at: DateTime<Utc>,
}

impl CallSession {
    /// The other party of the call, from `user`'s point of view.
    pub fn counterpart(&self, user: UserId) -> UserId {
        if self.caller == user { self.callee } else { self.caller }
    }
}

/// Registry of all in-flight call exchanges.
#[derive(Debug, Default)]
pub struct CallRegistry {
    calls: DashMap<CallKey, CallSession>,
}

impl CallRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new invite from `caller` to `callee`.
    ///
    /// Fails when a call between the pair already exists (duplicate
    /// invites are rejected, not forwarded).
    pub fn try_invite(&self, caller: UserId, callee: UserId, kind: CallKind) -> bool {
        let key = CallKey::new(caller, callee);
        match self.calls.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(CallSession {
                    caller,
                    callee,
                    kind,
                    phase: CallPhase::Invited,
                    started_at: Utc::now(),
                });
                debug!(caller = %caller, callee = %callee, "Call invited");
                true
            }
        }
    }

    /// Transitions the call to `Answered`.
    ///
    /// Valid only from the callee of a currently `Invited` call; anything
    /// else (no call, wrong party, duplicate answer) is rejected.
    pub fn answer(&self, answerer: UserId, caller: UserId) -> bool {
        let key = CallKey::new(answerer, caller);
        match self.calls.get_mut(&key) {
            Some(mut session)
                if session.callee == answerer && session.phase == CallPhase::Invited =>
            {
                session.phase = CallPhase::Answered;
                debug!(caller = %caller, callee = %answerer, "Call answered");
                true
            }
            _ => false,
        }
    }

    /// Whether a call exists between the pair, in either phase.
    ///
    /// Trickle ICE runs from the moment the invite is out, so candidates
    /// are deliverable in both phases.
    pub fn is_active(&self, a: UserId, b: UserId) -> bool {
        self.calls.contains_key(&CallKey::new(a, b))
    }

    /// Removes the call between the pair, if any.
    pub fn end(&self, a: UserId, b: UserId) -> Option<CallSession> {
        self.calls
            .remove(&CallKey::new(a, b))
            .map(|(_, session)| session)
    }

    /// Removes every call involving `user`, returning the torn-down
    /// sessions so the router can notify each counterpart.
    pub fn end_all_for(&self, user: UserId) -> Vec<CallSession> {
        let keys: Vec<CallKey> = self
            .calls
            .iter()
            .filter(|entry| entry.key().involves(user))
            .map(|entry| *entry.key())
            .collect();

        keys.into_iter()
            .filter_map(|key| self.calls.remove(&key).map(|(_, session)| session))
            .collect()
    }

    /// Number of in-flight calls.
    pub fn active_count(&self) -> usize {
        self.calls.len()
    }
}

//! Event router — stateless forwarding of tagged events to the resolved
//! target connection.

use std::sync::Arc;

use tracing::{debug, warn};

use zingram_core::config::RelayConfig;
use zingram_core::types::UserId;
use zingram_store::{ChatMessage, MessageLog};

use crate::connection::handle::ConnectionHandle;
use crate::message::types::{ClientEvent, ServerEvent};
use crate::message::validator;
use crate::presence::directory::PresenceDirectory;
use crate::signaling::registry::CallRegistry;

/// Routes inbound events from an authenticated session to their targets.
///
/// Every forwarded event carries `from` stamped with the session's verified
/// identity; a client-asserted sender never reaches the wire. Unreachable
/// targets drop the event silently — the only event kind that acknowledges
/// anything back to the sender is the chat message.
#[derive(Debug)]
pub struct EventRouter {
    presence: Arc<PresenceDirectory>,
    calls: Arc<CallRegistry>,
    log: Arc<MessageLog>,
    config: RelayConfig,
}

impl EventRouter {
    /// Creates a router over the shared presence directory, call registry,
    /// and message log.
    pub fn new(
        presence: Arc<PresenceDirectory>,
        calls: Arc<CallRegistry>,
        log: Arc<MessageLog>,
        config: RelayConfig,
    ) -> Self {
        Self {
            presence,
            calls,
            log,
            config,
        }
    }

    /// Dispatches one authenticated inbound event.
    ///
    /// `from` is the session's verified identity; `sender` is its handle,
    /// used only for chat acks and rejection notices.
    pub fn route(&self, from: UserId, sender: &ConnectionHandle, event: ClientEvent) {
        match event {
            ClientEvent::Authenticate { .. } => {
                // Session lifecycle concern; the engine consumes it first.
                debug!(user_id = %from, "Duplicate authenticate reached router, ignoring");
            }
            ClientEvent::SendMessage { to, text, kind } => {
                self.send_message(from, sender, to, text, kind);
            }
            ClientEvent::CallUser {
                to,
                call_type,
                offer,
            } => {
                self.call_user(from, sender, to, call_type, offer);
            }
            ClientEvent::CallAnswer { to, answer } => {
                self.call_answer(from, to, answer);
            }
            ClientEvent::IceCandidate { to, candidate } => {
                self.ice_candidate(from, to, candidate);
            }
            ClientEvent::EndCall { to } => {
                self.end_call(from, to);
            }
            ClientEvent::Typing { to } => {
                self.typing(from, to);
            }
        }
    }

    /// Chat message: stamp id/timestamp, log, forward, always ack.
    fn send_message(
        &self,
        from: UserId,
        sender: &ConnectionHandle,
        to: UserId,
        text: String,
        kind: Option<String>,
    ) {
        if let Err(e) = validator::validate_text(&text, self.config.max_text_length) {
            sender.send(ServerEvent::error("invalid_message", e.message));
            return;
        }

        let message = ChatMessage::new(from, to, text, kind);
        self.log.append(message.clone());

        match self.presence.lookup(to) {
            Some(target) => {
                target.send(ServerEvent::NewMessage {
                    message: message.clone(),
                });
            }
            None => {
                debug!(from = %from, to = %to, "Recipient offline, message not delivered live");
            }
        }

        // The ack goes out whether or not the recipient was reachable.
        sender.send(ServerEvent::MessageSent { message });
    }

    /// Call invite: reject duplicates, forward only to a reachable callee.
    fn call_user(
        &self,
        from: UserId,
        sender: &ConnectionHandle,
        to: UserId,
        call_type: crate::message::types::CallKind,
        offer: serde_json::Value,
    ) {
        let Some(target) = self.presence.lookup(to) else {
            // Nothing is forwarded and nothing is surfaced to the caller.
            warn!(from = %from, to = %to, "Call invite to offline user dropped");
            return;
        };

        if !self.calls.try_invite(from, to, call_type) {
            sender.send(ServerEvent::error(
                "call_in_progress",
                "A call between these users is already in progress",
            ));
            return;
        }

        target.send(ServerEvent::IncomingCall {
            from,
            call_type,
            offer,
        });
    }

    /// Call answer: valid only from the callee of a pending invite.
    fn call_answer(&self, from: UserId, to: UserId, answer: serde_json::Value) {
        if !self.calls.answer(from, to) {
            warn!(from = %from, to = %to, "Out-of-order call answer dropped");
            return;
        }

        if let Some(target) = self.presence.lookup(to) {
            target.send(ServerEvent::CallAnswered { from, answer });
        }
    }

    /// Transport candidate: deliverable while a call exists between the pair.
    fn ice_candidate(&self, from: UserId, to: UserId, candidate: serde_json::Value) {
        if !self.calls.is_active(from, to) {
            debug!(from = %from, to = %to, "Candidate without active call dropped");
            return;
        }

        if let Some(target) = self.presence.lookup(to) {
            target.send(ServerEvent::IceCandidate { from, candidate });
        }
    }

    /// Explicit termination by either party.
    fn end_call(&self, from: UserId, to: UserId) {
        if self.calls.end(from, to).is_none() {
            debug!(from = %from, to = %to, "end_call without active call dropped");
            return;
        }

        if let Some(target) = self.presence.lookup(to) {
            target.send(ServerEvent::CallEnded { from });
        }
    }

    /// Typing indicator, fire-and-forget.
    fn typing(&self, from: UserId, to: UserId) {
        if let Some(target) = self.presence.lookup(to) {
            target.send(ServerEvent::UserTyping { from });
        }
    }

    /// Tears down every call involving a disconnecting identity and
    /// proactively notifies each still-connected counterpart — including
    /// the callee of a not-yet-answered invite.
    pub fn teardown_calls(&self, user: UserId) {
        for session in self.calls.end_all_for(user) {
            let counterpart = session.counterpart(user);
            if let Some(target) = self.presence.lookup(counterpart) {
                target.send(ServerEvent::CallEnded { from: user });
            }
            debug!(
                user = %user,
                counterpart = %counterpart,
                "Call ended by disconnect"
            );
        }
    }
}

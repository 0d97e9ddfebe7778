//! Top-level relay engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use zingram_auth::jwt::TokenService;
use zingram_core::config::RelayConfig;
use zingram_core::types::UserId;
use zingram_store::MessageLog;

use crate::connection::authenticator::WsAuthenticator;
use crate::connection::handle::ConnectionHandle;
use crate::connection::pool::ConnectionPool;
use crate::message::types::{ClientEvent, ServerEvent};
use crate::message::validator;
use crate::presence::directory::PresenceDirectory;
use crate::router::EventRouter;
use crate::session::Session;
use crate::signaling::registry::CallRegistry;

/// Central relay engine coordinating sessions, presence, routing, and
/// call signaling.
///
/// All shared state is owned here and handed out behind `Arc`; nothing is
/// process-global. One instance per server process.
#[derive(Debug, Clone)]
pub struct RelayEngine {
    pool: Arc<ConnectionPool>,
    presence: Arc<PresenceDirectory>,
    router: Arc<EventRouter>,
    log: Arc<MessageLog>,
    authenticator: WsAuthenticator,
    config: RelayConfig,
}

impl RelayEngine {
    /// Creates a new engine with all subsystems.
    pub fn new(config: RelayConfig, tokens: Arc<TokenService>) -> Self {
        let pool = Arc::new(ConnectionPool::new());
        let presence = Arc::new(PresenceDirectory::new());
        let calls = Arc::new(CallRegistry::new());
        let log = Arc::new(MessageLog::new());
        let router = Arc::new(EventRouter::new(
            presence.clone(),
            calls,
            log.clone(),
            config.clone(),
        ));

        info!("Relay engine initialized");

        Self {
            pool,
            presence,
            router,
            log,
            authenticator: WsAuthenticator::new(tokens),
            config,
        }
    }

    /// Accepts a new connection.
    ///
    /// Returns the unauthenticated session and the receiver half of its
    /// outbound channel; the caller drains the receiver into the socket.
    pub fn connect(&self) -> (Session, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.config.send_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(tx));
        self.pool.add(handle.clone());

        info!(conn_id = %handle.id, "Connection established");

        (Session::new(handle), rx)
    }

    /// Processes one raw inbound frame from a session.
    ///
    /// Synchronous with respect to the caller: every directory mutation,
    /// lookup, and forward completes before this returns.
    pub fn handle_frame(&self, session: &mut Session, raw: &str) {
        if let Err(e) = validator::validate_frame(raw, self.config.max_frame_bytes) {
            session
                .handle()
                .send(ServerEvent::error("invalid_message", e.message));
            return;
        }

        let event: ClientEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(conn_id = %session.connection_id(), error = %e, "Malformed frame dropped");
                session.handle().send(ServerEvent::error(
                    "invalid_message",
                    format!("Failed to parse event: {e}"),
                ));
                return;
            }
        };

        match event {
            ClientEvent::Authenticate { token } => self.authenticate(session, &token),
            other => match session.identity() {
                Some(from) => self.router.route(from, session.handle(), other),
                None => {
                    // Unauthenticated routing is silently ineffective.
                    warn!(
                        conn_id = %session.connection_id(),
                        "Event from unauthenticated session dropped"
                    );
                }
            },
        }
    }

    /// Verifies a bearer token and registers the session's presence.
    ///
    /// On failure the connection stays open and unauthenticated. On
    /// success: the identity attaches to the session, a superseded
    /// connection for the same identity is notified and cut off, and
    /// `user_online` is broadcast to every connection — exactly once per
    /// registration.
    fn authenticate(&self, session: &mut Session, token: &str) {
        let user_id = match self.authenticator.authenticate(token) {
            Ok(id) => id,
            Err(e) => {
                warn!(conn_id = %session.connection_id(), error = %e, "Authentication failed");
                session
                    .handle()
                    .send(ServerEvent::error("unauthenticated", e.message));
                return;
            }
        };

        // Re-authentication as a different user releases the old identity.
        if let Some(old_identity) = session.attach_identity(user_id) {
            if self.presence.unregister(old_identity, session.connection_id()) {
                self.router.teardown_calls(old_identity);
                self.pool.broadcast(&ServerEvent::UserOffline {
                    user_id: old_identity,
                });
            }
        }

        if let Some(superseded) = self.presence.register(user_id, session.handle().clone()) {
            info!(user_id = %user_id, old_conn = %superseded.id, "Superseding prior connection");
            superseded.send(ServerEvent::SessionReplaced);
            superseded.mark_closed();
        }

        session.handle().send(ServerEvent::Authenticated { user_id });
        self.pool.broadcast(&ServerEvent::UserOnline { user_id });

        info!(
            conn_id = %session.connection_id(),
            user_id = %user_id,
            "Session authenticated"
        );
    }

    /// Tears down a session on disconnect.
    ///
    /// Removes the presence entry only if this connection still owns it
    /// (a superseded connection's drop must not broadcast offline), ends
    /// the identity's calls, and invalidates the handle for any in-flight
    /// forwards.
    pub fn disconnect(&self, session: &Session) {
        let conn_id = session.connection_id();
        self.pool.remove(&conn_id);
        session.handle().mark_closed();

        if let Some(user_id) = session.identity() {
            if self.presence.unregister(user_id, conn_id) {
                self.pool.broadcast(&ServerEvent::UserOffline { user_id });
                self.router.teardown_calls(user_id);
                info!(conn_id = %conn_id, user_id = %user_id, "User disconnected");
                return;
            }
        }

        info!(conn_id = %conn_id, "Connection closed");
    }

    /// Whether `user` currently has a reachable connection.
    pub fn is_online(&self, user: UserId) -> bool {
        self.presence.is_online(user)
    }

    /// Number of open connections, authenticated or not.
    pub fn connection_count(&self) -> usize {
        self.pool.count()
    }

    /// Number of authenticated online users.
    pub fn online_count(&self) -> usize {
        self.presence.online_count()
    }

    /// The append-only message log.
    pub fn message_log(&self) -> &Arc<MessageLog> {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::CallKind;
    use zingram_core::config::AuthConfig;

    struct Harness {
        engine: RelayEngine,
        tokens: Arc<TokenService>,
    }

    struct Client {
        session: Session,
        rx: mpsc::Receiver<ServerEvent>,
        user_id: UserId,
    }

    impl Harness {
        fn new() -> Self {
            let tokens = Arc::new(TokenService::new(&AuthConfig {
                jwt_secret: "relay-test-secret".to_string(),
                ..Default::default()
            }));
            Self {
                engine: RelayEngine::new(RelayConfig::default(), tokens.clone()),
                tokens,
            }
        }

        fn connect_and_auth(&self, user_id: UserId) -> Client {
            let (mut session, rx) = self.engine.connect();
            let token = self.tokens.issue(user_id).unwrap();
            let frame = serde_json::json!({ "type": "authenticate", "token": token });
            self.engine
                .handle_frame(&mut session, &frame.to_string());
            let mut client = Client {
                session,
                rx,
                user_id,
            };
            assert!(matches!(
                client.next(),
                Some(ServerEvent::Authenticated { .. })
            ));
            client
        }

        fn send(&self, client: &mut Client, frame: serde_json::Value) {
            self.engine
                .handle_frame(&mut client.session, &frame.to_string());
        }
    }

    impl Client {
        fn next(&mut self) -> Option<ServerEvent> {
            self.rx.try_recv().ok()
        }

        /// Drains queued events, returning the first matching one.
        fn find(&mut self, pred: impl Fn(&ServerEvent) -> bool) -> Option<ServerEvent> {
            while let Ok(event) = self.rx.try_recv() {
                if pred(&event) {
                    return Some(event);
                }
            }
            None
        }
    }

    #[test]
    fn authentication_registers_presence_and_broadcasts_online() {
        let h = Harness::new();
        let alice_id = UserId::new();
        let mut alice = h.connect_and_auth(alice_id);

        assert!(h.engine.is_online(alice_id));

        let bob = h.connect_and_auth(UserId::new());
        // Alice sees bob's online broadcast.
        assert!(
            alice
                .find(|e| matches!(e, ServerEvent::UserOnline { user_id } if *user_id == bob.user_id))
                .is_some()
        );
    }

    #[test]
    fn bad_token_leaves_connection_open_and_unauthenticated() {
        let h = Harness::new();
        let (mut session, mut rx) = h.engine.connect();

        let frame = serde_json::json!({ "type": "authenticate", "token": "garbage" });
        h.engine.handle_frame(&mut session, &frame.to_string());

        assert!(!session.is_authenticated());
        assert!(matches!(
            rx.try_recv().unwrap(),
            ServerEvent::Error { code, .. } if code == "unauthenticated"
        ));
        // Connection still open in the pool.
        assert_eq!(h.engine.connection_count(), 1);
    }

    #[test]
    fn message_delivered_with_server_assigned_id_and_acked() {
        let h = Harness::new();
        let (alice_id, bob_id) = (UserId::new(), UserId::new());
        let mut alice = h.connect_and_auth(alice_id);
        let mut bob = h.connect_and_auth(bob_id);

        h.send(
            &mut alice,
            serde_json::json!({ "type": "send_message", "to": bob_id, "text": "hi" }),
        );

        let delivered = bob
            .find(|e| matches!(e, ServerEvent::NewMessage { .. }))
            .unwrap();
        let acked = alice
            .find(|e| matches!(e, ServerEvent::MessageSent { .. }))
            .unwrap();

        let (ServerEvent::NewMessage { message: d }, ServerEvent::MessageSent { message: a }) =
            (delivered, acked)
        else {
            unreachable!()
        };

        // The sender is stamped from the verified identity and the ack
        // carries the same server-assigned id.
        assert_eq!(d.from, alice_id);
        assert_eq!(d.text, "hi");
        assert_eq!(d.id, a.id);
        assert_eq!(h.engine.message_log().len(), 1);
    }

    #[test]
    fn message_to_offline_user_acked_but_not_delivered() {
        let h = Harness::new();
        let mut alice = h.connect_and_auth(UserId::new());
        let ghost = UserId::new();

        h.send(
            &mut alice,
            serde_json::json!({ "type": "send_message", "to": ghost, "text": "anyone?" }),
        );

        assert!(
            alice
                .find(|e| matches!(e, ServerEvent::MessageSent { .. }))
                .is_some()
        );
        assert_eq!(h.engine.message_log().len(), 1);
    }

    #[test]
    fn typing_indicator_carries_verified_sender() {
        let h = Harness::new();
        let (alice_id, bob_id) = (UserId::new(), UserId::new());
        let mut alice = h.connect_and_auth(alice_id);
        let mut bob = h.connect_and_auth(bob_id);

        // Spoofed "from" in the payload must be overridden.
        h.send(
            &mut alice,
            serde_json::json!({
                "type": "typing",
                "to": bob_id,
                "from": UserId::new(),
            }),
        );

        let event = bob
            .find(|e| matches!(e, ServerEvent::UserTyping { .. }))
            .unwrap();
        assert!(matches!(
            event,
            ServerEvent::UserTyping { from } if from == alice_id
        ));
    }

    #[test]
    fn call_to_offline_user_drops_silently() {
        let h = Harness::new();
        let mut alice = h.connect_and_auth(UserId::new());

        h.send(
            &mut alice,
            serde_json::json!({
                "type": "call_user",
                "to": UserId::new(),
                "call_type": "video",
                "offer": {"sdp": "v=0"},
            }),
        );

        // Alice receives nothing at all.
        assert!(alice.next().is_none());
    }

    #[test]
    fn full_call_handshake_routes_to_counterparties() {
        let h = Harness::new();
        let (alice_id, bob_id) = (UserId::new(), UserId::new());
        let mut alice = h.connect_and_auth(alice_id);
        let mut bob = h.connect_and_auth(bob_id);

        h.send(
            &mut alice,
            serde_json::json!({
                "type": "call_user", "to": bob_id,
                "call_type": "audio", "offer": {"sdp": "offer"},
            }),
        );
        let invite = bob
            .find(|e| matches!(e, ServerEvent::IncomingCall { .. }))
            .unwrap();
        assert!(matches!(
            invite,
            ServerEvent::IncomingCall { from, call_type: CallKind::Audio, .. } if from == alice_id
        ));

        h.send(
            &mut bob,
            serde_json::json!({
                "type": "call_answer", "to": alice_id, "answer": {"sdp": "answer"},
            }),
        );
        assert!(
            alice
                .find(|e| matches!(e, ServerEvent::CallAnswered { from, .. } if *from == bob_id))
                .is_some()
        );

        h.send(
            &mut alice,
            serde_json::json!({
                "type": "ice_candidate", "to": bob_id, "candidate": {"c": 1},
            }),
        );
        assert!(
            bob.find(|e| matches!(e, ServerEvent::IceCandidate { from, .. } if *from == alice_id))
                .is_some()
        );

        h.send(&mut bob, serde_json::json!({ "type": "end_call", "to": alice_id }));
        assert!(
            alice
                .find(|e| matches!(e, ServerEvent::CallEnded { from } if *from == bob_id))
                .is_some()
        );
    }

    #[test]
    fn answer_without_invite_is_dropped() {
        let h = Harness::new();
        let (alice_id, bob_id) = (UserId::new(), UserId::new());
        let mut alice = h.connect_and_auth(alice_id);
        let mut bob = h.connect_and_auth(bob_id);
        alice.find(|_| false); // drain presence noise
        bob.find(|_| false);

        h.send(
            &mut bob,
            serde_json::json!({
                "type": "call_answer", "to": alice_id, "answer": {"sdp": "x"},
            }),
        );

        assert!(alice.next().is_none());
    }

    #[test]
    fn disconnect_broadcasts_offline_and_ends_calls() {
        let h = Harness::new();
        let (alice_id, bob_id) = (UserId::new(), UserId::new());
        let mut alice = h.connect_and_auth(alice_id);
        let bob = h.connect_and_auth(bob_id);

        // Alice invites bob, then bob vanishes before answering.
        h.send(
            &mut alice,
            serde_json::json!({
                "type": "call_user", "to": bob_id,
                "call_type": "video", "offer": {},
            }),
        );

        h.engine.disconnect(&bob.session);

        assert!(!h.engine.is_online(bob_id));
        assert!(
            alice
                .find(|e| matches!(e, ServerEvent::UserOffline { user_id } if *user_id == bob_id))
                .is_some()
        );
        // The still-connected party is told the call is over.
        assert!(
            alice
                .find(|e| matches!(e, ServerEvent::CallEnded { from } if *from == bob_id))
                .is_some()
        );

        // Subsequent sends to bob drop silently but still ack.
        h.send(
            &mut alice,
            serde_json::json!({ "type": "send_message", "to": bob_id, "text": "gone?" }),
        );
        assert!(
            alice
                .find(|e| matches!(e, ServerEvent::MessageSent { .. }))
                .is_some()
        );
    }

    #[test]
    fn reconnect_supersedes_prior_connection_without_offline_broadcast() {
        let h = Harness::new();
        let alice_id = UserId::new();
        let mut first = h.connect_and_auth(alice_id);
        let mut observer = h.connect_and_auth(UserId::new());
        observer.find(|_| false); // drain

        let mut second = h.connect_and_auth(alice_id);

        // The first connection is told it was replaced.
        assert!(
            first
                .find(|e| matches!(e, ServerEvent::SessionReplaced))
                .is_some()
        );
        // Overwrite still broadcasts exactly one online event.
        assert!(
            observer
                .find(|e| matches!(e, ServerEvent::UserOnline { user_id } if *user_id == alice_id))
                .is_some()
        );
        assert!(observer
            .find(|e| matches!(e, ServerEvent::UserOnline { user_id } if *user_id == alice_id))
            .is_none());

        // The orphaned connection's disconnect must not broadcast offline.
        h.engine.disconnect(&first.session);
        assert!(h.engine.is_online(alice_id));
        assert!(
            observer
                .find(|e| matches!(e, ServerEvent::UserOffline { user_id } if *user_id == alice_id))
                .is_none()
        );

        // Routing reaches the new connection.
        let mut sender = h.connect_and_auth(UserId::new());
        h.send(
            &mut sender,
            serde_json::json!({ "type": "send_message", "to": alice_id, "text": "hi" }),
        );
        assert!(
            second
                .find(|e| matches!(e, ServerEvent::NewMessage { .. }))
                .is_some()
        );
    }

    #[test]
    fn unauthenticated_events_are_dropped() {
        let h = Harness::new();
        let mut bob = h.connect_and_auth(UserId::new());
        let (mut stranger, mut stranger_rx) = h.engine.connect();

        let frame = serde_json::json!({
            "type": "send_message", "to": bob.user_id, "text": "sneaky",
        });
        h.engine.handle_frame(&mut stranger, &frame.to_string());

        assert!(bob.find(|e| matches!(e, ServerEvent::NewMessage { .. })).is_none());
        assert!(stranger_rx.try_recv().is_err());
        assert_eq!(h.engine.message_log().len(), 0);
    }

    #[test]
    fn malformed_frame_rejected_with_error_event() {
        let h = Harness::new();
        let mut alice = h.connect_and_auth(UserId::new());
        alice.find(|_| false); // drain

        h.engine
            .handle_frame(&mut alice.session, "{\"type\": \"send_message\"");

        assert!(matches!(
            alice.next(),
            Some(ServerEvent::Error { code, .. }) if code == "invalid_message"
        ));
    }
}

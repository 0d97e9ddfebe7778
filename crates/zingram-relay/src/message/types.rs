//! Inbound and outbound relay event definitions.
//!
//! Events travel as JSON with a `"type"` discriminator. Client-supplied
//! sender fields are never part of the inbound schema: the router stamps
//! `from` with the session's verified identity, so a spoofed sender in the
//! raw payload is simply ignored by deserialization.

use serde::{Deserialize, Serialize};

use zingram_core::types::UserId;
use zingram_store::ChatMessage;

/// Kind of call being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// Audio-only call.
    Audio,
    /// Video call.
    Video,
}

/// Events sent by the client to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Present a bearer token; on success the session gains an identity
    /// and presence is registered.
    Authenticate {
        /// Opaque bearer credential.
        token: String,
    },
    /// Send a direct chat message.
    SendMessage {
        /// Target identity.
        to: UserId,
        /// Message text.
        text: String,
        /// Content kind, defaults to `"text"`.
        #[serde(rename = "message_type", alias = "msg_type", default)]
        kind: Option<String>,
    },
    /// Place a call: carries the WebRTC session-description offer.
    CallUser {
        /// Callee identity.
        to: UserId,
        /// Audio or video.
        call_type: CallKind,
        /// SDP offer, passed through verbatim.
        offer: serde_json::Value,
    },
    /// Answer a call: carries the session-description answer.
    CallAnswer {
        /// Caller identity.
        to: UserId,
        /// SDP answer, passed through verbatim.
        answer: serde_json::Value,
    },
    /// Exchange a transport candidate.
    IceCandidate {
        /// Counterparty identity.
        to: UserId,
        /// ICE candidate, passed through verbatim.
        candidate: serde_json::Value,
    },
    /// Terminate a call.
    EndCall {
        /// Counterparty identity.
        to: UserId,
    },
    /// Typing indicator.
    Typing {
        /// Target identity.
        to: UserId,
    },
}

/// Events sent by the relay to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Authentication succeeded.
    Authenticated {
        /// The verified identity now attached to this session.
        user_id: UserId,
    },
    /// A chat message addressed to this session.
    NewMessage {
        /// The finalized message record.
        message: ChatMessage,
    },
    /// Send acknowledgment: the relay accepted the sender's message.
    ///
    /// Emitted whether or not the recipient was reachable.
    MessageSent {
        /// The finalized record, including server-assigned id/timestamp.
        message: ChatMessage,
    },
    /// An incoming call invite.
    IncomingCall {
        /// Verified caller identity.
        from: UserId,
        /// Audio or video.
        call_type: CallKind,
        /// SDP offer.
        offer: serde_json::Value,
    },
    /// The callee answered.
    CallAnswered {
        /// Verified callee identity.
        from: UserId,
        /// SDP answer.
        answer: serde_json::Value,
    },
    /// Transport candidate from the counterparty.
    IceCandidate {
        /// Verified sender identity.
        from: UserId,
        /// ICE candidate.
        candidate: serde_json::Value,
    },
    /// The call ended — explicitly, or because the counterparty
    /// disconnected.
    CallEnded {
        /// The party whose action ended the call.
        from: UserId,
    },
    /// The counterparty is typing.
    UserTyping {
        /// Verified sender identity.
        from: UserId,
    },
    /// Broadcast: a user came online.
    UserOnline {
        /// The identity that came online.
        user_id: UserId,
    },
    /// Broadcast: a user went offline.
    UserOffline {
        /// The identity that went offline.
        user_id: UserId,
    },
    /// This connection was superseded by a newer authentication for the
    /// same identity and will no longer receive routed events.
    SessionReplaced,
    /// A request was rejected.
    Error {
        /// Machine-readable code.
        code: String,
        /// Human-readable description.
        message: String,
    },
}

impl ServerEvent {
    /// Shorthand for an error event.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

//! # zingram-relay
//!
//! The presence-and-signaling relay core. Provides:
//!
//! - Connection lifecycle and per-connection outbound buffering
//! - The presence directory (one reachable connection per identity)
//! - Stateless point-to-point event routing with server-stamped senders
//! - Call-signaling sequencing (invite / answer / candidates / terminate)
//!
//! The relay trusts one external capability: token verification from
//! `zingram-auth`. Everything else — HTTP surface, rendering, persistence —
//! lives outside this crate.

pub mod connection;
pub mod message;
pub mod presence;
pub mod router;
pub mod server;
pub mod session;
pub mod signaling;

pub use connection::handle::ConnectionHandle;
pub use connection::pool::ConnectionPool;
pub use message::types::{CallKind, ClientEvent, ServerEvent};
pub use presence::directory::PresenceDirectory;
pub use router::EventRouter;
pub use server::RelayEngine;
pub use session::Session;
pub use signaling::registry::CallRegistry;

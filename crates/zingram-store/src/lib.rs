//! # zingram-store
//!
//! Process-lifetime state for the Zingram relay: the registered-user
//! directory and the append-only chat message log.
//!
//! Nothing here is durable — a restart empties both stores by design.
//! All state is owned by constructed instances and shared behind `Arc`,
//! never held in process-wide globals.

pub mod messages;
pub mod users;

pub use messages::{ChatMessage, MessageLog};
pub use users::{PublicProfile, User, UserStore};

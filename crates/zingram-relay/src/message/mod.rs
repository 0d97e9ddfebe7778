//! Wire-format event definitions and validation.

pub mod types;
pub mod validator;

pub use types::{CallKind, ClientEvent, ServerEvent};

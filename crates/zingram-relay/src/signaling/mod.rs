//! Call-signaling state tracking.

pub mod registry;

pub use registry::{CallPhase, CallRegistry, CallSession};

//! Presence tracking.

pub mod directory;

pub use directory::PresenceDirectory;

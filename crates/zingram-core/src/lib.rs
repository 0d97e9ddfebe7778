//! # zingram-core
//!
//! Shared foundations for the Zingram relay server: the unified
//! [`error::AppError`] type, configuration schemas, and typed identifiers.

pub mod config;
pub mod error;
pub mod types;

pub use error::{AppError, ErrorKind};

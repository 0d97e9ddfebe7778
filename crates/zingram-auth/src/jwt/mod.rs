//! Bearer token issuance and verification.

pub mod claims;
pub mod service;

pub use claims::Claims;
pub use service::TokenService;

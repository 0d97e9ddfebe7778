//! # zingram-auth
//!
//! The identity layer for the Zingram relay: signed bearer tokens
//! ([`jwt`]) and Argon2id credential hashing ([`password`]).
//!
//! The relay itself never inspects credentials — it consumes this crate as
//! an opaque `verify(token) -> UserId` capability.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, TokenService};
pub use password::PasswordHasher;

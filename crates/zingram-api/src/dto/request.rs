//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    /// Unique handle.
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,
    /// Unique phone number.
    #[validate(length(min = 5, max = 20, message = "Phone number must be 5-20 characters"))]
    pub phone: String,
    /// Plaintext password, hashed before storage.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Phone number (login credential).
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User search query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    /// Substring to match against username, name, or phone.
    #[serde(default)]
    pub query: String,
}

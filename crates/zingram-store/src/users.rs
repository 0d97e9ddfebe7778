//! In-memory registered-user directory.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tracing::info;

use zingram_core::error::AppError;
use zingram_core::types::UserId;

/// A registered user account.
///
/// The password hash never leaves this crate; everything user-facing goes
/// through [`PublicProfile`].
#[derive(Debug, Clone)]
pub struct User {
    /// Stable account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique handle.
    pub username: String,
    /// Unique phone number (login credential).
    pub phone: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Generated avatar URL.
    pub avatar: String,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public, serializable view of this account.
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            phone: self.phone.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// The public profile shape returned by the HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Handle.
    pub username: String,
    /// Phone number.
    pub phone: String,
    /// Avatar URL.
    pub avatar: String,
}

/// Thread-safe in-memory user directory.
///
/// Accounts are never deleted; the map only grows for the process lifetime.
#[derive(Debug, Default)]
pub struct UserStore {
    /// User ID → account.
    by_id: DashMap<UserId, User>,
    /// Username → user ID (uniqueness index).
    by_username: DashMap<String, UserId>,
    /// Phone → user ID (uniqueness index, used for login).
    by_phone: DashMap<String, UserId>,
}

impl UserStore {
    /// Creates an empty user store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new account.
    ///
    /// Fails with a conflict error when the username or phone is already
    /// taken. The avatar URL is derived from the display name.
    pub fn register(
        &self,
        name: &str,
        username: &str,
        phone: &str,
        password_hash: String,
    ) -> Result<User, AppError> {
        // Claim the uniqueness indexes first so concurrent registrations of
        // the same handle cannot both succeed.
        let id = UserId::new();

        if self.by_username.entry(username.to_string()).or_insert(id).value() != &id {
            return Err(AppError::conflict("Username already taken"));
        }

        if self.by_phone.entry(phone.to_string()).or_insert(id).value() != &id {
            self.by_username.remove(username);
            return Err(AppError::conflict("Phone number already registered"));
        }

        let user = User {
            id,
            name: name.to_string(),
            username: username.to_string(),
            phone: phone.to_string(),
            password_hash,
            avatar: avatar_url(name),
            created_at: Utc::now(),
        };

        self.by_id.insert(id, user.clone());

        info!(user_id = %id, username = %username, "User registered");

        Ok(user)
    }

    /// Looks up an account by ID.
    pub fn get(&self, id: UserId) -> Option<User> {
        self.by_id.get(&id).map(|u| u.clone())
    }

    /// Looks up an account by phone number (login path).
    pub fn find_by_phone(&self, phone: &str) -> Option<User> {
        let id = *self.by_phone.get(phone)?;
        self.get(id)
    }

    /// Looks up an account by username.
    pub fn find_by_username(&self, username: &str) -> Option<User> {
        let id = *self.by_username.get(username)?;
        self.get(id)
    }

    /// Case-insensitive substring search over username, display name, and
    /// phone number.
    pub fn search(&self, query: &str) -> Vec<User> {
        let needle = query.to_lowercase();
        self.by_id
            .iter()
            .filter(|entry| {
                let u = entry.value();
                u.username.to_lowercase().contains(&needle)
                    || u.name.to_lowercase().contains(&needle)
                    || u.phone.contains(query)
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of registered accounts.
    pub fn count(&self) -> usize {
        self.by_id.len()
    }
}

/// Builds a ui-avatars.com URL for a display name.
fn avatar_url(name: &str) -> String {
    let encoded = utf8_percent_encode(name, NON_ALPHANUMERIC);
    format!("https://ui-avatars.com/api/?name={encoded}&background=random")
}

//! Session authentication — validates the bearer token a client presents
//! in its first `authenticate` event.

use std::sync::Arc;

use zingram_auth::jwt::TokenService;
use zingram_core::error::AppError;
use zingram_core::types::UserId;

/// Authenticates relay sessions using bearer tokens.
///
/// Verification happens once per connection; the resulting identity is
/// trusted for the connection's remaining lifetime.
#[derive(Clone)]
pub struct WsAuthenticator {
    tokens: Arc<TokenService>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new authenticator.
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Verifies a token and returns the stable user identity it carries.
    pub fn authenticate(&self, token: &str) -> Result<UserId, AppError> {
        let claims = self.tokens.verify(token)?;
        Ok(claims.user_id())
    }
}

//! Bearer-token gate placed in front of the repositories.

use super::error::AuthError;
use super::token::TokenIssuer;
use crate::storage::User;

/// Resolves the caller behind an `Authorization` header value.
#[derive(Clone)]
pub struct AuthGate {
    tokens: TokenIssuer,
    scope: String,
}

impl AuthGate {
    pub fn new(tokens: TokenIssuer, scope: impl Into<String>) -> Self {
        Self {
            tokens,
            scope: scope.into(),
        }
    }

    /// Authenticate a call. A missing or malformed header is `Unauthorized`,
    /// exactly like a bad token.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<User, AuthError> {
        let secret = authorization
            .and_then(bearer_secret)
            .ok_or(AuthError::Unauthorized)?;

        self.tokens.validate(secret, &self.scope).await
    }
}

/// Extract the secret from a `Bearer <secret>` header value.
pub fn bearer_secret(header: &str) -> Option<&str> {
    let secret = header.strip_prefix("Bearer ")?.trim();
    (!secret.is_empty() && !secret.contains(char::is_whitespace)).then_some(secret)
}

//! Opaque bearer-token issuance and validation.
//!
//! A token is 32 random bytes, hex encoded. Only its SHA-256 digest is stored;
//! the plaintext is handed to the caller once, by [`TokenIssuer::issue`].

use std::fmt;
use std::time::Duration;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use fittrack_core::db::unix_timestamp;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use super::error::AuthError;
use crate::storage::{FitDatabase, Token, User};

const SECRET_BYTES: usize = 32;

/// A freshly issued token. `plaintext` is not recoverable afterwards.
pub struct IssuedToken {
    pub plaintext: String,
    pub token: Token,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("plaintext", &"<redacted>")
            .field("token", &self.token)
            .finish()
    }
}

/// Creates and checks bearer tokens against the token table.
#[derive(Clone)]
pub struct TokenIssuer {
    db: FitDatabase,
}

impl TokenIssuer {
    pub const fn new(db: FitDatabase) -> Self {
        Self { db }
    }

    /// Issue a token for `user_id` that is valid for `lifetime` under `scope`.
    pub async fn issue(
        &self,
        user_id: i64,
        lifetime: Duration,
        scope: &str,
    ) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, lifetime, scope, unix_timestamp())
            .await
    }

    /// [`issue`](Self::issue) with an explicit clock reading.
    #[instrument(skip(self, lifetime))]
    pub async fn issue_at(
        &self,
        user_id: i64,
        lifetime: Duration,
        scope: &str,
        now: i64,
    ) -> Result<IssuedToken, AuthError> {
        let plaintext = generate_secret();
        // Round partial seconds up so a short lifetime never expires on issue.
        let whole_secs = lifetime
            .as_secs()
            .saturating_add(u64::from(lifetime.subsec_nanos() > 0));
        let lifetime_secs = i64::try_from(whole_secs).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(lifetime_secs);

        let token = self
            .db
            .create_token(user_id, &Self::hash_token(&plaintext), scope, expires_at, now)
            .await?;

        info!(token_id = token.id, expires_at, "Token issued");
        Ok(IssuedToken { plaintext, token })
    }

    /// Resolve the user behind a presented secret.
    ///
    /// Unknown, wrong-scope and expired tokens all yield
    /// [`AuthError::Unauthorized`]; the caller cannot tell which.
    pub async fn validate(&self, secret: &str, scope: &str) -> Result<User, AuthError> {
        self.validate_at(secret, scope, unix_timestamp()).await
    }

    /// [`validate`](Self::validate) with an explicit clock reading.
    pub async fn validate_at(
        &self,
        secret: &str,
        scope: &str,
        now: i64,
    ) -> Result<User, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Unauthorized);
        }

        let user = self
            .db
            .get_user_for_token(&Self::hash_token(secret), scope, now)
            .await?;

        user.ok_or_else(|| {
            debug!(scope, "Token rejected");
            AuthError::Unauthorized
        })
    }

    /// Drop every token a user holds under `scope`.
    pub async fn revoke_all(&self, user_id: i64, scope: &str) -> Result<u64, AuthError> {
        let removed = self.db.delete_tokens_for_user(user_id, scope).await?;
        info!(user_id, scope, removed, "Tokens revoked");
        Ok(removed)
    }

    /// Delete tokens that have already expired.
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        Ok(self.db.purge_expired_tokens(unix_timestamp()).await?)
    }

    /// Hash a token for storage (we don't store raw tokens).
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

fn generate_secret() -> String {
    use std::fmt::Write;

    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);

    let mut secret = String::with_capacity(SECRET_BYTES * 2);
    for b in bytes {
        let _ = write!(secret, "{b:02x}");
    }
    secret
}

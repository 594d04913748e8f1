//! Register and login flows.

use std::time::Duration;

use fittrack_core::config::AuthConfig;
use tracing::{info, instrument, warn};

use super::error::AuthError;
use super::password;
use super::registration::RegisterRequest;
use super::token::{IssuedToken, TokenIssuer};
use crate::storage::{FitDatabase, NewUser, User};

pub struct AuthService {
    db: FitDatabase,
    tokens: TokenIssuer,
    token_ttl: Duration,
    scope: String,
}

impl AuthService {
    pub fn new(db: FitDatabase, config: &AuthConfig) -> Self {
        Self {
            tokens: TokenIssuer::new(db.clone()),
            db,
            token_ttl: Duration::from_secs(config.token_ttl_secs),
            scope: config.token_scope.clone(),
        }
    }

    pub const fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Validate the request, hash the password and store the user.
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AuthError> {
        req.validate()?;

        let password_hash = password::hash_password(&req.password)?;
        let user = self
            .db
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                bio: req.bio,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a token under the configured scope.
    ///
    /// Unknown user and wrong password are both `Unauthorized`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let Some(user) = self.db.get_user_by_username(username).await? else {
            warn!("Login for unknown user");
            return Err(AuthError::Unauthorized);
        };

        if !password::verify_password(password, &user.password_hash)? {
            warn!(user_id = user.id, "Failed login attempt");
            return Err(AuthError::Unauthorized);
        }

        let issued = self
            .tokens
            .issue(user.id, self.token_ttl, &self.scope)
            .await?;

        info!(user_id = user.id, "User logged in");
        Ok(issued)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use fittrack_core::db::DatabaseError;

    async fn service() -> AuthService {
        let db = FitDatabase::open_in_memory().await.unwrap();
        AuthService::new(db, &AuthConfig::default())
    }

    fn alice() -> RegisterRequest {
        RegisterRequest {
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "Abc12345!".into(),
            bio: String::new(),
        }
    }

    #[tokio::test]
    async fn register_stores_digest_not_plaintext() {
        let svc = service().await;
        let user = svc.register(alice()).await.unwrap();

        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "Abc12345!");
        assert!(user.password_hash.starts_with("$argon2"));
        assert!(!serde_json::to_string(&user).unwrap().contains("argon2"));
    }

    #[tokio::test]
    async fn register_rejects_invalid_input_without_writing() {
        let svc = service().await;
        let err = svc
            .register(RegisterRequest {
                password: "weak".into(),
                ..alice()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidRegistration(_)));
        assert!(svc.db.get_user_by_username("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_duplicate_username_is_constraint_violation() {
        let svc = service().await;
        svc.register(alice()).await.unwrap();

        let err = svc
            .register(RegisterRequest {
                email: "other@x.com".into(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Database(DatabaseError::ConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn login_issues_token_for_valid_credentials() {
        let svc = service().await;
        let user = svc.register(alice()).await.unwrap();

        let issued = svc.login("alice", "Abc12345!").await.unwrap();
        assert_eq!(issued.token.user_id, user.id);
        assert_eq!(issued.token.scope, "authentication");
        assert_eq!(
            issued.token.expires_at - issued.token.created_at,
            24 * 60 * 60
        );

        let resolved = svc
            .tokens()
            .validate(&issued.plaintext, "authentication")
            .await
            .unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn login_failures_are_undifferentiated() {
        let svc = service().await;
        svc.register(alice()).await.unwrap();

        let wrong_password = svc.login("alice", "Wrong123!").await.unwrap_err();
        let unknown_user = svc.login("bob", "Abc12345!").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::Unauthorized));
        assert!(matches!(unknown_user, AuthError::Unauthorized));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }
}

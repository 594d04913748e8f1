//! User and token queries for `FitTrack`.

use fittrack_core::db::unix_timestamp;
use tracing::{info, instrument};

use super::db::{DatabaseError, FitDatabase};
use super::models::{NewUser, Token, User};

impl FitDatabase {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Register a user. Duplicate username or email is a `ConstraintViolation`.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let created = self
            .unit_of_work("create_user", |conn| {
                Box::pin(async move {
                    let now = unix_timestamp();

                    let result = sqlx::query(
                        "INSERT INTO users (username, email, password_hash, bio, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
                    )
                    .bind(&user.username)
                    .bind(&user.email)
                    .bind(&user.password_hash)
                    .bind(&user.bio)
                    .bind(now)
                    .bind(now)
                    .execute(&mut *conn)
                    .await?;

                    let created = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
                        .bind(result.last_insert_rowid())
                        .fetch_one(&mut *conn)
                        .await?;

                    Ok::<_, DatabaseError>(created)
                })
            })
            .await?;

        info!(user_id = created.id, "User created");
        Ok(created)
    }

    /// Get a user by ID. `None` when no such user exists.
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Get a user by username. `None` when no such user exists.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Overwrite username, email and bio. The password hash is untouched.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn update_user(&self, user: &User) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET username = ?, email = ?, bio = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.bio)
        .bind(unix_timestamp())
        .bind(user.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {}", user.id)));
        }

        info!("User updated");
        Ok(())
    }

    /// Delete a user. Their tokens go with them (`ON DELETE CASCADE`).
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }

        info!("User deleted");
        Ok(())
    }

    // =========================================================================
    // Token queries
    // =========================================================================

    /// Store a token digest.
    pub async fn create_token(
        &self,
        user_id: i64,
        token_hash: &str,
        scope: &str,
        expires_at: i64,
        now: i64,
    ) -> Result<Token, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO tokens (user_id, token_hash, scope, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(scope)
        .bind(expires_at)
        .bind(now)
        .execute(self.pool())
        .await?;

        let token = sqlx::query_as::<_, Token>("SELECT * FROM tokens WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(self.pool())
            .await?;

        Ok(token)
    }

    /// Resolve the owner of a token digest that carries `scope` and has not
    /// expired at `now`.
    pub async fn get_user_for_token(
        &self,
        token_hash: &str,
        scope: &str,
        now: i64,
    ) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT users.* FROM users \
             INNER JOIN tokens ON tokens.user_id = users.id \
             WHERE tokens.token_hash = ? AND tokens.scope = ? AND tokens.expires_at > ?",
        )
        .bind(token_hash)
        .bind(scope)
        .bind(now)
        .fetch_optional(self.pool())
        .await?;

        Ok(user)
    }

    /// Delete every token of `user_id` with the given scope.
    pub async fn delete_tokens_for_user(
        &self,
        user_id: i64,
        scope: &str,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM tokens WHERE user_id = ? AND scope = ?")
            .bind(user_id)
            .bind(scope)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    /// Remove tokens that expired at or before `now`.
    pub async fn purge_expired_tokens(&self, now: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }
}

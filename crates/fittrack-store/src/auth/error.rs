//! Authentication error taxonomy.

use fittrack_core::db::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No such token, wrong scope, expired, or bad credentials. Deliberately
    /// carries no detail.
    #[error("Unauthorized")]
    Unauthorized,

    /// The password digest could not be computed or the stored one is malformed.
    #[error("Hashing failure: {0}")]
    HashingFailure(String),

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

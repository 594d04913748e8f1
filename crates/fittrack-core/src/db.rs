//! `SQLite` plumbing shared by `FitTrack` components: the storage error
//! taxonomy, pool construction and the clock.

use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const FILE_POOL_SIZE: u32 = 5;

/// Storage error taxonomy.
///
/// `Io`, `Connection`, `Migration` and `Query` are all "the store failed";
/// callers that only care about that class use [`DatabaseError::is_storage_failure`].
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness, foreign-key or check constraint rejected the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A workout entry is malformed (e.g. both or neither of reps/duration).
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
}

impl DatabaseError {
    /// True for failures of the store itself rather than of the request.
    pub const fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Connection(_) | Self::Migration(_) | Self::Query(_)
        )
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db)
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                Self::ConstraintViolation(db.message().to_string())
            }
            _ => Self::Query(e.to_string()),
        }
    }
}

/// Journal, foreign-key and busy-timeout settings every `FitTrack` pool uses.
fn connect_options(url: &str) -> Result<SqliteConnectOptions, DatabaseError> {
    Ok(SqliteConnectOptions::from_str(url)
        .map_err(|e| DatabaseError::Connection(e.to_string()))?
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT))
}

async fn connect(
    options: SqliteConnectOptions,
    max_connections: u32,
) -> Result<SqlitePool, DatabaseError> {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))
}

/// Open (or create) the database file at `path`, creating missing parent
/// directories.
pub async fn open_pool(path: &Path) -> Result<SqlitePool, DatabaseError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io(e.to_string()))?;
    }

    let options = connect_options(&format!("sqlite:{}?mode=rwc", path.display()))?;
    let pool = connect(options, FILE_POOL_SIZE).await?;

    info!(path = %path.display(), "Database opened");
    Ok(pool)
}

/// Open a private in-memory database.
///
/// Every connection to `:memory:` is its own database, so the pool holds
/// exactly one.
pub async fn open_pool_in_memory() -> Result<SqlitePool, DatabaseError> {
    connect(connect_options("sqlite::memory:")?, 1).await
}

/// Seconds since the Unix epoch; the clock used for timestamps and token expiry.
#[allow(clippy::cast_possible_wrap)]
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}

//! SQLite database for `FitTrack`.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

pub use fittrack_core::db::DatabaseError;

/// Future returned by the body of a [`FitDatabase::unit_of_work`].
pub type WorkFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, DatabaseError>> + Send + 'c>>;

/// Handle to the `FitTrack` store. Cheap to clone; clones share one pool.
#[derive(Clone)]
pub struct FitDatabase {
    pool: SqlitePool,
}

impl FitDatabase {
    /// Open or create the database file at `path` and bring its schema up to date.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        Self::migrated(fittrack_core::db::open_pool(path).await?).await
    }

    /// Fresh in-memory database (for testing).
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::migrated(fittrack_core::db::open_pool_in_memory().await?).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Self, DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        info!("FitTrack schema is current");
        Ok(Self { pool })
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run `work` inside a single transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back when it returns `Err`.
    /// If the returned future is dropped before completion the transaction is
    /// dropped with it, which also rolls back: nothing is ever half-written.
    pub async fn unit_of_work<T, F>(&self, label: &'static str, work: F) -> Result<T, DatabaseError>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> WorkFuture<'c, T>,
    {
        let mut tx = self.pool.begin().await?;

        match work(&mut *tx).await {
            Ok(value) => {
                tx.commit().await?;
                debug!(unit = label, "Unit of work committed");
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(unit = label, error = %rollback, "Rollback failed");
                }
                debug!(unit = label, error = %e, "Unit of work rolled back");
                Err(e)
            }
        }
    }
}

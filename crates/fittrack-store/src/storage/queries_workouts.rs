//! Workout aggregate queries for `FitTrack`.
//!
//! A workout and its entries are one consistency unit: every read and write
//! of the aggregate runs inside a single [`FitDatabase::unit_of_work`], so a
//! reader never sees a parent without its committed entries or vice versa.

use fittrack_core::db::unix_timestamp;
use sqlx::SqliteConnection;
use tracing::{info, instrument};

use super::db::{DatabaseError, FitDatabase};
use super::models::{EntryRow, NewWorkout, NewWorkoutEntry, Workout, WorkoutEntry, WorkoutRow, WorkoutUpdate};

impl FitDatabase {
    /// Insert a workout and all of its entries atomically.
    ///
    /// Entries are validated one by one as they are inserted; the first
    /// malformed entry fails the whole call with `InvalidEntry` and nothing
    /// is left behind.
    #[instrument(skip(self, workout), fields(title = %workout.title, entries = workout.entries.len()))]
    pub async fn create_workout(&self, workout: NewWorkout) -> Result<Workout, DatabaseError> {
        let created = self
            .unit_of_work("create_workout", |conn| {
                Box::pin(async move {
                    let now = unix_timestamp();

                    let result = sqlx::query(
                        "INSERT INTO workouts (title, description, duration_minutes, calories_burned, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
                    )
                    .bind(&workout.title)
                    .bind(&workout.description)
                    .bind(workout.duration_minutes)
                    .bind(workout.calories_burned)
                    .bind(now)
                    .bind(now)
                    .execute(&mut *conn)
                    .await?;

                    let id = result.last_insert_rowid();
                    insert_entries(conn, id, &workout.entries).await?;

                    let created = load_workout(conn, id)
                        .await?
                        .ok_or_else(|| DatabaseError::NotFound(format!("Workout {id}")))?;

                    Ok::<_, DatabaseError>(created)
                })
            })
            .await?;

        info!(workout_id = created.id, "Workout created");
        Ok(created)
    }

    /// Get a workout with its entries sorted by `order_index`.
    ///
    /// `None` when the workout does not exist. A workout without entries
    /// comes back with an empty entry list.
    pub async fn get_workout(&self, id: i64) -> Result<Option<Workout>, DatabaseError> {
        self.unit_of_work("get_workout", move |conn| {
            Box::pin(async move { load_workout(conn, id).await })
        })
        .await
    }

    /// Overwrite a workout's scalar fields and, when `entries` is `Some`,
    /// replace its entire entry set.
    ///
    /// Fails with `NotFound` if the workout is gone and with `InvalidEntry`
    /// on a malformed replacement entry; either way the scalar changes are
    /// rolled back too.
    #[instrument(skip(self, update), fields(workout_id = update.id))]
    pub async fn update_workout(&self, update: WorkoutUpdate) -> Result<(), DatabaseError> {
        self.unit_of_work("update_workout", |conn| {
            Box::pin(async move {
                let result = sqlx::query(
                    "UPDATE workouts SET title = ?, description = ?, duration_minutes = ?, calories_burned = ?, updated_at = ? WHERE id = ?",
                )
                .bind(&update.title)
                .bind(&update.description)
                .bind(update.duration_minutes)
                .bind(update.calories_burned)
                .bind(unix_timestamp())
                .bind(update.id)
                .execute(&mut *conn)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DatabaseError::NotFound(format!("Workout {}", update.id)));
                }

                if let Some(entries) = &update.entries {
                    sqlx::query("DELETE FROM workout_entries WHERE workout_id = ?")
                        .bind(update.id)
                        .execute(&mut *conn)
                        .await?;

                    insert_entries(conn, update.id, entries).await?;
                }

                Ok::<_, DatabaseError>(())
            })
        })
        .await?;

        info!("Workout updated");
        Ok(())
    }

    /// Delete a workout and all of its entries.
    #[instrument(skip(self))]
    pub async fn delete_workout(&self, id: i64) -> Result<(), DatabaseError> {
        self.unit_of_work("delete_workout", move |conn| {
            Box::pin(async move {
                sqlx::query("DELETE FROM workout_entries WHERE workout_id = ?")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;

                let result = sqlx::query("DELETE FROM workouts WHERE id = ?")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;

                if result.rows_affected() == 0 {
                    return Err(DatabaseError::NotFound(format!("Workout {id}")));
                }

                Ok::<_, DatabaseError>(())
            })
        })
        .await?;

        info!("Workout deleted");
        Ok(())
    }
}

/// Insert `entries` under `workout_id`, validating each before it is written.
async fn insert_entries(
    conn: &mut SqliteConnection,
    workout_id: i64,
    entries: &[NewWorkoutEntry],
) -> Result<(), DatabaseError> {
    for entry in entries {
        entry.validate()?;

        sqlx::query(
            "INSERT INTO workout_entries (workout_id, exercise_name, sets, reps, duration_seconds, weight, notes, order_index) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(workout_id)
        .bind(&entry.exercise_name)
        .bind(entry.sets)
        .bind(entry.measurement.reps())
        .bind(entry.measurement.duration_seconds())
        .bind(entry.measurement.weight())
        .bind(&entry.notes)
        .bind(entry.order_index)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Read the parent row and its entries on the same connection.
async fn load_workout(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Workout>, DatabaseError> {
    let Some(row) = sqlx::query_as::<_, WorkoutRow>("SELECT * FROM workouts WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    // Ties on order_index keep insertion order.
    let entries = sqlx::query_as::<_, EntryRow>(
        "SELECT * FROM workout_entries WHERE workout_id = ? ORDER BY order_index ASC, id ASC",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(WorkoutEntry::try_from)
    .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(row.into_workout(entries)))
}

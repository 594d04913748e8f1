//! Data models for `FitTrack` storage.

use serde::{Deserialize, Serialize};

use super::db::DatabaseError;

// =========================================================================
// Users and tokens
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A user about to be registered. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: String,
}

/// Sparse profile change; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

impl UserPatch {
    /// Merge onto `existing`. The password hash is carried over untouched.
    pub fn apply_to(self, existing: &User) -> User {
        User {
            username: self.username.unwrap_or_else(|| existing.username.clone()),
            email: self.email.unwrap_or_else(|| existing.email.clone()),
            bio: self.bio.unwrap_or_else(|| existing.bio.clone()),
            ..existing.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Token {
    pub id: i64,
    pub user_id: i64,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub scope: String,
    pub expires_at: i64,
    pub created_at: i64,
}

// =========================================================================
// Workouts
// =========================================================================

/// How a single entry is measured: a repetition count or elapsed seconds,
/// each with an optional weight. Never both, never neither.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    Repetitions { reps: u32, weight: Option<f64> },
    Duration { seconds: u32, weight: Option<f64> },
}

impl Measurement {
    /// Build a measurement from the nullable column/field layout.
    pub fn from_columns(
        reps: Option<u32>,
        duration_seconds: Option<u32>,
        weight: Option<f64>,
    ) -> Result<Self, DatabaseError> {
        match (reps, duration_seconds) {
            (Some(reps), None) => Ok(Self::Repetitions { reps, weight }),
            (None, Some(seconds)) => Ok(Self::Duration { seconds, weight }),
            (Some(_), Some(_)) => Err(DatabaseError::InvalidEntry(
                "reps and duration_seconds are mutually exclusive".into(),
            )),
            (None, None) => Err(DatabaseError::InvalidEntry(
                "one of reps or duration_seconds is required".into(),
            )),
        }
    }

    pub const fn reps(&self) -> Option<u32> {
        match self {
            Self::Repetitions { reps, .. } => Some(*reps),
            Self::Duration { .. } => None,
        }
    }

    pub const fn duration_seconds(&self) -> Option<u32> {
        match self {
            Self::Repetitions { .. } => None,
            Self::Duration { seconds, .. } => Some(*seconds),
        }
    }

    pub const fn weight(&self) -> Option<f64> {
        match self {
            Self::Repetitions { weight, .. } | Self::Duration { weight, .. } => *weight,
        }
    }
}

/// An entry as supplied by a caller, before it belongs to a stored workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EntryWire", into = "EntryWire")]
pub struct NewWorkoutEntry {
    pub exercise_name: String,
    pub sets: u32,
    pub measurement: Measurement,
    pub notes: String,
    pub order_index: i64,
}

impl NewWorkoutEntry {
    pub fn new(
        exercise_name: impl Into<String>,
        sets: u32,
        measurement: Measurement,
        order_index: i64,
    ) -> Self {
        Self {
            exercise_name: exercise_name.into(),
            sets,
            measurement,
            notes: String::new(),
            order_index,
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Checks that cannot be expressed in the type: a named exercise and a
    /// sane weight.
    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.exercise_name.trim().is_empty() {
            return Err(DatabaseError::InvalidEntry(format!(
                "entry {}: exercise name is required",
                self.order_index
            )));
        }
        if let Some(weight) = self.measurement.weight() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DatabaseError::InvalidEntry(format!(
                    "entry {}: weight must be a non-negative number",
                    self.order_index
                )));
            }
        }
        Ok(())
    }
}

/// A stored entry, owned by exactly one workout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "EntryWire")]
pub struct WorkoutEntry {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_name: String,
    pub sets: u32,
    pub measurement: Measurement,
    pub notes: String,
    pub order_index: i64,
}

/// A workout and its entries as supplied for creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkout {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: u32,
    pub calories_burned: u32,
    #[serde(default)]
    pub entries: Vec<NewWorkoutEntry>,
}

/// The workout aggregate: parent fields plus entries in `order_index` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workout {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub calories_burned: u32,
    pub entries: Vec<WorkoutEntry>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Full overwrite of a workout's scalar fields, optionally replacing the
/// whole entry set. `entries: None` keeps the stored entries.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutUpdate {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub calories_burned: u32,
    pub entries: Option<Vec<NewWorkoutEntry>>,
}

/// Sparse change set; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<u32>,
    pub calories_burned: Option<u32>,
    pub entries: Option<Vec<NewWorkoutEntry>>,
}

impl WorkoutPatch {
    /// Merge onto `existing`, producing a full update.
    pub fn apply_to(self, existing: &Workout) -> WorkoutUpdate {
        WorkoutUpdate {
            id: existing.id,
            title: self.title.unwrap_or_else(|| existing.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
            duration_minutes: self.duration_minutes.unwrap_or(existing.duration_minutes),
            calories_burned: self.calories_burned.unwrap_or(existing.calories_burned),
            entries: self.entries,
        }
    }
}

// =========================================================================
// Row and wire shapes
// =========================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkoutRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub calories_burned: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl WorkoutRow {
    pub fn into_workout(self, entries: Vec<WorkoutEntry>) -> Workout {
        Workout {
            id: self.id,
            title: self.title,
            description: self.description,
            duration_minutes: self.duration_minutes,
            calories_burned: self.calories_burned,
            entries,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntryRow {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: Option<u32>,
    pub duration_seconds: Option<u32>,
    pub weight: Option<f64>,
    pub notes: String,
    pub order_index: i64,
}

impl TryFrom<EntryRow> for WorkoutEntry {
    type Error = DatabaseError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            measurement: Measurement::from_columns(row.reps, row.duration_seconds, row.weight)?,
            id: row.id,
            workout_id: row.workout_id,
            exercise_name: row.exercise_name,
            sets: row.sets,
            notes: row.notes,
            order_index: row.order_index,
        })
    }
}

/// Flat JSON layout shared by new and stored entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    exercise_name: String,
    sets: u32,
    #[serde(default)]
    reps: Option<u32>,
    #[serde(default)]
    duration_seconds: Option<u32>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    notes: String,
    order_index: i64,
}

impl TryFrom<EntryWire> for NewWorkoutEntry {
    type Error = DatabaseError;

    fn try_from(wire: EntryWire) -> Result<Self, Self::Error> {
        Ok(Self {
            measurement: Measurement::from_columns(wire.reps, wire.duration_seconds, wire.weight)?,
            exercise_name: wire.exercise_name,
            sets: wire.sets,
            notes: wire.notes,
            order_index: wire.order_index,
        })
    }
}

impl From<NewWorkoutEntry> for EntryWire {
    fn from(entry: NewWorkoutEntry) -> Self {
        Self {
            id: None,
            reps: entry.measurement.reps(),
            duration_seconds: entry.measurement.duration_seconds(),
            weight: entry.measurement.weight(),
            exercise_name: entry.exercise_name,
            sets: entry.sets,
            notes: entry.notes,
            order_index: entry.order_index,
        }
    }
}

impl From<WorkoutEntry> for EntryWire {
    fn from(entry: WorkoutEntry) -> Self {
        Self {
            id: Some(entry.id),
            reps: entry.measurement.reps(),
            duration_seconds: entry.measurement.duration_seconds(),
            weight: entry.measurement.weight(),
            exercise_name: entry.exercise_name,
            sets: entry.sets,
            notes: entry.notes,
            order_index: entry.order_index,
        }
    }
}

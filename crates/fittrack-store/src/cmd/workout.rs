//! Workout subcommands: create, show, update, delete.
//!
//! Every action authenticates its token through the gate before touching
//! the repository.

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use super::{CmdContext, read_json};
use crate::storage::{NewWorkout, WorkoutPatch};

/// Workout subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum WorkoutAction {
    /// Create a workout from a JSON file.
    Create {
        #[arg(long, env = "FITTRACK_TOKEN")]
        token: String,
        /// JSON document with title, durations and entries.
        #[arg(long)]
        file: PathBuf,
    },
    /// Print a workout as JSON.
    Show {
        #[arg(long, env = "FITTRACK_TOKEN")]
        token: String,
        id: i64,
    },
    /// Apply a JSON patch to a workout. Supplying `entries` replaces them all.
    Update {
        #[arg(long, env = "FITTRACK_TOKEN")]
        token: String,
        id: i64,
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete a workout and its entries.
    Delete {
        #[arg(long, env = "FITTRACK_TOKEN")]
        token: String,
        id: i64,
    },
}

impl WorkoutAction {
    fn token(&self) -> &str {
        match self {
            Self::Create { token, .. }
            | Self::Show { token, .. }
            | Self::Update { token, .. }
            | Self::Delete { token, .. } => token,
        }
    }
}

/// Execute a workout subcommand.
pub async fn run(action: WorkoutAction, ctx: &CmdContext, out: &mut impl Write) -> anyhow::Result<()> {
    let caller = ctx.caller(action.token()).await?;
    debug!(user_id = caller.id, "Caller authenticated");

    match action {
        WorkoutAction::Create { file, .. } => {
            let workout: NewWorkout = read_json(&file).await?;
            let created = ctx.db.create_workout(workout).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&created)?)?;
        }
        WorkoutAction::Show { id, .. } => {
            let workout = ctx
                .db
                .get_workout(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Workout {id} not found"))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&workout)?)?;
        }
        WorkoutAction::Update { id, file, .. } => {
            let patch: WorkoutPatch = read_json(&file).await?;
            let existing = ctx
                .db
                .get_workout(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Workout {id} not found"))?;
            ctx.db.update_workout(patch.apply_to(&existing)).await?;
            writeln!(out, "Updated workout {id}")?;
        }
        WorkoutAction::Delete { id, .. } => {
            ctx.db.delete_workout(id).await?;
            writeln!(out, "Deleted workout {id}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use fittrack_core::config::AuthConfig;

    use super::*;
    use crate::auth::AuthError;
    use crate::storage::{DatabaseError, FitDatabase, NewUser};

    const PUSH_DAY: &str = r#"{
        "title": "Push Day",
        "duration_minutes": 60,
        "calories_burned": 200,
        "entries": [
            {"exercise_name": "Squats", "sets": 5, "reps": 10, "weight": 100.0, "order_index": 1}
        ]
    }"#;

    async fn setup() -> (CmdContext, String, tempfile::TempDir) {
        let db = FitDatabase::open_in_memory().await.unwrap();
        let user = db
            .create_user(NewUser {
                username: "alice".into(),
                email: "a@x.com".into(),
                password_hash: "hash".into(),
                bio: String::new(),
            })
            .await
            .unwrap();
        let ctx = CmdContext::new(db, AuthConfig::default());
        let issued = ctx
            .tokens()
            .issue(user.id, Duration::from_secs(3600), "authentication")
            .await
            .unwrap();
        (ctx, issued.plaintext, tempfile::tempdir().unwrap())
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn create_then_show() {
        let (ctx, token, dir) = setup().await;
        let file = write_file(&dir, "push.json", PUSH_DAY);

        let mut out = Vec::new();
        run(WorkoutAction::Create { token: token.clone(), file }, &ctx, &mut out)
            .await
            .unwrap();
        let created: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let id = created["id"].as_i64().unwrap();

        let mut out = Vec::new();
        run(WorkoutAction::Show { token, id }, &ctx, &mut out)
            .await
            .unwrap();
        let shown: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(shown["title"], "Push Day");
        assert_eq!(shown["entries"][0]["reps"], 10);
        assert!(shown["entries"][0]["duration_seconds"].is_null());
    }

    #[tokio::test]
    async fn update_merges_patch() {
        let (ctx, token, dir) = setup().await;
        let created = ctx
            .db
            .create_workout(serde_json::from_str(PUSH_DAY).unwrap())
            .await
            .unwrap();
        let file = write_file(&dir, "patch.json", r#"{"title": "Leg Day"}"#);

        let mut out = Vec::new();
        run(
            WorkoutAction::Update {
                token,
                id: created.id,
                file,
            },
            &ctx,
            &mut out,
        )
        .await
        .unwrap();

        let stored = ctx.db.get_workout(created.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Leg Day");
        assert_eq!(stored.duration_minutes, 60);
        assert_eq!(stored.entries, created.entries);
    }

    #[tokio::test]
    async fn delete_missing_workout_is_not_found() {
        let (ctx, token, _dir) = setup().await;
        let mut out = Vec::new();

        let err = run(WorkoutAction::Delete { token, id: 99 }, &ctx, &mut out)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatabaseError>(),
            Some(DatabaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn bad_token_never_reaches_repository() {
        let (ctx, _, dir) = setup().await;
        let file = write_file(&dir, "push.json", PUSH_DAY);
        let mut out = Vec::new();

        let err = run(
            WorkoutAction::Create {
                token: "forged".into(),
                file,
            },
            &ctx,
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::Unauthorized)
        ));
        assert!(ctx.db.get_workout(1).await.unwrap().is_none());
    }
}

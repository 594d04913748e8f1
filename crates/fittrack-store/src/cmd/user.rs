//! User profile subcommands: show, update, delete.

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use super::{CmdContext, read_json};
use crate::storage::UserPatch;

/// User subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum UserAction {
    /// Print a user profile as JSON.
    Show {
        #[arg(long, env = "FITTRACK_TOKEN")]
        token: String,
        id: i64,
    },
    /// Apply a JSON patch (`username`, `email`, `bio`) to a user.
    Update {
        #[arg(long, env = "FITTRACK_TOKEN")]
        token: String,
        id: i64,
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete a user and every token they hold.
    Delete {
        #[arg(long, env = "FITTRACK_TOKEN")]
        token: String,
        id: i64,
    },
}

impl UserAction {
    fn token(&self) -> &str {
        match self {
            Self::Show { token, .. } | Self::Update { token, .. } | Self::Delete { token, .. } => {
                token
            }
        }
    }
}

/// Execute a user subcommand.
pub async fn run(action: UserAction, ctx: &CmdContext, out: &mut impl Write) -> anyhow::Result<()> {
    let caller = ctx.caller(action.token()).await?;
    debug!(user_id = caller.id, "Caller authenticated");

    match action {
        UserAction::Show { id, .. } => {
            let user = ctx
                .db
                .get_user(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User {id} not found"))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&user)?)?;
        }
        UserAction::Update { id, file, .. } => {
            let patch: UserPatch = read_json(&file).await?;
            let existing = ctx
                .db
                .get_user(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User {id} not found"))?;
            ctx.db.update_user(&patch.apply_to(&existing)).await?;
            writeln!(out, "Updated user {id}")?;
        }
        UserAction::Delete { id, .. } => {
            ctx.db.delete_user(id).await?;
            writeln!(out, "Deleted user {id}")?;
        }
    }
    Ok(())
}

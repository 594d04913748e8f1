//! Subcommands of the `fittrack` binary.
//!
//! User-facing output uses writeln! on the supplied writer (stdout in the
//! binary), never tracing.

pub mod account;
pub mod user;
pub mod workout;

use std::io::Write;
use std::path::Path;

use anyhow::Context as _;
use serde::de::DeserializeOwned;

use fittrack_core::config::AuthConfig;

use crate::auth::{AuthError, AuthGate, AuthService, TokenIssuer};
use crate::storage::{FitDatabase, User};

pub use account::{AccountAction, TokenAction};
pub use user::UserAction;
pub use workout::WorkoutAction;

/// Everything a subcommand needs: the open database and the auth settings.
#[derive(Clone)]
pub struct CmdContext {
    pub db: FitDatabase,
    pub auth: AuthConfig,
}

impl CmdContext {
    pub const fn new(db: FitDatabase, auth: AuthConfig) -> Self {
        Self { db, auth }
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.db.clone(), &self.auth)
    }

    pub fn tokens(&self) -> TokenIssuer {
        TokenIssuer::new(self.db.clone())
    }

    pub fn gate(&self) -> AuthGate {
        AuthGate::new(self.tokens(), &self.auth.token_scope)
    }

    /// Pass a plaintext token through the gate the same way a bearer
    /// header would be.
    pub async fn caller(&self, token: &str) -> Result<User, AuthError> {
        let header = format!("Bearer {token}");
        self.gate().authenticate(Some(&header)).await
    }
}

/// Top-level subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    #[command(flatten)]
    Account(AccountAction),
    /// Manage user profiles.
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage workouts.
    Workout {
        #[command(subcommand)]
        action: WorkoutAction,
    },
    /// Token housekeeping.
    Tokens {
        #[command(subcommand)]
        action: TokenAction,
    },
}

/// Execute a subcommand.
pub async fn run(command: Command, ctx: &CmdContext, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Account(action) => account::run(action, ctx, out).await,
        Command::User { action } => user::run(action, ctx, out).await,
        Command::Workout { action } => workout::run(action, ctx, out).await,
        Command::Tokens { action } => account::run_tokens(action, ctx, out).await,
    }
}

/// Read and deserialize a JSON document from disk.
async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

//! Account subcommands: register, login, logout, whoami, token purge.

use std::io::Write;

use super::CmdContext;
use crate::auth::RegisterRequest;

/// Account subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AccountAction {
    /// Create a user account.
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Free-text profile bio.
        #[arg(long, default_value = "")]
        bio: String,
    },
    /// Log in and print a bearer token.
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Revoke every login token of the token's owner.
    Logout {
        #[arg(long, env = "FITTRACK_TOKEN")]
        token: String,
    },
    /// Show the user a token belongs to.
    Whoami {
        #[arg(long, env = "FITTRACK_TOKEN")]
        token: String,
    },
}

/// Token subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum TokenAction {
    /// Delete expired tokens.
    Purge,
}

/// Execute an account subcommand.
pub async fn run(action: AccountAction, ctx: &CmdContext, out: &mut impl Write) -> anyhow::Result<()> {
    match action {
        AccountAction::Register {
            username,
            email,
            password,
            bio,
        } => {
            let user = ctx
                .auth_service()
                .register(RegisterRequest {
                    username,
                    email,
                    password,
                    bio,
                })
                .await?;
            writeln!(out, "Registered {} (id {})", user.username, user.id)?;
        }
        AccountAction::Login { username, password } => {
            let issued = ctx.auth_service().login(&username, &password).await?;
            // The plaintext is shown exactly once.
            writeln!(out, "{}", issued.plaintext)?;
        }
        AccountAction::Logout { token } => {
            let user = ctx.caller(&token).await?;
            let removed = ctx
                .tokens()
                .revoke_all(user.id, &ctx.auth.token_scope)
                .await?;
            writeln!(out, "Revoked {removed} token(s)")?;
        }
        AccountAction::Whoami { token } => {
            let user = ctx.caller(&token).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&user)?)?;
        }
    }
    Ok(())
}

/// Execute a token subcommand.
pub async fn run_tokens(action: TokenAction, ctx: &CmdContext, out: &mut impl Write) -> anyhow::Result<()> {
    match action {
        TokenAction::Purge => {
            let removed = ctx.tokens().purge_expired().await?;
            writeln!(out, "Purged {removed} expired token(s)")?;
        }
    }
    Ok(())
}

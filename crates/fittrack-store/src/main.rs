//! `FitTrack` command-line client
//!
//! Drives the store in-process against a local `SQLite` database.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use fittrack_core::config::{self, load_config};
use fittrack_core::tracing_init::init_tracing;
use fittrack_store::cmd::{self, CmdContext, Command};
use fittrack_store::storage::FitDatabase;

#[derive(Parser, Debug)]
#[command(name = "fittrack")]
#[command(version, about = "FitTrack workout log")]
struct Cli {
    /// Path to SQLite database file.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Emit JSON log lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config()?;

    if let Some(path) = cli.db_path {
        config.database.path = Some(path);
    }
    if cli.log_json {
        config.log.json = true;
    }

    init_tracing(&config.log.filter, config.log.json);

    let db_path = config
        .database
        .path
        .clone()
        .or_else(config::database_path)
        .ok_or_else(|| anyhow::anyhow!("No database path configured. Use --db-path <path>"))?;

    info!(version = env!("CARGO_PKG_VERSION"), path = %db_path.display(), "Opening database");
    let db = FitDatabase::open(&db_path).await?;

    let ctx = CmdContext::new(db, config.auth);
    cmd::run(cli.command, &ctx, &mut io::stdout()).await
}

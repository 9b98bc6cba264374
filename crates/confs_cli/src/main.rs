//! Command-line entry point for the conference store.
//!
//! # Responsibility
//! - Resolve configuration and logging, then open and verify the store.
//! - Run one repository command and print its result as JSON.
//!
//! # Invariants
//! - A store that cannot be opened or pinged aborts startup with exit code 1.
//! - Command failures are reported on stderr with exit code 2.

use clap::{Parser, Subcommand};
use confs_core::db::{open_db, open_db_in_memory};
use confs_core::{init_logging, AppConfig, ConfId, ConfRepository, SqliteConfRepository};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "confs", version, about = "Conference store maintenance")]
struct Cli {
    /// SQLite database file (overrides DB_PATH).
    #[arg(long, conflicts_with = "memory")]
    db: Option<PathBuf>,

    /// Use a throwaway in-memory database.
    #[arg(long)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every conference ordered by id.
    List,
    /// Print one conference.
    Get { id: ConfId },
    /// Hard-delete one conference and print rows-affected.
    Delete { id: ConfId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = with_db_override(AppConfig::from_env(), cli.db.clone());

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }
    info!("event=cli_start module=cli status=ok {}", config.describe());

    let opened = if cli.memory {
        open_db_in_memory()
    } else {
        open_db(&config.db_path)
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open store: {err}");
            return ExitCode::from(1);
        }
    };
    let repo = match SqliteConfRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("store is not ready: {err}");
            return ExitCode::from(1);
        }
    };

    match run(&repo, &cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(2)
        }
    }
}

/// Applies `--db` on top of the environment-resolved settings.
fn with_db_override(mut config: AppConfig, db: Option<PathBuf>) -> AppConfig {
    if let Some(db) = db {
        config.db_path = db;
    }
    config
}

fn run(repo: &impl ConfRepository, command: &Command) -> Result<String, Box<dyn std::error::Error>> {
    let output = match command {
        Command::List => serde_json::to_string_pretty(&repo.read_all()?)?,
        Command::Get { id } => serde_json::to_string_pretty(&repo.read_one(*id)?)?,
        Command::Delete { id } => {
            let removed = repo.remove_one(*id)?;
            serde_json::json!({ "id": id, "rows_affected": removed }).to_string()
        }
    };
    Ok(output)
}

mod commands;
mod config;
mod paths;

use std::fs;
use std::fs::File;

use anyhow::Context;
use bookshelf_lib::BookshelfClient;
use bookshelf_lib::session::SqliteStorage;
use clap::Parser;
use log::LevelFilter;
use log::warn;
use simplelog::Config;
use simplelog::WriteLogger;

use crate::config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    init_logging(cli.log_level);

    let session_db = cli
        .session_db
        .clone()
        .or_else(paths::session_db)
        .context("Cannot determine a data directory, pass --session-db")?;
    let storage = SqliteStorage::open(&session_db)
        .await
        .with_context(|| format!("Failed to open session database {}", session_db.display()))?;

    let client = BookshelfClient::builder()
        .url(&cli.api_url)
        .storage(storage)
        .timeout(cli.timeout())
        .on_unauthorized(|route| {
            warn!("Session rejected by the server, redirecting to {}", route);
            eprintln!("Session expired, run `bookshelf login` again");
        })
        .build();

    commands::run(cli.command, client).await
}

/// Writes logs to `latest.log` in the cache directory. Logging is skipped
/// when the file cannot be created.
fn init_logging(level: LevelFilter) {
    if level == LevelFilter::Off {
        return;
    }
    paths::rotate_logs();

    let Some(path) = paths::log_file() else { return };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, Config::default(), file);
        }
        Err(e) => eprintln!("Cannot write log file {}: {}", path.display(), e),
    }
}

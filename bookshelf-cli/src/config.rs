//! Command-line and environment configuration.
//!
//! Every global option can also come from a `BOOKSHELF_*` variable, which
//! `main` may load from a `.env` file first.

use std::path::PathBuf;
use std::time::Duration;

use bookshelf_lib::model::BookCategory;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Browse and manage the bookshelf catalog")]
pub struct Cli {
    /// Base URL of the bookshelf API
    #[arg(
        long,
        global = true,
        env = "BOOKSHELF_API_URL",
        default_value = "http://localhost:8080/api"
    )]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "BOOKSHELF_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log level written to the log file (off, error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        env = "BOOKSHELF_LOG_LEVEL",
        default_value = "info",
        value_parser = parse_level
    )]
    pub log_level: LevelFilter,

    /// Session database path; defaults to the platform data directory
    #[arg(long, global = true, env = "BOOKSHELF_SESSION_DB")]
    pub session_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse().map_err(|_| format!("unknown log level '{}'", s))
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        username: String,
        #[arg(long, env = "BOOKSHELF_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user, confirming the session with the server
    Whoami,
    /// List books
    Books {
        /// Case-insensitive match on title or author
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<BookCategory>,
    },
    /// Count books per category
    Stats,
    /// Show one book
    Show { id: i64 },
    /// Add a book (administrators only)
    Add(AddArgs),
    /// Delete a book (administrators only)
    Delete { id: i64 },
    /// Print where navigating to a path would lead
    Route { path: String },
}

/// Fields of a new book. They are checked by the book form before sending.
#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    #[arg(long)]
    pub isbn: String,
    #[arg(long)]
    pub price: f64,
    /// Publication year
    #[arg(long)]
    pub year: Option<i64>,
    #[arg(long, default_value = "ROMAN")]
    pub category: String,
    #[arg(long)]
    pub description: Option<String>,
}

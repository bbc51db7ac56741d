use crate::config::LogFormat;
use crate::constants::{APP_DESCRIPTION, APP_NAME, DEFAULT_LOG_LEVEL};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Diary backend that decorates entries with emoji
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION)]
#[command(author, version, long_about = None)]
pub struct CliArgs {
    /// Log output format: text or json (overrides EMODIARY_LOG_FORMAT)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Listen address (overrides EMODIARY_BIND)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// SQLite database path (overrides EMODIARY_DB)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Create the database schema and exit
    InitDb {
        /// SQLite database path (overrides EMODIARY_DB)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

impl CliArgs {
    /// The `--db` override of whichever subcommand was given.
    pub fn db_override(&self) -> Option<&PathBuf> {
        match &self.command {
            Commands::Serve { db, .. } | Commands::InitDb { db } => db.as_ref(),
        }
    }
}

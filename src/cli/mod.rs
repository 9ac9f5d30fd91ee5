// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use crate::core::naming::DEFAULT_ENVIRONMENT;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// Tablekeeper - Table Metadata Reconciliation CLI
///
/// Keeps a local record of table schemas in sync with a live database.
#[derive(Parser, Debug)]
#[command(name = "tablekeeper")]
#[command(author = "Tablekeeper Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Table metadata reconciliation CLI tool")]
#[command(long_about = "Tablekeeper - Table Metadata Reconciliation CLI

Keeps a local record of table schemas (activetables.json) in sync with a
live database:
  • Tables that exist live but are unknown locally are recorded
  • Tables that are recorded locally but missing live are created

Supported databases: MySQL, SQLite")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Initialize a new project:     tablekeeper init --dialect mysql --database app
  2. Preview the reconcile plan:   tablekeeper status
  3. Reconcile:                    tablekeeper sync

For detailed help on each command, use: tablekeeper <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target environment
    #[arg(short, long, global = true, default_value = DEFAULT_ENVIRONMENT)]
    pub env: String,

    /// Connection description (user:password@tcp(host:port)/database), overrides the environment
    #[arg(long, global = true, value_name = "DSN")]
    pub dsn: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new project
    ///
    /// Writes the configuration file and an empty metadata file.
    ///
    /// EXAMPLES:
    ///   # Initialize with MySQL
    ///   tablekeeper init --dialect mysql --database app
    ///
    ///   # Force re-initialization
    ///   tablekeeper init --dialect sqlite --force
    Init {
        /// Database dialect (mysql, sqlite)
        #[arg(short, long, value_name = "DIALECT")]
        dialect: String,

        /// Database name (file path for SQLite)
        #[arg(long, value_name = "NAME")]
        database: Option<String>,

        /// Force initialization even if config exists
        #[arg(short, long)]
        force: bool,
    },

    /// Run one reconciliation pass against the database
    ///
    /// Records live tables missing from the metadata file and creates
    /// recorded tables missing from the database.
    ///
    /// EXAMPLES:
    ///   tablekeeper sync
    ///   tablekeeper sync --env production
    Sync,

    /// Show the reconcile plan without changing anything
    ///
    /// EXAMPLES:
    ///   tablekeeper status
    ///   tablekeeper status --format json
    Status,

    /// Show the recorded schema of a table
    ///
    /// EXAMPLES:
    ///   tablekeeper show users
    Show {
        /// Table name
        #[arg(value_name = "TABLE")]
        table: String,
    },

    /// Remove a table from the metadata file
    ///
    /// The live table is left untouched.
    ///
    /// EXAMPLES:
    ///   tablekeeper forget users
    Forget {
        /// Table name
        #[arg(value_name = "TABLE")]
        table: String,
    },
}

//! Command-line definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "choreshare")]
#[command(version)]
#[command(about = "Split household chores fairly between two people")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database holding loads and assignments
    #[arg(long, global = true, env = "CHORESHARE_DB", default_value = "choreshare.db")]
    pub db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "CHORESHARE_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "CHORESHARE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Allocate one period's chores and persist the result
    Allocate {
        /// JSON file with an array of {name, day, estimate: [u1, u2], exception}
        #[arg(long)]
        chores: PathBuf,
    },
    /// Show persisted cumulative loads
    Loads,
    /// Show the decisions of one run (latest run by default)
    Assignments {
        /// Run id to show
        #[arg(long)]
        run: Option<String>,
    },
    /// List recorded runs, most recent first
    Runs,
    /// Print the core library version
    Version,
}

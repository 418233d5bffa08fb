//! ChoreShare operator CLI.
//!
//! Runs chore allocation against a local SQLite store and inspects
//! persisted loads and past runs.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = commands::execute(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

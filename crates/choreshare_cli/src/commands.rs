//! Command execution.

use crate::cli::{Cli, Commands};
use choreshare_core::db::{open_db, DbError};
use choreshare_core::{
    allocate_period_exclusive, core_version, default_log_level, init_logging,
    AllocationServiceError, AssignedChore, ChoreEstimate, LoadStore, RepoError, RunId,
    SqliteAssignmentRepository, SqliteLoadRepository,
};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Debug)]
pub enum CliError {
    Logging(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Db(DbError),
    Repo(RepoError),
    Allocation(AllocationServiceError),
    InvalidRunId(String),
    NoRuns,
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "invalid chores file: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Allocation(err) => write!(f, "{err}"),
            Self::InvalidRunId(value) => write!(f, "invalid run id `{value}`"),
            Self::NoRuns => write!(f, "no allocation runs recorded yet"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Allocation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<AllocationServiceError> for CliError {
    fn from(value: AllocationServiceError) -> Self {
        Self::Allocation(value)
    }
}

pub fn execute(cli: Cli) -> Result<(), CliError> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(CliError::Logging)?;
    }

    match cli.command {
        Commands::Allocate { chores } => run_allocate(&cli.db, &chores, cli.json),
        Commands::Loads => run_loads(&cli.db, cli.json),
        Commands::Assignments { run } => run_assignments(&cli.db, run.as_deref(), cli.json),
        Commands::Runs => run_runs(&cli.db),
        Commands::Version => {
            println!("choreshare_core version={}", core_version());
            Ok(())
        }
    }
}

fn run_allocate(db: &Path, chores_path: &Path, json: bool) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(chores_path)?;
    let chores: Vec<ChoreEstimate> = serde_json::from_str(&raw)?;
    info!(
        "event=cli_allocate module=cli status=start chore_count={}",
        chores.len()
    );

    let mut conn = open_db(db)?;
    let recorded = allocate_period_exclusive(&mut conn, &chores)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recorded.outcome.assignments)?);
        return Ok(());
    }

    if recorded.outcome.is_noop() {
        println!("no chores to allocate");
        return Ok(());
    }
    println!("run={}", recorded.run_id);
    print_assignments(&recorded.outcome.assignments);
    println!(
        "delta user1={:.3} user2={:.3}",
        recorded.outcome.delta.user1, recorded.outcome.delta.user2
    );
    Ok(())
}

fn run_loads(db: &Path, json: bool) -> Result<(), CliError> {
    let conn = open_db(db)?;
    let loads = SqliteLoadRepository::try_new(&conn)?.get_loads()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&loads)?);
    } else {
        println!("user1={:.3} user2={:.3}", loads.user1, loads.user2);
    }
    Ok(())
}

fn run_assignments(db: &Path, run: Option<&str>, json: bool) -> Result<(), CliError> {
    let conn = open_db(db)?;
    let repo = SqliteAssignmentRepository::try_new(&conn)?;

    let run_id = match run {
        Some(value) => {
            RunId::parse_str(value.trim()).map_err(|_| CliError::InvalidRunId(value.to_string()))?
        }
        None => repo
            .list_runs()?
            .first()
            .map(|summary| summary.run_id)
            .ok_or(CliError::NoRuns)?,
    };

    let assignments = repo.list_assignments(run_id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&assignments)?);
    } else {
        println!("run={run_id}");
        print_assignments(&assignments);
    }
    Ok(())
}

fn run_runs(db: &Path) -> Result<(), CliError> {
    let conn = open_db(db)?;
    let runs = SqliteAssignmentRepository::try_new(&conn)?.list_runs()?;
    if runs.is_empty() {
        println!("no allocation runs recorded yet");
    }
    for summary in runs {
        println!(
            "run={} chores={} created_at_ms={}",
            summary.run_id, summary.chore_count, summary.created_at
        );
    }
    Ok(())
}

fn print_assignments(assignments: &[AssignedChore]) {
    for assigned in assignments {
        let pinned = if assigned.is_exception { " pinned" } else { "" };
        println!(
            "{}\t{}\t{}\t{:.3}{}",
            assigned.owner, assigned.day, assigned.name, assigned.time_value, pinned
        );
    }
}

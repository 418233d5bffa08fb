//! Assignment sink contract and SQLite implementation.
//!
//! # Responsibility
//! - Record each decision of one allocation run in decision order.
//! - Read back a run's decisions and list known runs.
//!
//! # Invariants
//! - A repository instance writes to exactly one run id; reads may target any run.
//! - `sequence` starts at 0 per run and increases by one per decision.
//! - `(run_uuid, name, day)` is unique, so a chore is recorded once per run.

use crate::model::chore::{AssignedChore, UserSlot};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Stable identifier of one allocation run.
pub type RunId = Uuid;

const ASSIGNMENT_COLUMNS: &[&str] = &[
    "id",
    "run_uuid",
    "sequence",
    "name",
    "day",
    "time_value",
    "is_exception",
    "owner_slot",
    "created_at",
];

/// Receiver of final assignment decisions.
pub trait AssignmentSink {
    /// Records one decision. Called once per chore, in decision order.
    fn add_assigned_chore(&self, chore: &AssignedChore) -> RepoResult<()>;
}

impl<T: AssignmentSink + ?Sized> AssignmentSink for &T {
    fn add_assigned_chore(&self, chore: &AssignedChore) -> RepoResult<()> {
        (**self).add_assigned_chore(chore)
    }
}

/// Summary row for one recorded run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: RunId,
    pub chore_count: u32,
    /// Epoch ms of the first recorded decision.
    pub created_at: i64,
}

/// SQLite-backed assignment sink bound to one run.
pub struct SqliteAssignmentRepository<'conn> {
    conn: &'conn Connection,
    run_id: RunId,
}

impl<'conn> SqliteAssignmentRepository<'conn> {
    /// Creates repository from a migrated connection, bound to a fresh run id.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "assigned_chores", ASSIGNMENT_COLUMNS)?;
        Ok(Self {
            conn,
            run_id: Uuid::new_v4(),
        })
    }

    /// Run id this repository writes to.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Lists one run's decisions in decision order.
    pub fn list_assignments(&self, run_id: RunId) -> RepoResult<Vec<AssignedChore>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, day, time_value, is_exception, owner_slot
             FROM assigned_chores
             WHERE run_uuid = ?1
             ORDER BY sequence ASC;",
        )?;
        let mut rows = stmt.query([run_id.to_string()])?;
        let mut assignments = Vec::new();
        while let Some(row) = rows.next()? {
            assignments.push(parse_assignment_row(row)?);
        }
        Ok(assignments)
    }

    /// Lists recorded runs, most recent first.
    pub fn list_runs(&self) -> RepoResult<Vec<RunSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_uuid, COUNT(*) AS chore_count, MIN(created_at) AS created_at
             FROM assigned_chores
             GROUP BY run_uuid
             ORDER BY MIN(id) DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut runs = Vec::new();
        while let Some(row) = rows.next()? {
            let run_text: String = row.get("run_uuid")?;
            runs.push(RunSummary {
                run_id: parse_run_id(&run_text)?,
                chore_count: row.get("chore_count")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(runs)
    }
}

impl AssignmentSink for SqliteAssignmentRepository<'_> {
    fn add_assigned_chore(&self, chore: &AssignedChore) -> RepoResult<()> {
        if !chore.time_value.is_finite() || chore.time_value < 0.0 {
            return Err(RepoError::InvalidInput(format!(
                "time value `{}` for {} must be finite and non-negative",
                chore.time_value,
                chore.key()
            )));
        }

        let run_text = self.run_id.to_string();
        let sequence = next_sequence(self.conn, &run_text)?;
        self.conn.execute(
            "INSERT INTO assigned_chores (
                run_uuid,
                sequence,
                name,
                day,
                time_value,
                is_exception,
                owner_slot
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                run_text,
                sequence,
                chore.name.as_str(),
                chore.day.as_str(),
                chore.time_value,
                bool_to_int(chore.is_exception),
                chore.owner.id(),
            ],
        )?;
        Ok(())
    }
}

fn next_sequence(conn: &Connection, run_text: &str) -> RepoResult<i64> {
    let next: i64 = conn.query_row(
        "SELECT COALESCE(MAX(sequence) + 1, 0) FROM assigned_chores WHERE run_uuid = ?1;",
        [run_text],
        |row| row.get(0),
    )?;
    Ok(next)
}

fn parse_assignment_row(row: &Row<'_>) -> RepoResult<AssignedChore> {
    let owner_id: i64 = row.get("owner_slot")?;
    let owner = u8::try_from(owner_id)
        .ok()
        .and_then(|id| UserSlot::try_from(id).ok())
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid owner slot `{owner_id}` in assigned_chores.owner_slot"
            ))
        })?;

    let is_exception = match row.get::<_, i64>("is_exception")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_exception value `{other}` in assigned_chores.is_exception"
            )));
        }
    };

    Ok(AssignedChore {
        name: row.get("name")?,
        day: row.get("day")?,
        time_value: row.get("time_value")?,
        is_exception,
        owner,
    })
}

fn parse_run_id(value: &str) -> RepoResult<RunId> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid `{value}` in assigned_chores.run_uuid"))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

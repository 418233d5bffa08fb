//! Allocation use-case service.
//!
//! # Responsibility
//! - Read seed loads, run the allocation core, emit decisions and persist
//!   the reconciled delta.
//! - Provide a SQLite entry point that serializes concurrent runs.
//!
//! # Invariants
//! - Input is validated before the store is touched.
//! - Empty input performs no store call.
//! - `set_loads` is called exactly once per non-empty run, after every
//!   decision has been handed to the sink.

use crate::allocation::{allocate, validate_batch, AllocationError, AllocationOutcome};
use crate::model::chore::ChoreEstimate;
use crate::model::load::CumulativeLoads;
use crate::repo::assignment_repo::{AssignmentSink, RunId, SqliteAssignmentRepository};
use crate::repo::load_repo::{LoadStore, SqliteLoadRepository};
use crate::repo::RepoError;
use log::{error, info};
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for allocation use-cases.
#[derive(Debug)]
pub enum AllocationServiceError {
    /// Input rejected before allocation.
    Allocation(AllocationError),
    /// Load store or assignment sink failure.
    Repo(RepoError),
}

impl Display for AllocationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allocation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AllocationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Allocation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<AllocationError> for AllocationServiceError {
    fn from(value: AllocationError) -> Self {
        Self::Allocation(value)
    }
}

impl From<RepoError> for AllocationServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for AllocationServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Allocation service over injected store handles.
pub struct AllocationService<L: LoadStore, S: AssignmentSink> {
    loads: L,
    sink: S,
}

impl<L: LoadStore, S: AssignmentSink> AllocationService<L, S> {
    pub fn new(loads: L, sink: S) -> Self {
        Self { loads, sink }
    }

    /// Allocates one period's chores and persists the result.
    ///
    /// # Contract
    /// - Decisions reach the sink in decision order.
    /// - The store receives the additive delta, not absolute loads.
    /// - Store failures are returned unchanged; earlier writes are not undone
    ///   here (see `allocate_period_exclusive` for atomic SQLite runs).
    pub fn allocate_period(
        &self,
        chores: &[ChoreEstimate],
    ) -> Result<AllocationOutcome, AllocationServiceError> {
        let started_at = Instant::now();
        info!(
            "event=allocation_run module=service status=start chore_count={}",
            chores.len()
        );

        match self.run(chores) {
            Ok(outcome) => {
                info!(
                    "event=allocation_run module=service status=ok chore_count={} load1={} load2={} delta1={} delta2={} duration_ms={}",
                    outcome.assignments.len(),
                    outcome.final_loads.user1,
                    outcome.final_loads.user2,
                    outcome.delta.user1,
                    outcome.delta.user2,
                    started_at.elapsed().as_millis()
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    "event=allocation_run module=service status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    error_code(&err),
                    err
                );
                Err(err)
            }
        }
    }

    fn run(&self, chores: &[ChoreEstimate]) -> Result<AllocationOutcome, AllocationServiceError> {
        validate_batch(chores).map_err(AllocationError::from)?;
        if chores.is_empty() {
            return Ok(allocate(chores, CumulativeLoads::ZERO)?);
        }

        let seed = self.loads.get_loads()?;
        let outcome = allocate(chores, seed)?;
        for assigned in &outcome.assignments {
            self.sink.add_assigned_chore(assigned)?;
        }
        self.loads.set_loads(outcome.delta)?;
        Ok(outcome)
    }
}

/// Result of an exclusive SQLite allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAllocation {
    /// Run id under which decisions were stored.
    pub run_id: RunId,
    pub outcome: AllocationOutcome,
}

/// Runs one allocation inside a single `IMMEDIATE` transaction.
///
/// The write lock is taken before loads are read, so two runs against the
/// same database cannot interleave their read-modify-write of `user_loads`.
/// Nothing is committed unless the whole run succeeds.
pub fn allocate_period_exclusive(
    conn: &mut Connection,
    chores: &[ChoreEstimate],
) -> Result<RecordedAllocation, AllocationServiceError> {
    validate_batch(chores).map_err(AllocationError::from)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let recorded = {
        let loads = SqliteLoadRepository::try_new(&tx)?;
        let sink = SqliteAssignmentRepository::try_new(&tx)?;
        let run_id = sink.run_id();
        let outcome = AllocationService::new(loads, sink).allocate_period(chores)?;
        RecordedAllocation { run_id, outcome }
    };
    tx.commit()?;

    info!(
        "event=allocation_commit module=service status=ok run_id={} chore_count={}",
        recorded.run_id,
        recorded.outcome.assignments.len()
    );
    Ok(recorded)
}

fn error_code(err: &AllocationServiceError) -> &'static str {
    match err {
        AllocationServiceError::Allocation(AllocationError::InvalidChore(_)) => "invalid_chore",
        AllocationServiceError::Allocation(AllocationError::InvalidSeedLoad { .. }) => {
            "invalid_seed_load"
        }
        AllocationServiceError::Repo(_) => "store_failed",
    }
}

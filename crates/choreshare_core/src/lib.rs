//! Core domain logic for ChoreShare.
//!
//! Splits a period's chores between two users by relative effort, honoring
//! manual pins and carrying workload imbalance into the next period.

pub mod allocation;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use allocation::balancer::{AllocationStep, SelectionRule};
pub use allocation::exception::PINNED_FRACTION;
pub use allocation::normalizer::NormalizedEntry;
pub use allocation::{allocate, validate_batch, AllocationError, AllocationOutcome};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::chore::{
    AssignedChore, ChoreEstimate, ChoreException, ChoreKey, ChoreValidationError, UserSlot,
};
pub use model::load::{CumulativeLoads, LoadDelta};
pub use repo::assignment_repo::{AssignmentSink, RunId, RunSummary, SqliteAssignmentRepository};
pub use repo::load_repo::{LoadStore, SqliteLoadRepository};
pub use repo::{RepoError, RepoResult};
pub use service::allocation_service::{
    allocate_period_exclusive, AllocationService, AllocationServiceError, RecordedAllocation,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Chore allocation core.
//!
//! # Responsibility
//! - Validate a chore batch before any decision is made.
//! - Run normalizer, exception resolver, balancer and reconciler in order.
//!
//! # Invariants
//! - Every input chore appears exactly once among the returned assignments.
//! - The computation is deterministic and performs no I/O.
//! - Empty input completes with no assignments and a zero delta.

pub mod balancer;
pub mod exception;
pub mod normalizer;
pub mod reconciler;

use crate::model::chore::{AssignedChore, ChoreEstimate, ChoreKey, ChoreValidationError, UserSlot};
use crate::model::load::{CumulativeLoads, LoadDelta};
use balancer::{balance, AllocationStep};
use exception::apply_exceptions;
use normalizer::{estimate_totals, normalize};
use reconciler::reconcile;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised before allocation starts.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationError {
    /// The chore batch failed validation.
    InvalidChore(ChoreValidationError),
    /// A seed load is negative or not finite.
    InvalidSeedLoad { user: UserSlot, value: f64 },
}

impl Display for AllocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidChore(err) => write!(f, "{err}"),
            Self::InvalidSeedLoad { user, value } => {
                write!(f, "invalid starting load {value} for {user}")
            }
        }
    }
}

impl Error for AllocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidChore(err) => Some(err),
            Self::InvalidSeedLoad { .. } => None,
        }
    }
}

impl From<ChoreValidationError> for AllocationError {
    fn from(value: ChoreValidationError) -> Self {
        Self::InvalidChore(value)
    }
}

/// Result of one allocation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    /// Decisions in the order they were made.
    pub assignments: Vec<AssignedChore>,
    /// Running loads after the last pass, seed included.
    pub final_loads: CumulativeLoads,
    /// Additive delta to persist.
    pub delta: LoadDelta,
    /// Per-pass trace, aligned with `assignments`.
    pub steps: Vec<AllocationStep>,
}

impl AllocationOutcome {
    fn empty(seed: CumulativeLoads) -> Self {
        Self {
            assignments: Vec::new(),
            final_loads: seed,
            delta: LoadDelta::NONE,
            steps: Vec::new(),
        }
    }

    /// Whether the run made no decision.
    pub fn is_noop(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Assignments owned by one user, in decision order.
    pub fn assignments_for(&self, user: UserSlot) -> impl Iterator<Item = &AssignedChore> {
        self.assignments
            .iter()
            .filter(move |assigned| assigned.owner == user)
    }
}

/// Validates a whole batch.
///
/// # Errors
/// - Blank name/day, duplicate `(name, day)` keys, or a zero estimate total
///   for either user. An empty batch is valid.
pub fn validate_batch(chores: &[ChoreEstimate]) -> Result<(), ChoreValidationError> {
    let mut seen: HashSet<ChoreKey> = HashSet::with_capacity(chores.len());
    for chore in chores {
        chore.validate()?;
        let key = chore.key();
        if seen.contains(&key) {
            return Err(ChoreValidationError::DuplicateKey(key));
        }
        seen.insert(key);
    }

    if chores.is_empty() {
        return Ok(());
    }

    let totals = estimate_totals(chores);
    for user in UserSlot::BOTH {
        if totals[user.index()] == 0 {
            return Err(ChoreValidationError::ZeroTotalEstimate(user));
        }
    }
    Ok(())
}

/// Allocates every chore between the two users.
///
/// # Errors
/// - `InvalidChore` when `validate_batch` fails.
/// - `InvalidSeedLoad` when `seed` holds a negative or non-finite value.
pub fn allocate(
    chores: &[ChoreEstimate],
    seed: CumulativeLoads,
) -> Result<AllocationOutcome, AllocationError> {
    validate_batch(chores)?;
    if chores.is_empty() {
        return Ok(AllocationOutcome::empty(seed));
    }
    if let Some((user, value)) = seed.first_invalid() {
        return Err(AllocationError::InvalidSeedLoad { user, value });
    }

    let lists = apply_exceptions(normalize(chores)?, chores);
    let balanced = balance(lists, seed);

    let pinned: HashMap<ChoreKey, bool> = chores
        .iter()
        .map(|chore| (chore.key(), chore.exception.is_pinned()))
        .collect();
    let assignments = balanced
        .steps
        .iter()
        .map(|step| AssignedChore {
            name: step.key.name.clone(),
            day: step.key.day.clone(),
            time_value: step.fraction,
            is_exception: pinned.get(&step.key).copied().unwrap_or(false),
            owner: step.recipient,
        })
        .collect();

    Ok(AllocationOutcome {
        assignments,
        final_loads: balanced.final_loads,
        delta: reconcile(balanced.final_loads),
        steps: balanced.steps,
    })
}

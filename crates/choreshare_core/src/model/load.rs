//! Cumulative load and load-delta values.
//!
//! # Invariants
//! - Loads and deltas are finite and non-negative.
//! - Deltas are additive: the store adds them to persisted loads.

use crate::model::chore::UserSlot;
use serde::{Deserialize, Serialize};

/// Per-user running total of normalized time assigned across periods.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CumulativeLoads {
    pub user1: f64,
    pub user2: f64,
}

impl CumulativeLoads {
    pub const ZERO: CumulativeLoads = CumulativeLoads {
        user1: 0.0,
        user2: 0.0,
    };

    pub fn new(user1: f64, user2: f64) -> Self {
        Self { user1, user2 }
    }

    pub fn get(&self, user: UserSlot) -> f64 {
        match user {
            UserSlot::One => self.user1,
            UserSlot::Two => self.user2,
        }
    }

    /// Returns a copy with `amount` added to one user's load.
    pub fn with_added(self, user: UserSlot, amount: f64) -> Self {
        match user {
            UserSlot::One => Self {
                user1: self.user1 + amount,
                ..self
            },
            UserSlot::Two => Self {
                user2: self.user2 + amount,
                ..self
            },
        }
    }

    /// Returns the first user whose load is negative or not finite.
    pub fn first_invalid(&self) -> Option<(UserSlot, f64)> {
        UserSlot::BOTH
            .into_iter()
            .map(|user| (user, self.get(user)))
            .find(|(_, value)| !is_valid_amount(*value))
    }
}

/// Additive adjustment persisted after a run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadDelta {
    pub user1: f64,
    pub user2: f64,
}

impl LoadDelta {
    pub const NONE: LoadDelta = LoadDelta {
        user1: 0.0,
        user2: 0.0,
    };

    /// Delta carrying `amount` for one user and zero for the other.
    pub fn carry_to(user: UserSlot, amount: f64) -> Self {
        match user {
            UserSlot::One => Self {
                user1: amount,
                user2: 0.0,
            },
            UserSlot::Two => Self {
                user1: 0.0,
                user2: amount,
            },
        }
    }

    pub fn get(&self, user: UserSlot) -> f64 {
        match user {
            UserSlot::One => self.user1,
            UserSlot::Two => self.user2,
        }
    }

    /// Returns the first user whose delta is negative or not finite.
    pub fn first_invalid(&self) -> Option<(UserSlot, f64)> {
        UserSlot::BOTH
            .into_iter()
            .map(|user| (user, self.get(user)))
            .find(|(_, value)| !is_valid_amount(*value))
    }
}

fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

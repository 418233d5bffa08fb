//! Converts raw per-user estimates into load fractions.
//!
//! # Invariants
//! - `fraction = round(estimate[user] / total[user], 3)`, so normal values lie in `[0, 1]`.
//! - Both output lists contain the same keys in input order.
//! - A zero total for either user is rejected, never divided by.

use crate::model::chore::{ChoreEstimate, ChoreKey, ChoreValidationError, UserSlot};

const FRACTION_SCALE: f64 = 1000.0;

/// One chore's share of a user's total estimated time.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEntry {
    pub key: ChoreKey,
    pub fraction: f64,
}

impl NormalizedEntry {
    pub fn new(key: ChoreKey, fraction: f64) -> Self {
        Self { key, fraction }
    }
}

/// Normalized entries for both users.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedLists {
    pub user1: Vec<NormalizedEntry>,
    pub user2: Vec<NormalizedEntry>,
}

impl NormalizedLists {
    pub fn for_user(&self, user: UserSlot) -> &[NormalizedEntry] {
        match user {
            UserSlot::One => &self.user1,
            UserSlot::Two => &self.user2,
        }
    }

    pub fn for_user_mut(&mut self, user: UserSlot) -> &mut Vec<NormalizedEntry> {
        match user {
            UserSlot::One => &mut self.user1,
            UserSlot::Two => &mut self.user2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user1.is_empty() && self.user2.is_empty()
    }
}

/// Sums each user's estimates over the whole batch, indexed by `UserSlot::index()`.
pub fn estimate_totals(chores: &[ChoreEstimate]) -> [u64; 2] {
    chores.iter().fold([0_u64; 2], |mut totals, chore| {
        for user in UserSlot::BOTH {
            totals[user.index()] += u64::from(chore.estimate_for(user));
        }
        totals
    })
}

/// Rounds to three decimal places, resolving exact midpoints to even.
pub fn round_fraction(value: f64) -> f64 {
    (value * FRACTION_SCALE).round_ties_even() / FRACTION_SCALE
}

/// Builds both users' normalized lists.
///
/// Empty input yields empty lists.
///
/// # Errors
/// - `ZeroTotalEstimate` when a non-empty batch sums to zero for a user.
pub fn normalize(chores: &[ChoreEstimate]) -> Result<NormalizedLists, ChoreValidationError> {
    if chores.is_empty() {
        return Ok(NormalizedLists::default());
    }

    let totals = estimate_totals(chores);
    for user in UserSlot::BOTH {
        if totals[user.index()] == 0 {
            return Err(ChoreValidationError::ZeroTotalEstimate(user));
        }
    }

    let entries_for = |user: UserSlot| -> Vec<NormalizedEntry> {
        let total = totals[user.index()] as f64;
        chores
            .iter()
            .map(|chore| {
                let share = f64::from(chore.estimate_for(user)) / total;
                NormalizedEntry::new(chore.key(), round_fraction(share))
            })
            .collect()
    };

    Ok(NormalizedLists {
        user1: entries_for(UserSlot::One),
        user2: entries_for(UserSlot::Two),
    })
}

//! Turn-based greedy balancer.
//!
//! # Responsibility
//! - Feed the currently lighter-loaded user one chore per pass.
//! - Within a pass, prefer the first chore that is proportionally cheaper
//!   for the recipient than for the other user.
//!
//! # Invariants
//! - Both lists always hold the same key set; every pass removes the chosen
//!   key from both.
//! - Running loads never decrease.
//! - User 1 receives the turn when loads are equal.

use crate::allocation::normalizer::{NormalizedEntry, NormalizedLists};
use crate::model::chore::{ChoreKey, UserSlot};
use crate::model::load::CumulativeLoads;
use log::trace;
use std::collections::{HashMap, HashSet};

/// How a pass picked its chore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRule {
    /// Entry at `position` was cheaper for the recipient than for the other user.
    ComparativeAdvantage { position: usize },
    /// No advantage found; the recipient's first (highest-fraction) entry was taken.
    Fallback,
}

/// Result of one selection pass over immutable list snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    /// Entry taken from the recipient's list.
    pub chosen: NormalizedEntry,
    pub rule: SelectionRule,
    /// Recipient's list without the chosen key.
    pub own: Vec<NormalizedEntry>,
    /// Other user's list without the chosen key.
    pub other: Vec<NormalizedEntry>,
}

/// Trace of one pass of the outer loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationStep {
    pub recipient: UserSlot,
    pub key: ChoreKey,
    /// Fraction charged to the recipient (the recipient's own list value).
    pub fraction: f64,
    pub rule: SelectionRule,
    pub loads_after: CumulativeLoads,
    /// Entries left in each user's list after this pass, indexed by `UserSlot::index()`.
    pub remaining: [usize; 2],
}

/// Output of the balancing loop.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceResult {
    /// One step per assigned chore, in decision order.
    pub steps: Vec<AllocationStep>,
    pub final_loads: CumulativeLoads,
}

/// Sorts entries by fraction, highest first; equal fractions keep their order.
pub fn order_by_fraction(entries: &mut [NormalizedEntry]) {
    entries.sort_by(|left, right| right.fraction.total_cmp(&left.fraction));
}

/// Chooses who receives the next chore: the lower load, user 1 on ties.
pub fn next_recipient(loads: CumulativeLoads) -> UserSlot {
    if loads.user1 <= loads.user2 {
        UserSlot::One
    } else {
        UserSlot::Two
    }
}

/// Runs one selection pass for the owner of `own` against `other`.
///
/// Scans `own` from the front, bounded by the shorter list. The first entry
/// whose fraction is strictly lower than the other user's fraction for the
/// same key wins. A key missing from `other` carries no advantage. When the
/// scan finds nothing, the entry at index 0 of `own` is taken, even if it was
/// pinned away from this user.
///
/// Returns `None` when either list is empty.
pub fn selection_pass(own: &[NormalizedEntry], other: &[NormalizedEntry]) -> Option<PassOutcome> {
    if own.is_empty() || other.is_empty() {
        return None;
    }

    let other_fractions: HashMap<&ChoreKey, f64> = other
        .iter()
        .map(|entry| (&entry.key, entry.fraction))
        .collect();

    let bound = own.len().min(other.len());
    let advantage = own[..bound].iter().position(|entry| {
        other_fractions
            .get(&entry.key)
            .is_some_and(|other_value| entry.fraction < *other_value)
    });

    let (index, rule) = match advantage {
        Some(position) => (position, SelectionRule::ComparativeAdvantage { position }),
        None => (0, SelectionRule::Fallback),
    };
    let chosen = own[index].clone();

    Some(PassOutcome {
        own: without_key(own, &chosen.key),
        other: without_key(other, &chosen.key),
        chosen,
        rule,
    })
}

/// Assigns every chore, one per pass, starting from `seed` loads.
///
/// Lists are ordered by `order_by_fraction` before the first pass.
pub fn balance(mut lists: NormalizedLists, seed: CumulativeLoads) -> BalanceResult {
    for user in UserSlot::BOTH {
        order_by_fraction(lists.for_user_mut(user));
    }

    let mut loads = seed;
    let mut steps = Vec::with_capacity(lists.user1.len());

    loop {
        let recipient = next_recipient(loads);
        let Some(outcome) = selection_pass(
            lists.for_user(recipient),
            lists.for_user(recipient.other()),
        ) else {
            break;
        };

        loads = loads.with_added(recipient, outcome.chosen.fraction);
        *lists.for_user_mut(recipient) = outcome.own;
        *lists.for_user_mut(recipient.other()) = outcome.other;
        debug_assert!(
            same_key_set(&lists.user1, &lists.user2),
            "normalized lists diverged after assigning {}",
            outcome.chosen.key
        );

        trace!(
            "event=allocation_pass module=allocation status=ok recipient={} chore={} fraction={} rule={:?} load1={} load2={}",
            recipient,
            outcome.chosen.key,
            outcome.chosen.fraction,
            outcome.rule,
            loads.user1,
            loads.user2
        );
        steps.push(AllocationStep {
            recipient,
            key: outcome.chosen.key,
            fraction: outcome.chosen.fraction,
            rule: outcome.rule,
            loads_after: loads,
            remaining: [lists.user1.len(), lists.user2.len()],
        });
    }

    BalanceResult {
        steps,
        final_loads: loads,
    }
}

/// Whether both lists hold exactly the same keys.
pub fn same_key_set(left: &[NormalizedEntry], right: &[NormalizedEntry]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let left_keys: HashSet<&ChoreKey> = left.iter().map(|entry| &entry.key).collect();
    right.iter().all(|entry| left_keys.contains(&entry.key))
}

fn without_key(entries: &[NormalizedEntry], key: &ChoreKey) -> Vec<NormalizedEntry> {
    entries
        .iter()
        .filter(|entry| &entry.key != key)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        balance, next_recipient, order_by_fraction, same_key_set, selection_pass, SelectionRule,
    };
    use crate::allocation::exception::PINNED_FRACTION;
    use crate::allocation::normalizer::{NormalizedEntry, NormalizedLists};
    use crate::model::chore::{ChoreKey, UserSlot};
    use crate::model::load::CumulativeLoads;

    fn entry(name: &str, fraction: f64) -> NormalizedEntry {
        NormalizedEntry::new(ChoreKey::new(name, "mon"), fraction)
    }

    #[test]
    fn ties_go_to_user_one() {
        assert_eq!(next_recipient(CumulativeLoads::ZERO), UserSlot::One);
        assert_eq!(
            next_recipient(CumulativeLoads::new(0.5, 0.25)),
            UserSlot::Two
        );
    }

    #[test]
    fn ordering_is_descending_and_stable() {
        let mut entries = vec![entry("a", 0.2), entry("b", 0.5), entry("c", 0.2)];
        order_by_fraction(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.key.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn pass_takes_first_comparative_advantage() {
        let own = vec![entry("trash", 0.75), entry("dishes", 0.25)];
        let other = vec![entry("dishes", 0.667), entry("trash", 0.333)];

        let outcome = selection_pass(&own, &other).expect("non-empty lists");
        assert_eq!(outcome.chosen, entry("dishes", 0.25));
        assert_eq!(
            outcome.rule,
            SelectionRule::ComparativeAdvantage { position: 1 }
        );
        assert_eq!(outcome.own, vec![entry("trash", 0.75)]);
        assert_eq!(outcome.other, vec![entry("trash", 0.333)]);
    }

    #[test]
    fn pass_falls_back_to_front_entry_without_advantage() {
        let own = vec![entry("laundry", 1.5), entry("dishes", 0.5)];
        let other = vec![entry("laundry", 0.75), entry("dishes", 0.25)];

        let outcome = selection_pass(&own, &other).expect("non-empty lists");
        assert_eq!(outcome.rule, SelectionRule::Fallback);
        assert_eq!(outcome.chosen, entry("laundry", 1.5));
    }

    #[test]
    fn equal_fractions_are_not_an_advantage() {
        let own = vec![entry("a", 0.5), entry("b", 0.5)];
        let other = vec![entry("b", 0.5), entry("a", 0.5)];

        let outcome = selection_pass(&own, &other).expect("non-empty lists");
        assert_eq!(outcome.rule, SelectionRule::Fallback);
        assert_eq!(outcome.chosen.key.name, "a");
    }

    #[test]
    fn missing_counterpart_carries_no_advantage() {
        let own = vec![entry("orphan", 0.1), entry("dishes", 0.2)];
        let other = vec![entry("dishes", 0.9), entry("trash", 0.1)];

        let outcome = selection_pass(&own, &other).expect("non-empty lists");
        assert_eq!(
            outcome.rule,
            SelectionRule::ComparativeAdvantage { position: 1 }
        );
        assert_eq!(outcome.chosen.key.name, "dishes");
    }

    #[test]
    fn pass_on_empty_list_yields_nothing() {
        assert!(selection_pass(&[], &[entry("a", 0.1)]).is_none());
    }

    #[test]
    fn balance_alternates_by_load() {
        let lists = NormalizedLists {
            user1: vec![entry("dishes", 0.25), entry("trash", 0.75)],
            user2: vec![entry("dishes", 0.667), entry("trash", 0.333)],
        };
        let result = balance(lists, CumulativeLoads::ZERO);

        let owners: Vec<(UserSlot, &str)> = result
            .steps
            .iter()
            .map(|step| (step.recipient, step.key.name.as_str()))
            .collect();
        assert_eq!(
            owners,
            vec![(UserSlot::One, "dishes"), (UserSlot::Two, "trash")]
        );
        assert_eq!(result.final_loads, CumulativeLoads::new(0.25, 0.333));
        assert_eq!(result.steps[0].remaining, [1, 1]);
        assert_eq!(result.steps[1].remaining, [0, 0]);
    }

    #[test]
    fn pass_over_pinned_entry_keeps_key_sets_equal() {
        // "laundry" is pinned away from this user and sits at the end.
        let own = vec![
            entry("dishes", 0.4),
            entry("trash", 0.1),
            entry("laundry", PINNED_FRACTION),
        ];
        let other = vec![
            entry("laundry", 0.5),
            entry("dishes", 0.3),
            entry("trash", 0.2),
        ];
        assert!(same_key_set(&own, &other));

        let outcome = selection_pass(&own, &other).expect("non-empty lists");
        assert_eq!(
            outcome.rule,
            SelectionRule::ComparativeAdvantage { position: 1 }
        );
        assert_eq!(outcome.chosen.key.name, "trash");
        assert!(same_key_set(&outcome.own, &outcome.other));
        assert_eq!(outcome.own.len(), 2);
        assert!(outcome
            .own
            .iter()
            .any(|e| e.key.name == "laundry" && e.fraction == PINNED_FRACTION));
    }

    #[test]
    fn same_key_set_detects_divergent_lists() {
        let left = vec![entry("dishes", 0.5), entry("trash", 0.5)];
        let reordered = vec![entry("trash", 0.9), entry("dishes", 0.1)];
        let swapped = vec![entry("dishes", 0.5), entry("laundry", 0.5)];

        assert!(same_key_set(&left, &reordered));
        assert!(!same_key_set(&left, &swapped));
        assert!(!same_key_set(&left, &left[..1]));
    }
}

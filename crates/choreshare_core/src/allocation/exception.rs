//! Applies manual pins to normalized lists.
//!
//! A chore pinned away from a user gets the sentinel fraction
//! `PINNED_FRACTION` in that user's list. The sentinel exceeds any
//! normalized value, so the entry sorts to the front once lists are ordered.
//! It marks the entry; it is not a literal cost.

use crate::allocation::normalizer::{NormalizedEntry, NormalizedLists};
use crate::model::chore::ChoreEstimate;
use log::debug;

/// Sentinel fraction for pinned entries. Strictly greater than `1.0`.
pub const PINNED_FRACTION: f64 = 1.5;

/// Returns `lists` with every pinned chore re-entered at `PINNED_FRACTION`.
///
/// The pinned entry is removed and appended to the end of the affected list.
/// Untagged chores are left untouched in both lists.
pub fn apply_exceptions(mut lists: NormalizedLists, chores: &[ChoreEstimate]) -> NormalizedLists {
    for chore in chores {
        let Some(user) = chore.exception.pinned_away_from() else {
            continue;
        };

        let key = chore.key();
        let list = lists.for_user_mut(user);
        list.retain(|entry| entry.key != key);
        debug!(
            "event=chore_pinned module=allocation status=ok user={} chore={}",
            user, key
        );
        list.push(NormalizedEntry::new(key, PINNED_FRACTION));
    }
    lists
}

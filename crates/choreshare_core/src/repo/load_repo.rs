//! Cumulative load store contract and SQLite implementation.
//!
//! # Invariants
//! - `user_loads` holds exactly one row per user slot.
//! - `set_loads` is additive and updates both rows in one statement.

use crate::model::chore::UserSlot;
use crate::model::load::{CumulativeLoads, LoadDelta};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection};

const LOAD_COLUMNS: &[&str] = &["user_slot", "cumulative_load", "updated_at"];

/// Store holding each user's cumulative load across periods.
pub trait LoadStore {
    /// Reads both users' persisted loads.
    fn get_loads(&self) -> RepoResult<CumulativeLoads>;
    /// Adds `delta` to the persisted loads.
    fn set_loads(&self, delta: LoadDelta) -> RepoResult<()>;
}

impl<T: LoadStore + ?Sized> LoadStore for &T {
    fn get_loads(&self) -> RepoResult<CumulativeLoads> {
        (**self).get_loads()
    }

    fn set_loads(&self, delta: LoadDelta) -> RepoResult<()> {
        (**self).set_loads(delta)
    }
}

/// SQLite-backed load store.
pub struct SqliteLoadRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLoadRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "user_loads", LOAD_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl LoadStore for SqliteLoadRepository<'_> {
    fn get_loads(&self) -> RepoResult<CumulativeLoads> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_slot, cumulative_load FROM user_loads ORDER BY user_slot ASC;")?;
        let mut rows = stmt.query([])?;

        let mut found: [Option<f64>; 2] = [None, None];
        while let Some(row) = rows.next()? {
            let slot_id: i64 = row.get("user_slot")?;
            let user = u8::try_from(slot_id)
                .ok()
                .and_then(|id| UserSlot::try_from(id).ok())
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "invalid user slot `{slot_id}` in user_loads.user_slot"
                    ))
                })?;
            found[user.index()] = Some(row.get("cumulative_load")?);
        }

        let [Some(user1), Some(user2)] = found else {
            return Err(RepoError::InvalidData(
                "user_loads must hold one row per user".to_string(),
            ));
        };
        let loads = CumulativeLoads::new(user1, user2);
        if let Some((user, value)) = loads.first_invalid() {
            return Err(RepoError::InvalidData(format!(
                "invalid cumulative load `{value}` for {user}"
            )));
        }
        Ok(loads)
    }

    fn set_loads(&self, delta: LoadDelta) -> RepoResult<()> {
        if let Some((user, value)) = delta.first_invalid() {
            return Err(RepoError::InvalidInput(format!(
                "load delta `{value}` for {user} must be finite and non-negative"
            )));
        }

        let changed = self.conn.execute(
            "UPDATE user_loads
             SET
                cumulative_load = cumulative_load + CASE user_slot WHEN 1 THEN ?1 ELSE ?2 END,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE user_slot IN (1, 2);",
            params![delta.user1, delta.user2],
        )?;

        if changed != 2 {
            return Err(RepoError::InvalidData(format!(
                "expected 2 user_loads rows, updated {changed}"
            )));
        }
        Ok(())
    }
}

//! Ordered schema steps for the chore database.
//!
//! Entry `n` of `MIGRATIONS` brings the schema to version `n + 1`. The
//! applied version is mirrored to `PRAGMA user_version`, and the load slot
//! rows seeded by the first step are re-checked on every open.

use crate::db::{DbError, DbResult};
use crate::model::chore::UserSlot;
use log::info;
use rusqlite::Connection;

const MIGRATIONS: &[&str] = &[include_str!("0001_init.sql")];

/// Schema version a fully migrated database reports.
pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Brings `conn` up to `latest_version()` and verifies the load slot rows.
///
/// Pending steps and the slot check share one transaction, so a database
/// that fails the check is left at its previous version.
///
/// # Errors
/// - `SchemaTooNew` when the file reports a version above `latest_version()`.
/// - `LoadSlotsMismatch` when `user_loads` does not hold exactly slots 1 and 2.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let tx = conn.transaction()?;
    for (version, sql) in (1_u32..).zip(MIGRATIONS).skip(found as usize) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    verify_load_slots(&tx)?;
    tx.commit()?;

    if found < supported {
        info!("event=db_migrate module=db status=ok from_version={found} to_version={supported}");
    }
    Ok(())
}

fn verify_load_slots(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT user_slot FROM user_loads ORDER BY user_slot;")?;
    let present = stmt
        .query_map([], |row| row.get::<_, u8>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if present != UserSlot::BOTH.map(u8::from) {
        return Err(DbError::LoadSlotsMismatch { present });
    }
    Ok(())
}

//! SQLite storage behind the load store and the assignment sink.
//!
//! # Responsibility
//! - Open connections that are ready for an allocation run.
//! - Keep the `user_loads` table holding one row per household member.
//!
//! # Invariants
//! - `PRAGMA user_version` equals `migrations::latest_version()` on every
//!   connection handed out by `open_db`/`open_db_in_memory`.
//! - `user_loads` holds exactly the slot rows 1 and 2; a database missing
//!   either row is refused at open time rather than read as a zero load.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build with more migrations.
    SchemaTooNew { found: u32, supported: u32 },
    /// `user_loads` does not hold exactly the two slot rows; `present` lists
    /// the slots that were found, in ascending order.
    LoadSlotsMismatch { present: Vec<u8> },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "chore database is at schema {found}, this build understands up to {supported}"
            ),
            Self::LoadSlotsMismatch { present } => write!(
                f,
                "user_loads must hold slots [1, 2], found {present:?}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::LoadSlotsMismatch { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

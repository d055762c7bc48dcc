//! Record store for the MediTrack core.
//!
//! An in-memory SQLite database owning the three entity collections (staff
//! accounts, patients, activity log entries) and their id counters. Each
//! entity kind gets its own operations file; ids are allocated from the
//! `id_seq` table, advance only on successful insert and are never reused,
//! even after a delete.

mod schema;
mod logs;
mod patients;
mod users;

pub use schema::*;
#[allow(unused_imports)]
pub use logs::*;
#[allow(unused_imports)]
pub use patients::*;
#[allow(unused_imports)]
pub use users::*;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

pub(crate) const KIND_USERS: &str = "users";
pub(crate) const KIND_PATIENTS: &str = "patients";
pub(crate) const KIND_ACTIVITY: &str = "activity_logs";

/// Record store errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (the default for this core; nothing is
    /// persisted across process restarts).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Peek the next id for an entity kind without consuming it.
    pub(crate) fn next_id(&self, kind: &str) -> DbResult<i64> {
        let next: i64 =
            self.conn
                .query_row("SELECT next FROM id_seq WHERE kind = ?", [kind], |row| {
                    row.get(0)
                })?;
        Ok(next)
    }

    /// Advance the id counter after a successful insert.
    pub(crate) fn advance_id(&self, kind: &str) -> DbResult<()> {
        self.conn
            .execute("UPDATE id_seq SET next = next + 1 WHERE kind = ?", [kind])?;
        Ok(())
    }
}

/// Parse an RFC 3339 column back into a UTC timestamp.
pub(crate) fn parse_timestamp(s: &str) -> DbResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

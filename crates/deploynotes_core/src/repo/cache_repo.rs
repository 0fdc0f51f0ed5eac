//! Local cache contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide a keyed, whole-value slot store for the note collection and
//!   its sync metadata.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every write replaces the full value for its key; no partial writes.
//! - Reads never interpret values; parsing belongs to the store.

use crate::db::DbError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CacheResult<T> = Result<T, CacheError>;

/// Local cache failure.
#[derive(Debug)]
pub enum CacheError {
    Db(DbError),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "local cache failure: {err}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for CacheError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for CacheError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Keyed persistent storage surviving process restarts.
pub trait LocalCache {
    /// Returns the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> CacheResult<Option<String>>;
    /// Overwrites the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> CacheResult<()>;
    /// Removes `key`; removing a missing key is not an error.
    fn remove(&self, key: &str) -> CacheResult<()>;
}

/// SQLite-backed local cache over the `kv_store` table.
pub struct SqliteLocalCache {
    conn: Connection,
}

impl SqliteLocalCache {
    /// Wraps a migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Returns the underlying connection, mainly for tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl LocalCache for SqliteLocalCache {
    fn read(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> CacheResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}

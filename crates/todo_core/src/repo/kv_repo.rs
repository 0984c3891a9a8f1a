//! Key-value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the device-local `get/set/remove` primitive used by stores.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Keys are non-empty after trimming; values are opaque UTF-8 text.
//! - `set_item` overwrites atomically; `remove_item` is idempotent.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Key-value storage failure.
#[derive(Debug)]
pub enum RepoError {
    InvalidKey(String),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidKey(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for string-keyed local storage.
pub trait KvRepository {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> RepoResult<()>;
    fn remove_item(&self, key: &str) -> RepoResult<()>;
}

/// SQLite-backed key-value repository.
///
/// Owns its connection so one repository can live for the whole process.
pub struct SqliteKvRepository {
    conn: Connection,
}

impl SqliteKvRepository {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KvRepository for SqliteKvRepository {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        let key = validate_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        debug!(
            "event=kv_get module=repo status=ok found={}",
            value.is_some()
        );
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = validate_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        debug!(
            "event=kv_set module=repo status=ok bytes={}",
            value.len()
        );
        Ok(())
    }

    fn remove_item(&self, key: &str) -> RepoResult<()> {
        let key = validate_key(key)?;
        let removed = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        debug!("event=kv_remove module=repo status=ok removed={removed}");
        Ok(())
    }
}

fn validate_key(key: &str) -> RepoResult<&str> {
    if key.trim().is_empty() {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(key)
}

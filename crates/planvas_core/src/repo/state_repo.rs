//! Key-value state repository and its SQLite implementation.
//!
//! # Responsibility
//! - Persist serialized planner state under fixed keys.
//! - Surface transport failures separately from unreadable stored data.
//!
//! # Invariants
//! - `save_value` replaces any existing value for the key.
//! - Deleting a missing key is a no-op.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for state persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Stored value exists but cannot be decoded.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted planner state: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
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

/// Durable key-value store for serialized state.
pub trait StateRepository {
    fn load_value(&self, key: &str) -> RepoResult<Option<String>>;
    fn save_value(&self, key: &str, value: &str) -> RepoResult<()>;
    fn delete_value(&self, key: &str) -> RepoResult<()>;
}

/// SQLite-backed state repository over the `app_state` table.
pub struct SqliteStateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateRepository<'conn> {
    /// Wraps a connection opened through `db::open_db*` (migrations applied).
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StateRepository for SqliteStateRepository<'_> {
    fn load_value(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_value(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO app_state (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete_value(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM app_state WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{SqliteStateRepository, StateRepository};
    use crate::db::open_db_in_memory;

    #[test]
    fn save_load_overwrite_and_delete() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteStateRepository::new(&conn);

        assert_eq!(repo.load_value("k").unwrap(), None);
        repo.save_value("k", "one").unwrap();
        assert_eq!(repo.load_value("k").unwrap().as_deref(), Some("one"));
        repo.save_value("k", "two").unwrap();
        assert_eq!(repo.load_value("k").unwrap().as_deref(), Some("two"));

        repo.delete_value("k").unwrap();
        repo.delete_value("k").unwrap();
        assert_eq!(repo.load_value("k").unwrap(), None);
    }
}

pub mod migrations;
pub mod models;
pub mod queries;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

/// Store-layer failure. Unique-constraint violations get their own variant
/// so the API boundary can translate them to 409 instead of 500; everything
/// else is an opaque persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),
    #[error("database lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        // SQLITE_CONSTRAINT_UNIQUE (2067) and SQLITE_CONSTRAINT_PRIMARYKEY
        // (1555) are duplicate-row races; other constraint codes (FK, CHECK)
        // stay opaque.
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == 2067 || err.extended_code == 1555 =>
            {
                StoreError::UniqueViolation
            }
            _ => StoreError::Sqlite(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn, &path.display().to_string())
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, ":memory:")
    }

    fn init(conn: Connection, label: &str) -> Result<Self> {
        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", label);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut conn)
    }
}

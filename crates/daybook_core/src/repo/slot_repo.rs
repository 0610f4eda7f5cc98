//! Slot store contracts with SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Provide whole-value read/write access to named string slots.
//! - Back slots with the `kv_slots` table for durable sessions.
//!
//! # Invariants
//! - Slot keys are non-blank.
//! - SQLite writes are upserts; `updated_at` tracks the last write.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type SlotResult<T> = Result<T, SlotError>;

/// Errors from slot reads and writes.
#[derive(Debug)]
pub enum SlotError {
    InvalidKey(String),
    Db(DbError),
    Unavailable(String),
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid slot key: `{key}`"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "slot storage unavailable: {message}"),
        }
    }
}

impl Error for SlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for SlotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SlotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key-value slot contract.
pub trait SlotStore {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>>;
    fn write_slot(&mut self, key: &str, value: &str) -> SlotResult<()>;
}

/// SQLite-backed slot store that owns its connection.
pub struct SqliteSlotStore {
    conn: Connection,
}

impl SqliteSlotStore {
    /// Wraps an already-migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> SlotResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a migrated in-memory database.
    pub fn open_in_memory() -> SlotResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SlotStore for SqliteSlotStore {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>> {
        let key = normalize_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_slot(&mut self, key: &str, value: &str) -> SlotResult<()> {
        let key = normalize_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Process-local slot store used for in-memory-only sessions.
#[derive(Debug, Default, Clone)]
pub struct MemorySlotStore {
    slots: HashMap<String, String>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one slot, e.g. to replay a previously exported snapshot.
    pub fn with_slot(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(key.into(), value.into());
        self
    }
}

impl SlotStore for MemorySlotStore {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>> {
        let key = normalize_key(key)?;
        Ok(self.slots.get(key).cloned())
    }

    fn write_slot(&mut self, key: &str, value: &str) -> SlotResult<()> {
        let key = normalize_key(key)?;
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn normalize_key(key: &str) -> SlotResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(SlotError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{MemorySlotStore, SlotError, SlotStore, SqliteSlotStore};

    #[test]
    fn sqlite_write_replaces_previous_value() {
        let mut store = SqliteSlotStore::open_in_memory().unwrap();
        assert_eq!(store.read_slot("events").unwrap(), None);

        store.write_slot("events", "[1]").unwrap();
        store.write_slot("events", "[2]").unwrap();

        assert_eq!(store.read_slot("events").unwrap().as_deref(), Some("[2]"));
        let rows: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM kv_slots;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn blank_keys_are_rejected() {
        let mut store = MemorySlotStore::new();
        let err = store.write_slot("  ", "[]").unwrap_err();
        assert!(matches!(err, SlotError::InvalidKey(_)));
    }

    #[test]
    fn memory_store_trims_keys() {
        let store = MemorySlotStore::new().with_slot("events", "[]");
        assert_eq!(store.read_slot(" events ").unwrap().as_deref(), Some("[]"));
    }
}

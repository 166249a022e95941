//! SQLite-backed key-value store
//!
//! All state lives in a single `app_state` table of string keys and values.

use super::KeyValueStore;
use crate::error::StorageResult;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure the table exists.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM app_state WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM app_state WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key")?;
        let keys = stmt
            .query_map(params![prefix], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.write("langlearn_last_set", "travel").unwrap();

        assert_eq!(
            store.read("langlearn_last_set").unwrap().as_deref(),
            Some("travel")
        );
        assert_eq!(store.read("missing").unwrap(), None);
    }

    #[test]
    fn test_write_overwrites() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.write("k", "one").unwrap();
        store.write("k", "two").unwrap();

        assert_eq!(store.read("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_delete() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.write("k", "v").unwrap();
        store.delete("k").unwrap();
        store.delete("never_written").unwrap();

        assert_eq!(store.read("k").unwrap(), None);
    }

    #[test]
    fn test_keys_with_prefix() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.write("langlearn_review_set_de", "[]").unwrap();
        store.write("langlearn_review_set_pl", "[]").unwrap();
        store.write("langlearn_progress_travel", "{}").unwrap();

        let keys = store.keys_with_prefix("langlearn_review_set_").unwrap();
        assert_eq!(keys, vec!["langlearn_review_set_de", "langlearn_review_set_pl"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langlearn.sqlite3");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.write("langlearn_required_streak", "3").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.read("langlearn_required_streak").unwrap().as_deref(),
            Some("3")
        );
    }
}

//! Key-value local storage on top of the `local_storage` table.
//!
//! Values are opaque strings; callers store JSON.

use rusqlite::{params, Connection, OptionalExtension};

use crate::types::errors::StorageError;

/// Local record keys used across the client.
pub mod keys {
    pub const BOOKMARKS: &str = "bookmarks";
    pub const THEME_PREFERENCES: &str = "theme_preferences";
    pub const VISITOR_ID: &str = "visitor_id";
    pub const VIEWED_ARTICLES: &str = "viewed_articles";
    pub const ADMIN_SESSION: &str = "admin_session";
}

/// Borrowing handle over the local key-value table.
#[derive(Clone, Copy)]
pub struct LocalStorage<'a> {
    conn: &'a Connection,
}

impl<'a> LocalStorage<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// Deletes `key`. Returns whether a record existed.
    pub fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM local_storage ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Deletes every record.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM local_storage", [])?;
        Ok(())
    }
}

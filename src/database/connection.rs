//! SQLite connection management for Quillpost's local storage.
//!
//! Provides the [`Database`] struct that wraps a `rusqlite::Connection`
//! and automatically runs schema migrations on open.

use rusqlite::Connection;
use std::path::Path;

use super::migrations;
use crate::types::errors::StorageError;

/// Device-local database holding the key-value store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database at `path` and runs migrations.
    ///
    /// Parent directories are created when missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::OpenFailed(format!("{}: {}", parent.display(), e)))?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| StorageError::OpenFailed(format!("{}: {}", path.display(), e)))?;
        let db = Self { conn };
        db.run_migrations()?;
        tracing::debug!(path = %path.display(), "opened local storage");
        Ok(db)
    }

    /// Opens an in-memory database and runs migrations.
    ///
    /// The contents are discarded when the `Database` is dropped.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::OpenFailed(e.to_string()))?;
        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<(), StorageError> {
        migrations::run_all(&self.conn).map_err(|e| StorageError::OpenFailed(e.to_string()))
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

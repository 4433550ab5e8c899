//! Schema migrations for the local storage database.
//!
//! Applied versions are recorded in `schema_version`; each step in
//! [`MIGRATIONS`] runs once, in order, inside its own transaction.

use rusqlite::Connection;

/// A numbered schema step.
struct Migration {
    version: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Key-value local storage",
    sql: "CREATE TABLE IF NOT EXISTS local_storage (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at INTEGER NOT NULL
          );",
}];

/// Version of the last entry in [`MIGRATIONS`].
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Highest applied version, 0 on a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Brings the schema up to date. Runs on every open.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);
    for step in MIGRATIONS.iter().filter(|m| m.version > current) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(step.sql)?;
        tx.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
            rusqlite::params![step.version, chrono::Utc::now().timestamp(), step.description],
        )?;
        tx.commit()?;
        tracing::debug!(version = step.version, "applied local storage migration");
    }
    Ok(())
}

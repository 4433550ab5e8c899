//! Quillpost local storage layer.
//!
//! Provides SQLite connection management, schema migrations and the
//! key-value store that device-local records live in.
//!
//! # Usage
//!
//! ```no_run
//! use quillpost::database::{Database, LocalStorage};
//!
//! let db = Database::open("quillpost.db").expect("failed to open database");
//! let store = LocalStorage::new(db.connection());
//! store.set("visitor_id", "\"abc\"").expect("failed to write");
//! ```

pub mod connection;
pub mod local_storage;
pub mod migrations;

pub use connection::Database;
pub use local_storage::LocalStorage;

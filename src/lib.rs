//! Quillpost: client library for a blog backed by a hosted REST database.
//!
//! This library crate exposes all modules for use by the RPC binary and integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;

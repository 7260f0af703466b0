//! Storage Layer - SQLite-backed persistence
//!
//! Two pieces:
//! - `ConnectionManager` opens and closes connections around query,
//!   mutation and batch scopes
//! - `SqliteStore` generates statements from table schemas and runs them
//!   through the manager

pub mod connection;
pub mod sqlite;

pub use connection::{ConnMode, ConnectionManager, ConnectionScope, DbPath};
pub use sqlite::SqliteStore;

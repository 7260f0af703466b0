//! # mrdb - declarative tables over SQLite
//!
//! A small object-relational layer for an embedded SQLite store.
//!
//! mrdb provides:
//! - Declarative table schemas built from ordered `Column` descriptors
//! - Generated CREATE/DROP/INSERT/UPDATE/DELETE/SELECT statements
//! - Foreign-key reference resolution between registered schemas
//! - Record instances and schema-homogeneous record collections
//! - A connection manager with query, mutation and batch transaction modes

pub mod value;
pub mod schema;
pub mod record;
pub mod records;
pub mod condition;
pub mod query;
pub mod storage;
pub mod grid;
pub mod config;
pub mod logging;
pub mod ui;

// Re-exports for convenient access
pub use value::Value;
pub use schema::{Column, ForeignKey, SqlType, TableRef, TableSchema};
pub use record::{FromValue, Model, Record};
pub use records::Records;
pub use condition::{Condition, Operator};
pub use query::{Order, Query};
pub use storage::{ConnMode, ConnectionManager, DbPath, SqliteStore};
pub use grid::GridModel;

/// Result type alias for mrdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for mrdb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Portable text error: {0}")]
    PortableText(#[from] serde_json::Error),

    #[error("Unknown column '{column}' in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Column index {index} out of range for table {table} ({count} columns)")]
    ColumnIndex {
        table: String,
        index: usize,
        count: usize,
    },

    #[error("Default value of column '{column}' does not match type {sql_type}: {value}")]
    DefaultType {
        column: String,
        sql_type: String,
        value: String,
    },

    #[error("Schema mismatch: expected table {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("Records collection cannot be built from an empty record list")]
    EmptyRecords,

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Table {table} has no reference to {target}")]
    UnknownReference { table: String, target: String },

    #[error("Table {0} has no 'id' column for a default condition")]
    MissingIdColumn(String),

    #[error("Table {0} has no id left after i64::MAX")]
    IdExhausted(String),

    #[error("A {0} scope is already active on this connection manager")]
    ScopeActive(storage::ConnMode),

    #[error("No connection scope is active")]
    NoActiveScope,

    #[error("Cannot convert {value} into {target}")]
    ValueConversion { value: String, target: &'static str },
}

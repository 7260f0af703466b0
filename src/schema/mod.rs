//! Schema layer - column descriptors, table descriptors, validation
//!
//! Tables are declared explicitly with a builder:
//!
//! ```
//! use mrdb::{Column, SqlType, TableSchema};
//!
//! let city = TableSchema::builder("City")
//!     .column(Column::new("id", SqlType::Integer).primary_key())
//!     .column(Column::new("cityName", SqlType::Varchar(Some(40))).default("New York"))
//!     .build();
//! assert_eq!(city.column_count(), 2);
//! ```

pub mod column;
pub mod table;
pub mod validation;

pub use column::{Column, ForeignKey, SqlType};
pub use table::{Reference, SchemaBuilder, TableSchema};
pub use validation::validate_model;

use std::sync::Arc;

/// A table named either directly or through its schema.
#[derive(Debug, Clone, Copy)]
pub enum TableRef<'a> {
    Name(&'a str),
    Schema(&'a TableSchema),
}

impl<'a> TableRef<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            TableRef::Name(name) => name,
            TableRef::Schema(schema) => schema.name(),
        }
    }
}

impl<'a> From<&'a str> for TableRef<'a> {
    fn from(name: &'a str) -> Self {
        TableRef::Name(name)
    }
}

impl<'a> From<&'a String> for TableRef<'a> {
    fn from(name: &'a String) -> Self {
        TableRef::Name(name)
    }
}

impl<'a> From<&'a TableSchema> for TableRef<'a> {
    fn from(schema: &'a TableSchema) -> Self {
        TableRef::Schema(schema)
    }
}

impl<'a> From<&'a Arc<TableSchema>> for TableRef<'a> {
    fn from(schema: &'a Arc<TableSchema>) -> Self {
        TableRef::Schema(schema)
    }
}

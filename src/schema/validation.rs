//! Schema validation
//!
//! A diagnostic pass over a declaration. Findings come back as data, an
//! `(all_ok, messages)` pair, and are logged; nothing here returns `Err`.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::column::SqlType;
use super::table::TableSchema;
use crate::record::{Model, Record};

static IDENTIFIER: OnceLock<Regex> = OnceLock::new();

fn identifier() -> &'static Regex {
    IDENTIFIER.get_or_init(|| Regex::new(r"\A[A-Za-z_][A-Za-z0-9_]*\z").expect("static pattern"))
}

fn report(messages: &mut Vec<String>, table: &str, msg: String) {
    tracing::error!(table = %table, "{}", msg);
    messages.push(msg);
}

impl TableSchema {
    /// Check that the declaration can be instantiated and that every column
    /// is well formed.
    ///
    /// Returns `(all_ok, messages)`; `messages` is empty when `all_ok`.
    pub fn table_schema_validation(&self) -> (bool, Vec<String>) {
        let mut messages = Vec::new();
        let table = self.name();

        if !identifier().is_match(table) {
            report(&mut messages, table, format!("Table name is not a valid identifier: {:?}", table));
        }

        // Instantiation: every default must fit its column.
        for column in self.columns() {
            if let Err(e) = column.literal(&column.default) {
                report(&mut messages, table, format!("Cannot instantiate {}: {}", table, e));
            }
        }

        let mut seen = HashSet::new();
        for column in self.columns() {
            if !identifier().is_match(&column.name) {
                report(
                    &mut messages,
                    table,
                    format!("Column name is not a valid identifier: {:?}", column.name),
                );
            }
            if !seen.insert(column.name.as_str()) {
                report(&mut messages, table, format!("Duplicate column: {}", column.name));
            }
            if column.auto_increment && !(column.primary_key && column.sql_type == SqlType::Integer) {
                report(
                    &mut messages,
                    table,
                    format!("Auto increment requires an INTEGER primary key: {}", column.name),
                );
            }
            if let Some(fk) = &column.foreign_key {
                if fk.table.is_empty() || fk.column.is_empty() {
                    report(
                        &mut messages,
                        table,
                        format!("Foreign key of column {} has an empty target", column.name),
                    );
                }
            }
        }

        let keys: Vec<&str> = self
            .columns()
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect();
        if keys.len() > 1 {
            report(
                &mut messages,
                table,
                format!("Composite primary keys are not supported: {:?}", keys),
            );
        }

        (messages.is_empty(), messages)
    }
}

/// Validate a typed model: the schema checks plus a comparison of the
/// model's writable fields against the declared columns.
pub fn validate_model<M: Model>() -> (bool, Vec<String>) {
    let schema = M::schema();
    let (_, mut messages) = schema.table_schema_validation();
    let table = schema.name();

    if let Err(e) = M::from_record(&Record::new(&schema)) {
        report(&mut messages, table, format!("Cannot instantiate {}: {}", table, e));
    }

    let columns: HashSet<&str> = schema.column_names().collect();
    let fields: HashSet<&str> = M::field_names().iter().copied().collect();

    let mut unexpected: Vec<&str> = fields.difference(&columns).copied().collect();
    let mut missing: Vec<&str> = columns.difference(&fields).copied().collect();
    unexpected.sort_unstable();
    missing.sort_unstable();

    if !unexpected.is_empty() {
        report(&mut messages, table, format!("Unexpected instance attributes: {:?}", unexpected));
    }
    if !missing.is_empty() {
        report(&mut messages, table, format!("Missing instance attributes: {:?}", missing));
    }

    (messages.is_empty(), messages)
}

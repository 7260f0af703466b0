//! Table schema descriptors
//!
//! A `TableSchema` is the ordered column set of one table. Declaration order
//! is the canonical order for every generated statement and every row zip,
//! so columns are never re-sorted after `build()`.

use std::collections::HashMap;
use std::sync::Arc;

use super::column::Column;
use crate::value::Value;
use crate::Result;

/// A foreign-key link registered when the schema is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Table the link points at
    pub target_table: String,
    /// Schema of that table, when the column was declared with one
    pub target: Option<Arc<TableSchema>>,
    /// Column in the target table
    pub target_column: String,
    /// Referencing column in this table
    pub column: String,
    /// Position of the referencing column
    pub position: usize,
}

/// Declarative description of one table.
#[derive(Debug, PartialEq)]
pub struct TableSchema {
    name: String,
    columns: Vec<Column>,
    positions: HashMap<String, usize>,
    references: Vec<Reference>,
}

/// Collects columns in declaration order, then freezes them into a schema.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    columns: Vec<Column>,
}

impl SchemaBuilder {
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Freeze the declaration. The reference map is built here, once.
    ///
    /// Building never fails: malformed declarations are reported by
    /// [`TableSchema::table_schema_validation`].
    pub fn build(self) -> Arc<TableSchema> {
        let mut positions = HashMap::with_capacity(self.columns.len());
        for (i, column) in self.columns.iter().enumerate() {
            positions.entry(column.name.clone()).or_insert(i);
        }

        let references = self
            .columns
            .iter()
            .enumerate()
            .filter_map(|(position, column)| {
                column.foreign_key.as_ref().map(|fk| Reference {
                    target_table: fk.table.clone(),
                    target: fk.target.clone(),
                    target_column: fk.column.clone(),
                    column: column.name.clone(),
                    position,
                })
            })
            .collect();

        Arc::new(TableSchema {
            name: self.name,
            columns: self.columns,
            positions,
            references,
        })
    }
}

impl TableSchema {
    /// Start declaring a table. The table name is the schema's own name.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Declaration index of a column
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn foreign_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_foreign_key())
    }

    /// Foreign-key links in declaration order
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// First link pointing at `target_table`
    pub fn reference(&self, target_table: &str) -> Option<&Reference> {
        self.references.iter().find(|r| r.target_table == target_table)
    }

    /// Header texts, display name where declared and column name otherwise
    pub fn display_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label().to_string()).collect()
    }

    /// Default value of every column, in declaration order
    pub fn defaults(&self) -> Vec<Value> {
        self.columns.iter().map(|c| c.default.clone()).collect()
    }

    /// CREATE TABLE statement.
    ///
    /// Primary-key columns come first, the rest keep declaration order,
    /// followed by one FOREIGN KEY clause per referencing column.
    pub fn create_table_sql(&self) -> Result<String> {
        let (keys, others): (Vec<&Column>, Vec<&Column>) =
            self.columns.iter().partition(|c| c.primary_key);

        let mut clauses = keys
            .into_iter()
            .chain(others)
            .map(Column::clause)
            .collect::<Result<Vec<String>>>()?;

        clauses.extend(
            self.columns
                .iter()
                .filter_map(|c| c.foreign_key.as_ref().map(|fk| fk.clause(&c.name))),
        );

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {}({});",
            self.name,
            clauses.join(", ")
        ))
    }

    /// DROP statement; idempotent when the table is absent
    pub fn drop_table_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.name)
    }
}

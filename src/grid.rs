//! Table-data adapter for grid-style presentation layers
//!
//! Keeps a [`Records`] collection and the store in step: every cell edit,
//! row insert and row delete made through the grid is persisted before
//! the in-memory collection changes.

use crate::record::Record;
use crate::records::Records;
use crate::schema::TableSchema;
use crate::storage::SqliteStore;
use crate::value::Value;
use crate::Result;
use std::sync::Arc;

pub struct GridModel<'s> {
    store: &'s SqliteStore,
    records: Records,
}

impl<'s> GridModel<'s> {
    pub fn new(store: &'s SqliteStore, records: Records) -> Self {
        Self { store, records }
    }

    /// Grid over every row of `schema`, ordered by id
    pub fn load(store: &'s SqliteStore, schema: &Arc<TableSchema>) -> Result<Self> {
        let order = schema.position("id").map(|_| ["id"]);
        let records = store.select_many(schema, None, order.as_ref().map(|o| &o[..]), true, 0)?;
        Ok(Self::new(store, records))
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn column_count(&self) -> usize {
        self.records.schema().column_count()
    }

    /// Header text of a column, its display name when one is declared
    pub fn header(&self, column: usize) -> Option<&str> {
        self.records.schema().column_at(column).map(|c| c.label())
    }

    /// The first column holds the key and is read-only
    pub fn is_editable(&self, column: usize) -> bool {
        column != 0 && column < self.column_count()
    }

    pub fn data(&self, row: usize, column: usize) -> Option<&Value> {
        self.records.get(row)?.value_by_index(column)
    }

    /// Write one cell and persist the row. Returns `false` without touching
    /// anything when the cell is read-only or out of range.
    pub fn set_data(&mut self, row: usize, column: usize, value: impl Into<Value>) -> Result<bool> {
        if !self.is_editable(column) {
            return Ok(false);
        }
        let Some(record) = self.records.get(row) else {
            return Ok(false);
        };

        let mut edited = record.clone();
        edited.set_value_by_index(column, value)?;
        self.store.update(&edited, None)?;
        if let Some(slot) = self.records.get_mut(row) {
            *slot = edited;
        }
        Ok(true)
    }

    /// Insert a default row with a fresh id at `position` (clamped to the end)
    pub fn insert_row(&mut self, position: usize) -> Result<()> {
        let schema = Arc::clone(self.records.schema());
        let mut record = Record::new(&schema);
        record.set("id", self.store.next_id(&schema, "id")?)?;

        self.store.insert(&record)?;
        self.records.insert(position, record)
    }

    /// Delete rows from the store in one batch, then drop them from the grid.
    /// Returns how many rows were removed.
    pub fn remove_rows(&mut self, rows: &[usize]) -> Result<usize> {
        let doomed: Vec<_> = rows
            .iter()
            .filter_map(|&row| self.records.get(row).cloned())
            .collect();

        self.store.batch(|store| {
            for record in &doomed {
                store.delete(record, None)?;
            }
            Ok(())
        })?;

        // Second pass by value, so earlier removals cannot shift later indices.
        let removed = doomed.iter().filter(|r| self.records.remove(r)).count();
        tracing::debug!(table = %self.records.schema().name(), removed, "Rows removed");
        Ok(removed)
    }

    pub fn sort(&mut self, column: usize, reverse: bool) -> Result<()> {
        self.records.sort(column, reverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, SqlType};

    fn city() -> Arc<TableSchema> {
        TableSchema::builder("City")
            .column(Column::new("id", SqlType::Integer).primary_key().display_name("Id"))
            .column(
                Column::new("postalCode", SqlType::SmallInt)
                    .default(9999)
                    .display_name("Postal Code"),
            )
            .column(Column::new("cityName", SqlType::Varchar(Some(40))).default("New York"))
            .build()
    }

    fn seeded(store: &SqliteStore) -> Arc<TableSchema> {
        let schema = city();
        store.create_table(&schema).unwrap();
        for (id, postal, name) in [(0, 8300, "Odder"), (1, 8000, "Aarhus"), (2, 8660, "Skanderborg")] {
            let record = Record::from_row(&schema, vec![Value::from(id), postal.into(), name.into()]);
            store.insert(&record).unwrap();
        }
        schema
    }

    #[test]
    fn test_shape_and_headers() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = seeded(&store);
        let grid = GridModel::load(&store, &schema).unwrap();

        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.header(1), Some("Postal Code"));
        assert_eq!(grid.header(2), Some("cityName"));
        assert!(!grid.is_editable(0));
        assert!(grid.is_editable(2));
        assert_eq!(grid.data(1, 2), Some(&Value::from("Aarhus")));
    }

    #[test]
    fn test_set_data_persists() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = seeded(&store);
        let mut grid = GridModel::load(&store, &schema).unwrap();

        assert!(!grid.set_data(0, 0, 99).unwrap());
        assert!(grid.set_data(0, 2, "Hou").unwrap());

        let stored = store.select_one(&schema, "id = 0").unwrap().unwrap();
        assert_eq!(stored.get_as::<String>("cityName").unwrap(), "Hou");
    }

    #[test]
    fn test_failed_edit_leaves_grid_unchanged() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = seeded(&store);
        let mut grid = GridModel::load(&store, &schema).unwrap();
        store.drop_table(&schema).unwrap();

        assert!(grid.set_data(1, 2, "Aarhus C").is_err());
        assert_eq!(grid.data(1, 2), Some(&Value::from("Aarhus")));
    }

    #[test]
    fn test_insert_and_remove_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = seeded(&store);
        let mut grid = GridModel::load(&store, &schema).unwrap();

        grid.insert_row(0).unwrap();
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.data(0, 0), Some(&Value::Integer(3)));
        assert_eq!(grid.data(0, 2), Some(&Value::from("New York")));

        assert_eq!(grid.remove_rows(&[0, 2]).unwrap(), 2);
        assert_eq!(grid.row_count(), 2);
        let remaining = store.select_many(&schema, None, None, true, 0).unwrap();
        let ids: Vec<i64> = remaining.iter().map(|r| r.get_as("id").unwrap()).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_sort() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = seeded(&store);
        let mut grid = GridModel::load(&store, &schema).unwrap();

        grid.sort(1, true).unwrap();
        assert_eq!(grid.data(0, 2), Some(&Value::from("Skanderborg")));
        assert!(grid.sort(5, false).is_err());
    }
}

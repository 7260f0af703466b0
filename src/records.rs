//! Records collection - an ordered, schema-homogeneous list of records
//!
//! Mutating a collection never touches the store; persistence is always an
//! explicit `SqliteStore` call.

use std::sync::Arc;

use crate::record::Record;
use crate::schema::TableSchema;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct Records {
    schema: Arc<TableSchema>,
    records: Vec<Record>,
}

impl Records {
    /// Build from a non-empty list of records that all share one schema.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let schema = records.first().ok_or(Error::EmptyRecords)?.schema().clone();
        let collection = Self::empty(&schema);
        collection.check_all(&records)?;
        Ok(Self {
            records,
            ..collection
        })
    }

    /// Empty collection bound to a schema, as returned for a query with no rows
    pub fn empty(schema: &Arc<TableSchema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            records: Vec::new(),
        }
    }

    /// The schema every record in this collection conforms to
    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.records.iter_mut()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn append(&mut self, record: Record) -> Result<()> {
        self.check(&record)?;
        self.records.push(record);
        Ok(())
    }

    /// Insert before `index`; an index past the end appends
    pub fn insert(&mut self, index: usize, record: Record) -> Result<()> {
        self.check(&record)?;
        let index = index.min(self.records.len());
        self.records.insert(index, record);
        Ok(())
    }

    /// Remove and return the last record
    pub fn pop(&mut self) -> Option<Record> {
        self.records.pop()
    }

    /// Remove and return the record at `index`
    pub fn pop_at(&mut self, index: usize) -> Option<Record> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    /// Remove the first record equal to `record`. Returns whether one was found.
    pub fn remove(&mut self, record: &Record) -> bool {
        match self.index(record) {
            Some(i) => {
                self.records.remove(i);
                true
            }
            None => false,
        }
    }

    /// Position of the first record equal to `record`
    pub fn index(&self, record: &Record) -> Option<usize> {
        self.records.iter().position(|r| r == record)
    }

    /// Stable in-place sort keyed by the value at `column_index`, in
    /// declaration order of the shared schema.
    pub fn sort(&mut self, column_index: usize, reverse: bool) -> Result<()> {
        if column_index >= self.schema.column_count() {
            return Err(Error::ColumnIndex {
                table: self.schema.name().to_string(),
                index: column_index,
                count: self.schema.column_count(),
            });
        }

        self.records.sort_by(|a, b| {
            let (a, b) = (&a.values()[column_index], &b.values()[column_index]);
            if reverse {
                b.natural_cmp(a)
            } else {
                a.natural_cmp(b)
            }
        });
        Ok(())
    }

    fn check(&self, record: &Record) -> Result<()> {
        if Arc::ptr_eq(record.schema(), &self.schema) || **record.schema() == *self.schema {
            Ok(())
        } else {
            Err(Error::SchemaMismatch {
                expected: self.schema.name().to_string(),
                found: record.table_name().to_string(),
            })
        }
    }

    fn check_all(&self, records: &[Record]) -> Result<()> {
        records.iter().try_for_each(|r| self.check(r))
    }
}

impl std::ops::Index<usize> for Records {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.records[index]
    }
}

impl IntoIterator for Records {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Records {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, SqlType};
    use crate::Value;

    fn city() -> Arc<TableSchema> {
        TableSchema::builder("City")
            .column(Column::new("id", SqlType::Integer).primary_key())
            .column(Column::new("postalCode", SqlType::SmallInt).default(9999))
            .column(Column::new("cityName", SqlType::Varchar(Some(40))))
            .build()
    }

    fn city_record(schema: &Arc<TableSchema>, id: i64, postal: i64, name: &str) -> Record {
        Record::from_row(schema, vec![id.into(), postal.into(), name.into()])
    }

    fn sample() -> Records {
        let schema = city();
        Records::from_records(vec![
            city_record(&schema, 0, 8300, "Odder"),
            city_record(&schema, 1, 8000, "Aarhus"),
            city_record(&schema, 2, 8300, "Hou"),
            city_record(&schema, 3, 8660, "Skanderborg"),
        ])
        .unwrap()
    }

    fn ids(records: &Records) -> Vec<i64> {
        records.iter().map(|r| r.get_as::<i64>("id").unwrap()).collect()
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(Records::from_records(Vec::new()), Err(Error::EmptyRecords)));
        assert!(Records::empty(&city()).is_empty());
    }

    #[test]
    fn test_heterogeneous_records_rejected() {
        let tag = TableSchema::builder("Tag")
            .column(Column::new("id", SqlType::Integer).primary_key())
            .build();
        let mixed = vec![Record::new(&city()), Record::new(&tag)];
        assert!(matches!(
            Records::from_records(mixed),
            Err(Error::SchemaMismatch { .. })
        ));

        let mut records = sample();
        assert!(records.append(Record::new(&tag)).is_err());
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_sort_is_stable_both_ways() {
        let mut records = sample();
        records.sort(1, false).unwrap();
        assert_eq!(ids(&records), vec![1, 0, 2, 3]);

        records.sort(1, true).unwrap();
        assert_eq!(ids(&records), vec![3, 0, 2, 1]);

        records.sort(2, false).unwrap();
        assert_eq!(ids(&records), vec![1, 2, 0, 3]);

        assert!(records.sort(3, false).is_err());
    }

    #[test]
    fn test_sequence_operations() {
        let mut records = sample();
        let schema = records.schema().clone();
        let extra = city_record(&schema, 9, 9999, "Boston");

        records.insert(1, extra.clone()).unwrap();
        assert_eq!(records.index(&extra), Some(1));
        assert_eq!(records[1].get("cityName"), Some(&Value::from("Boston")));

        assert!(records.remove(&extra));
        assert!(!records.remove(&extra));
        assert_eq!(records.index(&extra), None);

        let last = records.pop().unwrap();
        assert_eq!(last.get_as::<i64>("id").unwrap(), 3);
        let first = records.pop_at(0).unwrap();
        assert_eq!(first.get_as::<i64>("id").unwrap(), 0);
        assert!(records.pop_at(10).is_none());
        assert_eq!(ids(&records), vec![1, 2]);
        assert_eq!(records.first().unwrap().get_as::<i64>("id").unwrap(), 1);
        assert_eq!(records.last().unwrap().get_as::<i64>("id").unwrap(), 2);
    }
}

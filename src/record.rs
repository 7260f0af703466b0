//! Record instances - one in-memory row conforming to a table schema
//!
//! Values are held in declaration order, one per column, so a record can be
//! zipped against a result row or bound to a generated statement directly.

use std::fmt;
use std::sync::Arc;

use crate::condition::Condition;
use crate::schema::{SqlType, TableSchema};
use crate::value::Value;
use crate::{Error, Result};

/// Keys of the portable record text that are not column names
const TABLE_NAME_KEY: &str = "table_name";
const HEADERS_KEY: &str = "headers";

/// A live, mutable row value.
///
/// `Clone` yields a fully independent copy of every field; only the
/// immutable schema descriptor is shared.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<TableSchema>,
    values: Vec<Value>,
}

impl Record {
    /// Fresh record with every field set to its column default
    pub fn new(schema: &Arc<TableSchema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            values: schema.defaults(),
        }
    }

    /// Record hydrated positionally from a result row
    pub fn from_row(schema: &Arc<TableSchema>, row: Vec<Value>) -> Self {
        let mut record = Self::new(schema);
        record.from_sql_record(row);
        record
    }

    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    pub fn table_name(&self) -> &str {
        self.schema.name()
    }

    /// Field values in declaration order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.schema.position(column).map(|i| &self.values[i])
    }

    /// Typed field read
    pub fn get_as<T: FromValue>(&self, column: &str) -> Result<T> {
        let value = self.get(column).ok_or_else(|| self.unknown_column(column))?;
        T::from_value(value)
    }

    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        let index = self
            .schema
            .position(column)
            .ok_or_else(|| self.unknown_column(column))?;
        self.values[index] = value.into();
        Ok(())
    }

    pub fn value_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn set_value_by_index(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let count = self.values.len();
        let slot = self.values.get_mut(index).ok_or_else(|| Error::ColumnIndex {
            table: self.schema.name().to_string(),
            index,
            count,
        })?;
        *slot = value.into();
        Ok(())
    }

    /// The `id` field, when the schema declares one
    pub fn id(&self) -> Option<&Value> {
        self.get("id")
    }

    /// `id = <this record's id>`, the condition update and delete fall back to
    pub fn default_condition(&self) -> Result<Condition> {
        let id = self
            .id()
            .ok_or_else(|| Error::MissingIdColumn(self.schema.name().to_string()))?;
        Ok(Condition::eq("id", id.clone()))
    }

    /// Assign fields positionally from a result row. Extra row values are
    /// ignored; fields past the end of a short row keep their value.
    pub fn from_sql_record(&mut self, row: impl IntoIterator<Item = Value>) {
        for (slot, value) in self.values.iter_mut().zip(row) {
            *slot = value;
        }
    }

    pub fn reset_to_default(&mut self) {
        self.values = self.schema.defaults();
    }

    /// Assign fields from portable record text. Keys are column names;
    /// columns without a key fall back to their default.
    pub fn from_portable_text(&mut self, text: &str) -> Result<()> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;

        let values = self
            .schema
            .columns()
            .iter()
            .map(|column| match object.get(&column.name) {
                Some(json) if column.sql_type == SqlType::Real => Value::from_json_real(json),
                Some(json) => Value::from_json(json),
                None => Ok(column.default.clone()),
            })
            .collect::<Result<Vec<Value>>>()?;

        self.values = values;
        Ok(())
    }

    /// Portable record text: table name, ordered column names, and one
    /// key per column.
    pub fn to_portable_text(&self) -> Result<String> {
        let mut object = serde_json::Map::new();
        object.insert(TABLE_NAME_KEY.to_string(), self.schema.name().into());
        object.insert(
            HEADERS_KEY.to_string(),
            self.schema.column_names().collect::<Vec<_>>().into(),
        );
        for (name, value) in self.schema.column_names().zip(&self.values) {
            object.insert(name.to_string(), value.to_json());
        }
        Ok(serde_json::to_string(&object)?)
    }

    fn unknown_column(&self, column: &str) -> Error {
        Error::UnknownColumn {
            table: self.schema.name().to_string(),
            column: column.to_string(),
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.values == other.values
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .schema
            .column_names()
            .zip(&self.values)
            .map(|(name, value)| format!("{} : {}", name, value))
            .collect();
        write!(f, "{} ({})", self.schema.name(), fields.join(", "))
    }
}

/// Typed extraction from a field value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn conversion_error(value: &Value, target: &'static str) -> Error {
    Error::ValueConversion {
        value: format!("{} ({})", value, value.kind()),
        target,
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_i64().ok_or_else(|| conversion_error(value, "i64"))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| conversion_error(value, "i32"))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| conversion_error(value, "f64"))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_i64()
            .map(|i| i != 0)
            .ok_or_else(|| conversion_error(value, "bool"))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| conversion_error(value, "String"))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_blob()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| conversion_error(value, "Vec<u8>"))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// A typed struct backed by a table schema.
///
/// Implementors declare their schema once and convert to and from
/// [`Record`]; the store works on records.
pub trait Model: Sized {
    /// The table declaration
    fn schema() -> Arc<TableSchema>;

    /// Names of the struct's writable fields
    fn field_names() -> &'static [&'static str];

    fn to_record(&self) -> Result<Record>;

    fn from_record(record: &Record) -> Result<Self>;
}

//! Column descriptors and SQL type tags

use std::fmt;
use std::sync::Arc;

use super::table::TableSchema;
use crate::value::Value;
use crate::{Error, Result};

/// Scalar SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Integer,
    SmallInt,
    Real,
    /// Fixed-width text, `CHAR(n)`
    Char(u32),
    /// Variable-width text, `VARCHAR(n)` or bare `VARCHAR`
    Varchar(Option<u32>),
    DateTime,
    Blob,
}

impl SqlType {
    /// SQL type text as it appears in DDL
    pub fn sql(&self) -> String {
        match self {
            SqlType::Integer => "INTEGER".to_string(),
            SqlType::SmallInt => "SMALLINT".to_string(),
            SqlType::Real => "REAL".to_string(),
            SqlType::Char(n) => format!("CHAR({})", n),
            SqlType::Varchar(Some(n)) => format!("VARCHAR({})", n),
            SqlType::Varchar(None) => "VARCHAR".to_string(),
            SqlType::DateTime => "DATETIME".to_string(),
            SqlType::Blob => "BLOB".to_string(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SqlType::Integer | SqlType::SmallInt | SqlType::Real)
    }

    /// Type tag for a declared type as SQLite reports it (`PRAGMA table_info`).
    /// Unrecognised declarations read as bare `VARCHAR`.
    pub fn from_declared(declared: &str) -> SqlType {
        let declared = declared.trim().to_ascii_uppercase();
        let (base, width) = match declared.split_once('(') {
            Some((base, rest)) => (
                base.trim(),
                rest.trim_end_matches(')').trim().parse::<u32>().ok(),
            ),
            None => (declared.as_str(), None),
        };

        match (base, width) {
            ("INTEGER" | "INT" | "BIGINT", _) => SqlType::Integer,
            ("SMALLINT" | "TINYINT", _) => SqlType::SmallInt,
            ("REAL" | "FLOAT" | "DOUBLE", _) => SqlType::Real,
            ("CHAR", Some(n)) => SqlType::Char(n),
            ("DATETIME", _) => SqlType::DateTime,
            ("BLOB", _) => SqlType::Blob,
            (_, width) => SqlType::Varchar(width),
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, SqlType::Char(_) | SqlType::Varchar(_) | SqlType::DateTime)
    }

    /// Whether a value of this storage class belongs in a column of this type.
    /// NULL fits every column.
    pub fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Integer(_) => self.is_numeric(),
            Value::Real(_) => matches!(self, SqlType::Real),
            Value::Text(_) => self.is_textual(),
            Value::Blob(_) => matches!(self, SqlType::Blob),
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql())
    }
}

/// Target of a foreign key: a table and a column in that table.
///
/// `target` holds the target schema when it was known at declaration time.
/// Self-references and cycles are declared by name only and looked up when
/// the reference is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub target: Option<Arc<TableSchema>>,
}

impl ForeignKey {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            target: None,
        }
    }

    pub fn to_schema(target: &Arc<TableSchema>, column: impl Into<String>) -> Self {
        Self {
            table: target.name().to_string(),
            column: column.into(),
            target: Some(Arc::clone(target)),
        }
    }

    /// `FOREIGN KEY (<local>) REFERENCES <table>(<column>)`
    pub fn clause(&self, local_column: &str) -> String {
        format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            local_column, self.table, self.column
        )
    }
}

/// One attribute of a table schema.
///
/// Declared once with the builder methods and never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    /// `Value::Null` means the column has no default
    pub default: Value,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique: bool,
    pub not_null: bool,
    pub foreign_key: Option<ForeignKey>,
    pub display_name: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            default: Value::Null,
            primary_key: false,
            auto_increment: false,
            unique: false,
            not_null: false,
            foreign_key: None,
            display_name: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Reference a table by name; the schema is looked up on resolution
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey::new(table, column));
        self
    }

    /// Reference a table whose schema is already built
    pub fn references_schema(mut self, target: &Arc<TableSchema>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey::to_schema(target, column));
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Header text for presentation, falling back to the column name
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key.is_some()
    }

    /// Render a value as an SQL literal for this column's type.
    ///
    /// Text is single-quoted with embedded quotes doubled, numbers are bare,
    /// blobs use `X'..'` hex. A value whose storage class does not fit the
    /// column type is a configuration error, never coerced.
    pub fn literal(&self, value: &Value) -> Result<String> {
        if !self.sql_type.accepts(value) {
            return Err(Error::DefaultType {
                column: self.name.clone(),
                sql_type: self.sql_type.sql(),
                value: format!("{} ({})", value, value.kind()),
            });
        }

        Ok(match value {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => format!("{:?}", r),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{:02X}", byte)).collect();
                format!("X'{}'", hex)
            }
        })
    }

    /// Column clause for CREATE TABLE:
    /// `name type [PRIMARY KEY [AUTOINCREMENT]] [DEFAULT <literal>] [UNIQUE] [NOT NULL]`
    pub fn clause(&self) -> Result<String> {
        let mut parts = vec![self.name.clone(), self.sql_type.sql()];

        if self.primary_key {
            parts.push("PRIMARY KEY".to_string());
            if self.auto_increment {
                parts.push("AUTOINCREMENT".to_string());
            }
        }

        if !self.default.is_null() {
            parts.push(format!("DEFAULT {}", self.literal(&self.default)?));
        }

        if self.unique {
            parts.push("UNIQUE".to_string());
        }

        if self.not_null {
            parts.push("NOT NULL".to_string());
        }

        Ok(parts.join(" "))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

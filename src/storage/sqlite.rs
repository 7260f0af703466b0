//! SQLite storage implementation

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rusqlite::{params_from_iter, ErrorCode, Row};

use super::connection::{settle, ConnMode, ConnectionManager, DbPath};
use crate::condition::Condition;
use crate::record::{Model, Record};
use crate::records::Records;
use crate::schema::{Column, Reference, SqlType, TableRef, TableSchema};
use crate::value::Value;
use crate::{Error, Result};

/// SQLite-backed store for declared tables.
///
/// Generated statements bind every field value. A caller-supplied
/// [`Condition::Raw`] is concatenated into the statement text unescaped;
/// the caller is responsible for its safety.
pub struct SqliteStore {
    connections: ConnectionManager,
    registry: RefCell<HashMap<String, Arc<TableSchema>>>,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        Self::new(DbPath::File(path.to_path_buf()))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::new(DbPath::Memory)
    }

    pub fn new(path: DbPath) -> Result<Self> {
        Ok(Self {
            connections: ConnectionManager::open(path)?,
            registry: RefCell::new(HashMap::new()),
        })
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    // ========== Schema Registry ==========

    /// Make a schema known by name, for reference resolution
    pub fn register(&self, schema: &Arc<TableSchema>) {
        self.registry
            .borrow_mut()
            .insert(schema.name().to_string(), Arc::clone(schema));
    }

    pub fn schema(&self, name: &str) -> Option<Arc<TableSchema>> {
        self.registry.borrow().get(name).cloned()
    }

    /// Build a schema from the live table layout, `None` when the table
    /// does not exist. Defaults are not read back.
    pub fn introspect(&self, table: &str) -> Result<Option<Arc<TableSchema>>> {
        let columns = self.connections.run(ConnMode::Query, |conn| {
            let mut stmt = conn.prepare(
                "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
            )?;
            let columns = stmt
                .query_map([table], |row| {
                    let mut column = Column::new(
                        row.get::<_, String>(0)?,
                        SqlType::from_declared(&row.get::<_, String>(1)?),
                    );
                    if row.get::<_, i64>(2)? != 0 {
                        column = column.not_null();
                    }
                    if row.get::<_, i64>(3)? != 0 {
                        column = column.primary_key();
                    }
                    Ok(column)
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(columns)
        })?;

        if columns.is_empty() {
            return Ok(None);
        }
        tracing::debug!(table = %table, columns = columns.len(), "Introspected table layout");
        Ok(Some(TableSchema::builder(table).columns(columns).build()))
    }

    // ========== Table Operations ==========

    /// Create the table (if absent) and register its schema
    pub fn create_table(&self, schema: &Arc<TableSchema>) -> Result<String> {
        let sql = schema.create_table_sql()?;
        self.execute(&sql, &[])?;
        self.register(schema);
        Ok(sql)
    }

    /// Drop the table; succeeds when it does not exist
    pub fn drop_table(&self, schema: &Arc<TableSchema>) -> Result<String> {
        let sql = schema.drop_table_sql();
        self.execute(&sql, &[])?;
        self.register(schema);
        Ok(sql)
    }

    pub fn table_exists<'a>(&self, table: impl Into<TableRef<'a>>) -> Result<bool> {
        let name = table.into().name();
        let count: i64 = self.connections.run(ConnMode::Query, |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
        })?;
        Ok(count > 0)
    }

    // ========== Record Operations ==========

    /// Insert every field of `record`, in declaration order
    pub fn insert(&self, record: &Record) -> Result<String> {
        let schema = record.schema();
        let columns: Vec<&str> = schema.column_names().collect();
        let sql = format!(
            "INSERT INTO {}({}) VALUES ({});",
            schema.name(),
            columns.join(", "),
            placeholders(columns.len())
        );
        self.execute(&sql, record.values())?;
        Ok(sql)
    }

    /// Write every field of `record` to the rows matching `condition`,
    /// `id = <record id>` when none is given.
    pub fn update(&self, record: &Record, condition: Option<Condition>) -> Result<String> {
        let schema = record.schema();
        let condition = Self::condition_for(record, condition)?;
        let (where_sql, where_values) = condition.to_sql();

        let assignments: Vec<String> = schema.column_names().map(|c| format!("{}=?", c)).collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {};",
            schema.name(),
            assignments.join(", "),
            where_sql
        );

        let mut values = record.values().to_vec();
        values.extend(where_values);
        self.execute(&sql, &values)?;
        Ok(sql)
    }

    /// Delete the rows matching `condition`, `id = <record id>` when none is given
    pub fn delete(&self, record: &Record, condition: Option<Condition>) -> Result<String> {
        let condition = Self::condition_for(record, condition)?;
        let (where_sql, where_values) = condition.to_sql();
        let sql = format!("DELETE FROM {} WHERE {};", record.table_name(), where_sql);
        self.execute(&sql, &where_values)?;
        Ok(sql)
    }

    /// First row matching `condition`, or `None` when nothing matches
    pub fn select_one(
        &self,
        schema: &Arc<TableSchema>,
        condition: impl Into<Condition>,
    ) -> Result<Option<Record>> {
        let (where_sql, values) = condition.into().to_sql();
        let sql = format!("SELECT * FROM {} WHERE {};", schema.name(), where_sql);
        log_statement(&sql, &values);
        let row = self.query_first(&sql, &values)?;
        Ok(row.map(|row| Record::from_row(schema, row)))
    }

    /// All rows matching `condition`. Each clause is omitted when its input
    /// is absent; a `limit` of 0 means no limit.
    pub fn select_many(
        &self,
        schema: &Arc<TableSchema>,
        condition: Option<Condition>,
        order_by: Option<&[&str]>,
        ascending: bool,
        limit: usize,
    ) -> Result<Records> {
        let mut sql = format!("SELECT * FROM {}", schema.name());
        let mut values = Vec::new();

        if let Some(condition) = condition {
            let (where_sql, where_values) = condition.to_sql();
            sql.push_str(&format!(" WHERE {}", where_sql));
            values = where_values;
        }
        if let Some(columns) = order_by.filter(|c| !c.is_empty()) {
            let direction = if ascending { "ASC" } else { "DESC" };
            sql.push_str(&format!(" ORDER BY {} {}", columns.join(", "), direction));
        }
        if limit > 0 {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql.push(';');
        log_statement(&sql, &values);

        let rows = self.query_all(&sql, &values)?;
        if rows.is_empty() {
            return Ok(Records::empty(schema));
        }
        let records = rows.into_iter().map(|row| Record::from_row(schema, row)).collect();
        Records::from_records(records)
    }

    /// `MAX(id_column) + 1`, or 0 for an empty table.
    ///
    /// Advisory only: nothing reserves the id, so two callers can compute
    /// the same value. A missing table or a non-integer maximum also yields
    /// 0; I/O-class engine failures propagate. A maximum of `i64::MAX` is
    /// `Error::IdExhausted`.
    pub fn next_id<'a>(&self, table: impl Into<TableRef<'a>>, id_column: &str) -> Result<i64> {
        let table = table.into().name();
        let sql = format!("SELECT MAX({}) FROM {};", id_column, table);
        log_statement(&sql, &[]);

        let max = self.connections.run(ConnMode::Query, |conn| {
            conn.query_row(&sql, [], |row| row.get::<_, Option<i64>>(0))
        });

        match max {
            Ok(Some(max)) => max
                .checked_add(1)
                .ok_or_else(|| Error::IdExhausted(table.to_string())),
            Ok(None) => Ok(0),
            Err(Error::Storage(e)) if is_sequencing_miss(&e) => {
                tracing::warn!(table = %table, error = %e, "next_id falling back to 0");
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    // ========== Raw Operations ==========

    /// First row of a trusted statement, as raw values
    pub fn fetch_one(&self, sql: &str) -> Result<Option<Vec<Value>>> {
        log_statement(sql, &[]);
        self.query_first(sql, &[])
    }

    /// All rows of a trusted statement, as raw values
    pub fn fetch_all(&self, sql: &str) -> Result<Vec<Vec<Value>>> {
        log_statement(sql, &[]);
        self.query_all(sql, &[])
    }

    /// Run several `;`-separated statements as one mutation
    pub fn execute_script(&self, statements: &str) -> Result<()> {
        tracing::info!(script = %statements, "Executing script");
        self.connections
            .run(ConnMode::Mutation, |conn| conn.execute_batch(statements))
    }

    // ========== Batch Operations ==========

    /// Run `f` inside one batch scope.
    ///
    /// Every statement `f` issues through the store shares one connection
    /// and one commit. The scope is released even when `f` fails; `f`'s
    /// error is returned in that case.
    pub fn batch<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let scope = self.connections.acquire(ConnMode::Batch)?;
        let outcome = f(self);
        settle(outcome, scope.release())
    }

    /// Submit a statement on the open batch connection
    pub fn sub_transaction(&self, sql: &str, values: &[Value]) -> Result<usize> {
        self.connections.sub_transaction(sql, values)
    }

    // ========== Reference Operations ==========

    /// The record in `target_table` that `record`'s foreign key points at.
    ///
    /// Returns `None` without querying when the referencing field is unset.
    pub fn resolve_reference(&self, record: &Record, target_table: &str) -> Result<Option<Record>> {
        let reference = record
            .schema()
            .reference(target_table)
            .ok_or_else(|| Error::UnknownReference {
                table: record.table_name().to_string(),
                target: target_table.to_string(),
            })?;
        self.resolve(record, reference)
    }

    /// Every record `record` points at, in foreign-key declaration order.
    /// Unset references are left out.
    pub fn resolve_all_references(&self, record: &Record) -> Result<Vec<Record>> {
        record
            .schema()
            .references()
            .iter()
            .filter_map(|reference| self.resolve(record, reference).transpose())
            .collect()
    }

    fn resolve(&self, record: &Record, reference: &Reference) -> Result<Option<Record>> {
        let value = &record.values()[reference.position];
        if value.is_null() {
            tracing::debug!(
                table = %record.table_name(),
                column = %reference.column,
                "Reference unset, nothing to resolve"
            );
            return Ok(None);
        }

        let target = self.target_schema(reference)?;
        self.select_one(
            &target,
            Condition::eq(reference.target_column.as_str(), value.clone()),
        )
    }

    /// Schema of a reference's target: the one declared on the column, then
    /// the registry, then the table layout in the database.
    fn target_schema(&self, reference: &Reference) -> Result<Arc<TableSchema>> {
        if let Some(target) = &reference.target {
            return Ok(Arc::clone(target));
        }
        if let Some(target) = self.schema(&reference.target_table) {
            return Ok(target);
        }

        let target = self
            .introspect(&reference.target_table)?
            .ok_or_else(|| Error::UnknownTable(reference.target_table.clone()))?;
        self.register(&target);
        Ok(target)
    }

    // ========== Model Operations ==========

    pub fn insert_model<M: Model>(&self, model: &M) -> Result<String> {
        self.insert(&model.to_record()?)
    }

    pub fn select_model<M: Model>(&self, condition: impl Into<Condition>) -> Result<Option<M>> {
        self.select_one(&M::schema(), condition)?
            .map(|record| M::from_record(&record))
            .transpose()
    }

    // ========== Helpers ==========

    fn condition_for(record: &Record, condition: Option<Condition>) -> Result<Condition> {
        match condition {
            Some(condition) => Ok(condition.into_bindable()),
            None => record.default_condition(),
        }
    }

    fn execute(&self, sql: &str, values: &[Value]) -> Result<usize> {
        log_statement(sql, values);
        self.connections
            .run(ConnMode::Mutation, |conn| conn.execute(sql, params_from_iter(values)))
    }

    fn query_first(&self, sql: &str, values: &[Value]) -> Result<Option<Vec<Value>>> {
        self.connections.run(ConnMode::Query, |conn| {
            let mut stmt = conn.prepare(sql)?;
            let count = stmt.column_count();
            let mut rows = stmt.query(params_from_iter(values))?;
            let first = rows.next()?.map(|row| row_values(row, count)).transpose()?;
            Ok(first)
        })
    }

    fn query_all(&self, sql: &str, values: &[Value]) -> Result<Vec<Vec<Value>>> {
        self.connections.run(ConnMode::Query, |conn| {
            let mut stmt = conn.prepare(sql)?;
            let count = stmt.column_count();
            let rows = stmt
                .query_map(params_from_iter(values), |row| row_values(row, count))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

fn log_statement(sql: &str, values: &[Value]) {
    tracing::info!(sql = %sql, values = ?values, "Executing statement");
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn row_values(row: &Row, count: usize) -> rusqlite::Result<Vec<Value>> {
    (0..count).map(|i| row.get(i)).collect()
}

/// Failures `next_id` reads as "no rows yet": statement-level errors such as
/// a missing table, and a maximum that is not an integer.
fn is_sequencing_miss(error: &rusqlite::Error) -> bool {
    match error {
        rusqlite::Error::SqliteFailure(e, _) => e.code == ErrorCode::Unknown,
        rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city() -> Arc<TableSchema> {
        TableSchema::builder("City")
            .column(Column::new("id", SqlType::Integer).primary_key())
            .column(Column::new("postalCode", SqlType::SmallInt).default(9999))
            .column(Column::new("cityName", SqlType::Varchar(Some(40))).default("New York"))
            .build()
    }

    fn person() -> Arc<TableSchema> {
        TableSchema::builder("Person")
            .column(Column::new("id", SqlType::Integer).primary_key())
            .column(Column::new("firstName", SqlType::Varchar(Some(40))))
            .column(Column::new("cityId", SqlType::Integer).references("City", "id"))
            .column(Column::new("birthCityId", SqlType::Integer).references("City", "id"))
            .build()
    }

    fn sample_city(schema: &Arc<TableSchema>, id: i64, postal: i64, name: &str) -> Record {
        Record::from_row(schema, vec![id.into(), postal.into(), name.into()])
    }

    #[test]
    fn test_create_and_drop() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = city();

        let sql = store.create_table(&schema).unwrap();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS City("));
        assert!(store.table_exists(&schema).unwrap());

        assert_eq!(store.drop_table(&schema).unwrap(), "DROP TABLE IF EXISTS City;");
        assert!(!store.table_exists("City").unwrap());
        // Idempotent
        store.drop_table(&schema).unwrap();
    }

    #[test]
    fn test_record_crud() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = city();
        store.create_table(&schema).unwrap();

        let mut odder = sample_city(&schema, 0, 8300, "Odder");
        let sql = store.insert(&odder).unwrap();
        assert_eq!(sql, "INSERT INTO City(id, postalCode, cityName) VALUES (?, ?, ?);");

        let found = store.select_one(&schema, "id=0").unwrap().unwrap();
        assert_eq!(found, odder);

        odder.set("cityName", "Boston").unwrap();
        let sql = store.update(&odder, None).unwrap();
        assert_eq!(sql, "UPDATE City SET id=?, postalCode=?, cityName=? WHERE id = ?;");
        let found = store.select_one(&schema, Condition::eq("id", 0)).unwrap().unwrap();
        assert_eq!(found.get_as::<String>("cityName").unwrap(), "Boston");

        let sql = store.delete(&odder, None).unwrap();
        assert_eq!(sql, "DELETE FROM City WHERE id = ?;");
        assert!(store.select_one(&schema, "id=0").unwrap().is_none());
    }

    #[test]
    fn test_update_with_raw_condition() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = city();
        store.create_table(&schema).unwrap();
        store.insert(&sample_city(&schema, 1, 8000, "Aarhus")).unwrap();

        let renamed = sample_city(&schema, 1, 8000, "Aarhus C");
        let sql = store
            .update(&renamed, Some(Condition::raw("cityName = 'Aarhus'")))
            .unwrap();
        assert!(sql.ends_with("WHERE cityName = ?;"));
        assert!(store.select_one(&schema, "cityName = 'Aarhus C'").unwrap().is_some());
    }

    #[test]
    fn test_select_many_clauses() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = city();
        store.create_table(&schema).unwrap();
        for (id, postal, name) in [(0, 8300, "Odder"), (1, 8000, "Aarhus"), (2, 8660, "Skanderborg")] {
            store.insert(&sample_city(&schema, id, postal, name)).unwrap();
        }

        let all = store.select_many(&schema, None, None, true, 0).unwrap();
        assert_eq!(all.len(), 3);

        let ordered = store
            .select_many(&schema, None, Some(&["postalCode"]), false, 2)
            .unwrap();
        let names: Vec<String> = ordered.iter().map(|r| r.get_as("cityName").unwrap()).collect();
        assert_eq!(names, vec!["Skanderborg", "Odder"]);

        let none = store
            .select_many(&schema, Some(Condition::raw("id > 10")), None, true, 0)
            .unwrap();
        assert!(none.is_empty());
        assert_eq!(none.schema().name(), "City");
    }

    #[test]
    fn test_next_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = city();
        assert_eq!(store.next_id("City", "id").unwrap(), 0);

        store.create_table(&schema).unwrap();
        assert_eq!(store.next_id(&schema, "id").unwrap(), 0);
        store.insert(&sample_city(&schema, 0, 8300, "Odder")).unwrap();
        assert_eq!(store.next_id(&schema, "id").unwrap(), 1);
        assert_eq!(store.next_id(&schema, "cityName").unwrap(), 0);
    }

    #[test]
    fn test_next_id_at_integer_ceiling() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = city();
        store.create_table(&schema).unwrap();
        store.insert(&sample_city(&schema, i64::MAX - 1, 8300, "Odder")).unwrap();
        assert_eq!(store.next_id(&schema, "id").unwrap(), i64::MAX);

        store.insert(&sample_city(&schema, i64::MAX, 8000, "Aarhus")).unwrap();
        assert!(matches!(
            store.next_id(&schema, "id"),
            Err(Error::IdExhausted(table)) if table == "City"
        ));
    }

    #[test]
    fn test_batch_shares_one_scope() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = city();
        store.create_table(&schema).unwrap();

        let start = store.next_id(&schema, "id").unwrap();
        store
            .batch(|store| {
                for i in 0..50 {
                    let mut record = Record::new(&schema);
                    record.set("id", start + i)?;
                    store.insert(&record)?;
                }
                store.sub_transaction(
                    "UPDATE City SET cityName = ? WHERE id = ?",
                    &[Value::from("Hou"), Value::Integer(0)],
                )?;
                Ok(())
            })
            .unwrap();

        let records = store.select_many(&schema, None, Some(&["id"]), true, 0).unwrap();
        assert_eq!(records.len(), 50);
        assert_eq!(records[49].get_as::<i64>("id").unwrap(), start + 49);
        assert_eq!(records[0].get_as::<String>("cityName").unwrap(), "Hou");
        assert!(!store.connections().is_active());
    }

    #[test]
    fn test_batch_error_still_releases() {
        let store = SqliteStore::open_in_memory().unwrap();
        let schema = city();
        store.create_table(&schema).unwrap();

        let result: Result<()> = store.batch(|store| {
            store.insert(&sample_city(&schema, 0, 8300, "Odder"))?;
            store.insert(&sample_city(&schema, 0, 8300, "Odder"))?;
            Ok(())
        });
        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(!store.connections().is_active());
        assert!(matches!(
            store.batch(|store| store.batch(|_| Ok(()))),
            Err(Error::ScopeActive(ConnMode::Batch))
        ));
    }

    #[test]
    fn test_reference_resolution() {
        let store = SqliteStore::open_in_memory().unwrap();
        let (city, person) = (city(), person());
        store.create_table(&city).unwrap();
        store.create_table(&person).unwrap();
        store.insert(&sample_city(&city, 3, 8660, "Skanderborg")).unwrap();
        store.insert(&sample_city(&city, 4, 8000, "Aarhus")).unwrap();

        let mut niels = Record::new(&person);
        niels.set("id", 0).unwrap();
        niels.set("firstName", "Niels").unwrap();
        store.insert(&niels).unwrap();
        assert!(store.resolve_reference(&niels, "City").unwrap().is_none());
        assert!(store.resolve_all_references(&niels).unwrap().is_empty());

        niels.set("cityId", 3).unwrap();
        niels.set("birthCityId", 4).unwrap();
        let home = store.resolve_reference(&niels, "City").unwrap().unwrap();
        assert_eq!(home.get("id"), niels.get("cityId"));

        let all = store.resolve_all_references(&niels).unwrap();
        let names: Vec<String> = all.iter().map(|r| r.get_as("cityName").unwrap()).collect();
        assert_eq!(names, vec!["Skanderborg", "Aarhus"]);

        assert!(matches!(
            store.resolve_reference(&niels, "Country"),
            Err(Error::UnknownReference { .. })
        ));
    }

    #[test]
    fn test_declared_target_needs_no_registry() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .execute_script(
                "CREATE TABLE City(id INTEGER PRIMARY KEY, postalCode SMALLINT, cityName VARCHAR(40)); \
                 INSERT INTO City VALUES (2, 8000, 'Aarhus');",
            )
            .unwrap();
        assert!(store.schema("City").is_none());

        let city = city();
        let person = TableSchema::builder("Person")
            .column(Column::new("id", SqlType::Integer).primary_key())
            .column(Column::new("cityId", SqlType::Integer).references_schema(&city, "id"))
            .build();
        let mut ane = Record::new(&person);
        ane.set("cityId", 2).unwrap();

        let home = store.resolve_reference(&ane, "City").unwrap().unwrap();
        assert_eq!(home, sample_city(&city, 2, 8000, "Aarhus"));
        assert!(store.schema("City").is_none());
    }

    #[test]
    fn test_unregistered_target_is_introspected() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .execute_script(
                "CREATE TABLE City(id INTEGER PRIMARY KEY, postalCode SMALLINT, cityName VARCHAR(40)); \
                 INSERT INTO City VALUES (3, 8660, 'Skanderborg');",
            )
            .unwrap();

        let mut niels = Record::new(&person());
        niels.set("cityId", 3).unwrap();
        let home = store.resolve_reference(&niels, "City").unwrap().unwrap();
        assert_eq!(home.get_as::<String>("cityName").unwrap(), "Skanderborg");

        let learned = store.schema("City").unwrap();
        assert_eq!(learned.column_names().collect::<Vec<_>>(), vec!["id", "postalCode", "cityName"]);
        assert_eq!(learned.primary_key().unwrap().name, "id");
        assert_eq!(learned.column("cityName").unwrap().sql_type, SqlType::Varchar(Some(40)));
    }

    #[test]
    fn test_missing_target_table() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut niels = Record::new(&person());
        niels.set("cityId", 3).unwrap();
        assert!(store.introspect("City").unwrap().is_none());
        assert!(matches!(
            store.resolve_reference(&niels, "City"),
            Err(Error::UnknownTable(name)) if name == "City"
        ));
    }

    #[test]
    fn test_fetch_and_script() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .execute_script("CREATE TABLE Tag(id INTEGER, label TEXT); INSERT INTO Tag VALUES (1, 'a'); INSERT INTO Tag VALUES (2, NULL);")
            .unwrap();

        let rows = store.fetch_all("SELECT * FROM Tag ORDER BY id").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec![Value::Integer(2), Value::Null]);
        assert_eq!(
            store.fetch_one("SELECT label FROM Tag WHERE id = 1").unwrap(),
            Some(vec![Value::from("a")])
        );
        assert_eq!(store.fetch_one("SELECT * FROM Tag WHERE id = 9").unwrap(), None);
    }
}

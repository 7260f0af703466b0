//! Sample tables used by the demo commands

use std::sync::{Arc, OnceLock};

use mrdb::{Column, Model, Record, SqlType, TableSchema};

static CITY: OnceLock<Arc<TableSchema>> = OnceLock::new();
static PERSON: OnceLock<Arc<TableSchema>> = OnceLock::new();
static IMAGE: OnceLock<Arc<TableSchema>> = OnceLock::new();
static BROKEN: OnceLock<Arc<TableSchema>> = OnceLock::new();

pub fn city_schema() -> Arc<TableSchema> {
    CITY
        .get_or_init(|| {
            TableSchema::builder("City")
                .column(Column::new("id", SqlType::Integer).primary_key())
                .column(
                    Column::new("postalCode", SqlType::SmallInt)
                        .default(9999)
                        .display_name("Postal Code"),
                )
                .column(
                    Column::new("cityName", SqlType::Varchar(Some(40)))
                        .default("New York")
                        .display_name("City Name"),
                )
                .build()
        })
        .clone()
}

pub fn person_schema() -> Arc<TableSchema> {
    PERSON
        .get_or_init(|| {
            TableSchema::builder("Person")
                .column(Column::new("id", SqlType::Integer).primary_key())
                .column(Column::new("firstName", SqlType::Varchar(Some(40))))
                .column(Column::new("lastName", SqlType::Varchar(Some(40))))
                .column(
                    Column::new("cityId", SqlType::Integer)
                        .references_schema(&city_schema(), "id")
                        .default(0),
                )
                .build()
        })
        .clone()
}

pub fn image_schema() -> Arc<TableSchema> {
    IMAGE
        .get_or_init(|| {
            TableSchema::builder("Image")
                .column(Column::new("id", SqlType::Integer).primary_key())
                .column(Column::new("md5", SqlType::Char(32)))
                .column(Column::new("imageName", SqlType::Varchar(Some(40))))
                .column(Column::new("imageData", SqlType::Blob))
                .build()
        })
        .clone()
}

/// A declaration with deliberate mistakes, for the validation walkthrough
pub fn broken_schema() -> Arc<TableSchema> {
    BROKEN
        .get_or_init(|| {
            TableSchema::builder("BrokenTable")
                .column(Column::new("id", SqlType::Integer).primary_key())
                .column(Column::new("postalCode", SqlType::SmallInt).default("8000 Aarhus"))
                .column(
                    Column::new("cityName", SqlType::Varchar(Some(40)))
                        .not_null()
                        .default("New York"),
                )
                .column(Column::new("cityId", SqlType::Integer).default(0))
                .build()
        })
        .clone()
}

pub fn all_schemas() -> Vec<Arc<TableSchema>> {
    vec![city_schema(), person_schema(), image_schema()]
}

pub fn schema_by_name(name: &str) -> Option<Arc<TableSchema>> {
    all_schemas().into_iter().find(|s| s.name().eq_ignore_ascii_case(name))
}

/// Typed view of a `City` row
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub id: Option<i64>,
    pub postal_code: i64,
    pub city_name: String,
}

impl Model for City {
    fn schema() -> Arc<TableSchema> {
        city_schema()
    }

    fn field_names() -> &'static [&'static str] {
        &["id", "postalCode", "cityName"]
    }

    fn to_record(&self) -> mrdb::Result<Record> {
        let mut record = Record::new(&Self::schema());
        record.set("id", self.id)?;
        record.set("postalCode", self.postal_code)?;
        record.set("cityName", self.city_name.as_str())?;
        Ok(record)
    }

    fn from_record(record: &Record) -> mrdb::Result<Self> {
        Ok(Self {
            id: record.get_as("id")?,
            postal_code: record.get_as("postalCode")?,
            city_name: record.get_as("cityName")?,
        })
    }
}

/// Typed view of `BrokenTable`; its fields do not line up with the columns
#[derive(Debug)]
pub struct BrokenTable {
    pub id: Option<i64>,
    pub postal_code: i64,
    pub city_name: String,
    pub counter: i64,
}

impl Model for BrokenTable {
    fn schema() -> Arc<TableSchema> {
        broken_schema()
    }

    fn field_names() -> &'static [&'static str] {
        &["id", "postalCode", "cityName", "counter"]
    }

    fn to_record(&self) -> mrdb::Result<Record> {
        let mut record = Record::new(&Self::schema());
        record.set("id", self.id)?;
        record.set("postalCode", self.postal_code)?;
        record.set("cityName", self.city_name.as_str())?;
        Ok(record)
    }

    fn from_record(record: &Record) -> mrdb::Result<Self> {
        Ok(Self {
            id: record.get_as("id")?,
            postal_code: record.get_as("postalCode")?,
            city_name: record.get_as("cityName")?,
            counter: 10,
        })
    }
}

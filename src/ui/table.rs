use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::records::Records;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Render a collection with display-name headers, one row per record
pub fn records_table(records: &Records) -> String {
    let mut builder = Builder::default();
    builder.push_record(records.schema().display_names());
    for record in records {
        builder.push_record(record.values().iter().map(|v| v.to_string()));
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::schema::{Column, SqlType, TableSchema};

    #[test]
    fn test_records_table_lists_headers_and_rows() {
        let schema = TableSchema::builder("City")
            .column(Column::new("id", SqlType::Integer).primary_key())
            .column(Column::new("cityName", SqlType::Varchar(Some(40))).display_name("City Name"))
            .build();
        let records = Records::from_records(vec![Record::from_row(
            &schema,
            vec![7.into(), "Hou".into()],
        )])
        .unwrap();

        let rendered = records_table(&records);
        assert!(rendered.contains("City Name"));
        assert!(rendered.contains("Hou"));
    }

    #[test]
    fn test_empty_stats_table() {
        assert!(stats_table(&[]).is_empty());
        assert!(stats_table(&[("Tables", "2")]).contains("Tables"));
    }
}

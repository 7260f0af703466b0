use std::path::Path;
use std::time::Instant;

use mrdb::config::{self, MrdbConfig};
use mrdb::schema::validate_model;
use mrdb::ui::{self, Icons};
use mrdb::{Condition, DbPath, GridModel, Order, Query, Record, SqliteStore};

use crate::samples::{self, BrokenTable, City};

pub fn run_demo(db: DbPath, clones: usize) -> anyhow::Result<()> {
    ui::header(&format!("mrdb walkthrough on {}", db));
    if let DbPath::File(path) = &db {
        config::ensure_db_dir(path)?;
    }
    let store = SqliteStore::new(db)?;
    let (city, person) = (samples::city_schema(), samples::person_schema());

    ui::section("Validating BrokenTable");
    print_validation("BrokenTable", validate_model::<BrokenTable>());

    ui::section("Dropping Tables");
    for schema in [&city, &person] {
        ui::sql(&store.drop_table(schema)?);
    }

    ui::section("Creating Tables");
    for schema in [&city, &person] {
        ui::sql(&store.create_table(schema)?);
    }

    ui::section("Creation and Insertion of Records");
    let mut odder = Record::new(&city);
    odder.set("id", store.next_id(&city, "id")?)?;
    odder.set("postalCode", 8300)?;
    odder.set("cityName", "Odder")?;
    ui::sql(&store.insert(&odder)?);
    ui::record(Icons::NEW, &odder.to_string());

    let mut albert = Record::new(&person);
    albert.set("id", store.next_id(&person, "id")?)?;
    albert.set("firstName", "Albert")?;
    albert.set("lastName", "Einstein")?;
    albert.set("cityId", odder.get("id").cloned().unwrap_or_default())?;
    ui::sql(&store.insert(&albert)?);
    ui::record(Icons::NEW, &albert.to_string());

    let mut skanderborg = Record::new(&city);
    skanderborg.set("id", store.next_id(&city, "id")?)?;
    skanderborg.set("postalCode", 8660)?;
    skanderborg.set("cityName", "Skanderborg")?;
    store.insert(&skanderborg)?;

    let mut niels = Record::new(&person);
    niels.set("id", store.next_id(&person, "id")?)?;
    niels.set("firstName", "Niels")?;
    niels.set("lastName", "Bohr")?;
    niels.set("cityId", skanderborg.get("id").cloned().unwrap_or_default())?;
    store.insert(&niels)?;

    ui::section("Updating a Record");
    skanderborg.set("cityName", "Boston")?;
    ui::sql(&store.update(&skanderborg, None)?);
    ui::record(Icons::MOD, &skanderborg.to_string());

    ui::section("Copying through Portable Text");
    let text = skanderborg.to_portable_text()?;
    ui::info("Portable text", &text);
    let mut copy = Record::new(&city);
    copy.from_portable_text(&text)?;
    copy.set("id", store.next_id(&city, "id")?)?;
    copy.set("cityName", "Frederiksberg")?;
    store.insert(&copy)?;

    let Some(mut frederiksberg) = store.select_one(&city, "cityName = 'Frederiksberg'")? else {
        anyhow::bail!("inserted city was not found");
    };
    ui::info("City Name", &frederiksberg.get_as::<String>("cityName")?);

    ui::section("All Cities");
    let cities = store.select_many(&city, None, Some(&["id"]), true, 0)?;
    println!("{}", ui::records_table(&cities));

    if let Some(typed) = store.select_model::<City>(Condition::eq("id", 0))? {
        ui::info("Typed row", &format!("{:?}", typed));
    }

    ui::section("Deleting a Record");
    ui::sql(&store.delete(&frederiksberg, None)?);
    ui::record(Icons::DEL, &frederiksberg.to_string());

    ui::section("Default Values of City");
    frederiksberg.reset_to_default();
    ui::record(Icons::RECORD, &frederiksberg.to_string());

    ui::section("Referenced City of Albert");
    match store.resolve_reference(&albert, "City")? {
        Some(home) => ui::record(Icons::LINK, &home.to_string()),
        None => ui::warn("No referenced city"),
    }
    for linked in store.resolve_all_references(&niels)? {
        ui::record(Icons::LINK, &linked.to_string());
    }

    ui::section(&format!("Inserting {} clones of Albert", clones));
    let start = store.next_id(&person, "id")?;
    let first_name = albert.get_as::<String>("firstName")?;
    let timer = Instant::now();
    store.batch(|store| {
        for id in start..start + clones as i64 {
            let mut clone = albert.clone();
            clone.set("id", id)?;
            clone.set("firstName", format!("{}_{}", first_name, id))?;
            store.insert(&clone)?;
        }
        Ok(())
    })?;
    ui::timing(&format!("{:.2?}", timer.elapsed()));

    let few = store.select_many(&person, Some(Condition::raw("id < 10")), None, true, 0)?;
    println!("{}", ui::records_table(&few));

    ui::section("Joined Read");
    let join = Query::select(["Person.firstName", "Person.lastName", "City.cityName"])
        .from(&person)
        .inner_join(&person, "cityId", &city, "id")
        .where_()
        .like("Person.lastName", "B%")
        .order_by([Order::asc("Person.id")])
        .build();
    ui::sql(&join);
    for row in store.fetch_all(&join)? {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("  {}", cells.join(" | "));
    }

    println!();
    ui::success("All steps complete");
    Ok(())
}

pub fn run_show(db: DbPath, table: &str, limit: usize) -> anyhow::Result<()> {
    let Some(schema) = samples::schema_by_name(table) else {
        anyhow::bail!("unknown table '{}' (expected one of City, Person, Image)", table);
    };

    let store = SqliteStore::new(db)?;
    if !store.table_exists(&schema)? {
        ui::warn(&format!("Table {} does not exist yet; run `mrdb demo` first", schema.name()));
        return Ok(());
    }

    let grid = GridModel::load(&store, &schema)?;
    let rows = grid.row_count().to_string();
    let columns = grid.column_count().to_string();
    let next = store.next_id(&schema, "id")?.to_string();
    println!(
        "{}",
        ui::stats_table(&[
            ("Table", schema.name()),
            ("Rows", rows.as_str()),
            ("Columns", columns.as_str()),
            ("Next id", next.as_str()),
        ])
    );

    let mut shown = grid.records().clone();
    while limit > 0 && shown.len() > limit {
        shown.pop();
    }
    println!("{}", ui::records_table(&shown));
    if shown.len() < grid.row_count() {
        println!("{}", ui::muted(&format!("... {} more rows", grid.row_count() - shown.len())));
    }
    Ok(())
}

pub fn run_validate() -> anyhow::Result<()> {
    let mut failures = 0;
    for schema in samples::all_schemas().iter().chain([&samples::broken_schema()]) {
        let (ok, messages) = schema.table_schema_validation();
        if !ok {
            failures += 1;
        }
        print_validation(schema.name(), (ok, messages));
    }

    let (ok, messages) = validate_model::<City>();
    print_validation("City model", (ok, messages));
    let (ok, messages) = validate_model::<BrokenTable>();
    if !ok {
        failures += 1;
    }
    print_validation("BrokenTable model", (ok, messages));

    ui::info("Schemas with findings", &failures.to_string());
    Ok(())
}

pub fn run_init(path: &Path, database: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let db_path = database
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config::default_database_path_in(base));
    config::ensure_db_dir(&db_path)?;

    let config = MrdbConfig {
        database: Some(db_path.to_string_lossy().to_string()),
        ..MrdbConfig::default()
    };
    config::write_config(path, &config, force)?;

    ui::success(&format!("Wrote {}", path.display()));
    ui::status(Icons::DATABASE, "Database", &db_path.display().to_string());
    Ok(())
}

fn print_validation(name: &str, (ok, messages): (bool, Vec<String>)) {
    if ok {
        ui::success(&format!("{} is valid", name));
        return;
    }
    ui::warn(&format!("Errors found in {}", name));
    for message in messages {
        println!("  {}", ui::dim(&message));
    }
}

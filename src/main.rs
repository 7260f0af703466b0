//! mrdb CLI - Walk through declarative tables over SQLite

mod commands;
mod samples;

use clap::{Parser, Subcommand};
use mrdb::config::{self, MrdbConfig};
use mrdb::logging::{self, LogLevel};
use mrdb::DbPath;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mrdb")]
#[command(version)]
#[command(about = "Declarative tables, records and transactions over SQLite")]
#[command(long_about = r#"
mrdb maps declared table schemas onto an embedded SQLite database:
  • Generated CREATE/DROP/INSERT/UPDATE/DELETE/SELECT statements
  • Foreign-key reference resolution
  • Query, mutation and batch transaction scopes

Example usage:
  mrdb init
  mrdb demo --database demo.db
  mrdb show --table City
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (overridden by --verbose)
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true, default_value = "mrdb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full walkthrough: validate, create, insert, update, select, delete, batch
    Demo {
        /// Path to the database file, or ":memory:"
        #[arg(short, long)]
        database: Option<String>,

        /// Number of rows inserted in the batch step
        #[arg(long, default_value = "10000")]
        clones: usize,
    },

    /// Print the rows of a sample table
    Show {
        /// Table name (City, Person or Image)
        #[arg(short, long)]
        table: String,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<String>,

        /// Maximum number of rows to print (0 for all)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Validate the sample schemas and models
    Validate,

    /// Write a config file
    Init {
        /// Database path to record in the config
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn resolve_db(flag: Option<String>, config: Option<&MrdbConfig>) -> DbPath {
    flag.as_deref()
        .map(config::parse_db_path)
        .or_else(|| config.and_then(MrdbConfig::db_path))
        .unwrap_or_else(|| DbPath::File(PathBuf::from("mrdb.db")))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let file_config = config::load_config(Some(&cli.config))?;

    // Initialize logging
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        cli.log_level
            .or_else(|| file_config.as_ref().and_then(|c| c.log_level))
            .unwrap_or_default()
    };
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.log_file.as_ref().map(PathBuf::from)));
    logging::init(level, log_file.as_deref())?;

    match cli.command {
        Commands::Demo { database, clones } => {
            let db = resolve_db(database, file_config.as_ref());
            tracing::info!("Running walkthrough against {}", db);
            commands::run_demo(db, clones)?;
        }
        Commands::Show {
            table,
            database,
            limit,
        } => {
            let db = resolve_db(database, file_config.as_ref());
            commands::run_show(db, &table, limit)?;
        }
        Commands::Validate => {
            commands::run_validate()?;
        }
        Commands::Init { database, force } => {
            commands::run_init(&cli.config, database.as_deref(), force)?;
        }
    }

    Ok(())
}

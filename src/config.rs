use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::logging::LogLevel;
use crate::storage::DbPath;

/// Name of the in-memory database in a config file
pub const MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MrdbConfig {
    pub database: Option<String>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<String>,
}

impl MrdbConfig {
    /// The configured database, `None` when unset
    pub fn db_path(&self) -> Option<DbPath> {
        self.database.as_deref().map(parse_db_path)
    }
}

pub fn parse_db_path(text: &str) -> DbPath {
    if text == MEMORY_DATABASE {
        DbPath::Memory
    } else {
        DbPath::File(PathBuf::from(text))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("mrdb.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".mrdb").join("mrdb.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<MrdbConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: MrdbConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &MrdbConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

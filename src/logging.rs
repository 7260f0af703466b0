//! Logging setup
//!
//! The library only emits `tracing` events. Binaries call [`init`] once to
//! route them to stderr or to a log file.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as layer_fmt, prelude::*, EnvFilter};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// `EnvFilter` directive for this level. `tracing` has no level above
    /// error, so critical maps onto it.
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        };
        write!(f, "{}", name)
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `level` when set.
///
/// A log file is truncated on open. Returns `false` when a subscriber was
/// already installed.
pub fn init(level: LogLevel, log_file: Option<&Path>) -> Result<bool> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            registry
                .with(layer_fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
        }
        None => registry
            .with(layer_fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    Ok(installed.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::Warning.directive(), "warn");
        assert_eq!(LogLevel::Critical.directive(), "error");
        assert_eq!(LogLevel::Critical.to_string(), "critical");
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_second_init_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mrdb.log");
        let first = init(LogLevel::Debug, Some(&path)).unwrap();
        assert!(path.exists());
        if first {
            assert!(!init(LogLevel::Info, None).unwrap());
        }
    }
}

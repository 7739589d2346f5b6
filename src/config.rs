//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::backends::DEFAULT_TABLE;
use crate::debounce::DebounceRules;
use crate::error::{Result, StoreError};

/// Physical backend the server stores records in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(StoreError::Config(format!("unknown backend '{}'", other))),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend holding the records
    pub backend: BackendKind,
    /// SQLite database file, used by the sqlite backend
    pub sqlite_path: String,
    /// SQLite table name
    pub table: String,
    /// Debounce rules as a JSON object of matcher to delay in milliseconds
    pub debounce: Option<String>,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SHOEBOX_BACKEND` - `memory` or `sqlite` (default: memory)
    /// - `SHOEBOX_SQLITE_PATH` - SQLite file (default: shoebox.db)
    /// - `SHOEBOX_TABLE` - SQLite table (default: shoebox)
    /// - `SHOEBOX_DEBOUNCE` - e.g. `{"counter": 500, "/^session:/i": 250}` (default: none)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env::var("SHOEBOX_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.backend),
            sqlite_path: env::var("SHOEBOX_SQLITE_PATH").unwrap_or(defaults.sqlite_path),
            table: env::var("SHOEBOX_TABLE").unwrap_or(defaults.table),
            debounce: env::var("SHOEBOX_DEBOUNCE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Parses the configured debounce rules.
    pub fn debounce_rules(&self) -> Result<DebounceRules> {
        match &self.debounce {
            Some(text) => DebounceRules::from_json(text),
            None => Ok(DebounceRules::new()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            sqlite_path: "shoebox.db".to_string(),
            table: DEFAULT_TABLE.to_string(),
            debounce: None,
            server_port: 3000,
        }
    }
}

//! Database configuration
//!
//! Loaded from a JSON file:
//!
//! ```json
//! {
//!   "path": "./contacts.flatdb.json",
//!   "create_if_missing": true,
//!   "pretty": true,
//!   "table_uniqueness": "by_name",
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `path` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{DbError, DbResult};
use crate::observability::{log_event_with_fields, Event, Severity};

/// How table creation decides that a table already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Uniqueness {
    /// Names are unique; several tables may share a type
    #[default]
    ByName,
    /// Names are unique and each type may back at most one table
    ByType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Location of the document file (required)
    pub path: PathBuf,

    /// Write an empty document when none exists (default: false)
    #[serde(default)]
    pub create_if_missing: bool,

    /// Pretty-print the document (default: true)
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// Table uniqueness policy (default: by_name)
    #[serde(default)]
    pub table_uniqueness: Uniqueness,

    /// Minimum log severity (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_pretty() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DatabaseConfig {
    /// Config with defaults for the given document path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_if_missing: false,
            pretty: default_pretty(),
            table_uniqueness: Uniqueness::default(),
            log_level: default_log_level(),
        }
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> DbResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DbError::io(format!("Failed to read config: {}", path.display()), e)
        })?;

        let config: DatabaseConfig = serde_json::from_str(&content)
            .map_err(|e| DbError::validation(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let location = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("config", location.as_str())]);

        Ok(config)
    }

    pub fn validate(&self) -> DbResult<()> {
        if self.path.as_os_str().is_empty() || self.path.to_string_lossy().trim().is_empty() {
            return Err(DbError::validation("Config 'path' must not be blank"));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> DbResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(|e| DbError::validation(format!("Invalid log_level: {}", e)))
    }
}

//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::fmt;
use std::io;

use crate::errors::{DbError, DbErrorCode};

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout or document file)
    IoError,
    /// Document already exists
    AlreadyInitialized,
    /// Document does not exist
    NotInitialized,
    /// Document exists but cannot be decoded
    DocumentInvalid,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "FLATDB_CLI_CONFIG_ERROR",
            Self::IoError => "FLATDB_CLI_IO_ERROR",
            Self::AlreadyInitialized => "FLATDB_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "FLATDB_CLI_NOT_INITIALIZED",
            Self::DocumentInvalid => "FLATDB_CLI_DOCUMENT_INVALID",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized(location: &str) -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            format!("Document '{}' already exists", location),
        )
    }

    pub fn not_initialized(location: &str) -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            format!("Document '{}' not found. Run 'flatdb init' first.", location),
        )
    }

    pub fn document_invalid(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::DocumentInvalid, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<DbError> for CliError {
    fn from(e: DbError) -> Self {
        match e.code() {
            DbErrorCode::Decode => Self::document_invalid(e.to_string()),
            DbErrorCode::Validation => Self::config_error(e.to_string()),
            _ => Self::io_error(e.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

//! Error types for flatdb
//!
//! Error codes:
//! - FLATDB_NOT_FOUND (REJECT)
//! - FLATDB_CONFLICT (REJECT)
//! - FLATDB_TYPE_MISMATCH (REJECT)
//! - FLATDB_VALIDATION_FAILED (REJECT)
//! - FLATDB_DECODE_FAILED (ERROR)
//! - FLATDB_ENCODE_FAILED (ERROR)
//! - FLATDB_IO_ERROR (ERROR)
//!
//! No error is swallowed or retried; every failure is returned to the caller.

use std::fmt;
use std::io;

use crate::codec::CodecError;

/// Severity levels for database errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The caller asked for something the document cannot do
    Reject,
    /// The codec or the backing storage failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Error kinds surfaced by records, tables and documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorCode {
    /// Missing document, table or record
    NotFound,
    /// Duplicate table name (or type, under by-type uniqueness)
    Conflict,
    /// Value, table and view types disagree
    TypeMismatch,
    /// Blank or otherwise invalid name
    Validation,
    /// Malformed identifier, payload or type descriptor on load
    Decode,
    /// Payload could not be encoded on save
    Encode,
    /// Backing storage failure
    Io,
}

impl DbErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            DbErrorCode::NotFound => "FLATDB_NOT_FOUND",
            DbErrorCode::Conflict => "FLATDB_CONFLICT",
            DbErrorCode::TypeMismatch => "FLATDB_TYPE_MISMATCH",
            DbErrorCode::Validation => "FLATDB_VALIDATION_FAILED",
            DbErrorCode::Decode => "FLATDB_DECODE_FAILED",
            DbErrorCode::Encode => "FLATDB_ENCODE_FAILED",
            DbErrorCode::Io => "FLATDB_IO_ERROR",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            DbErrorCode::Decode | DbErrorCode::Encode | DbErrorCode::Io => Severity::Error,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for DbErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Database error with full context
#[derive(Debug)]
pub struct DbError {
    code: DbErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl DbError {
    fn new(code: DbErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Attach extra context to the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// The backing document does not exist
    pub fn document_not_found(location: impl Into<String>) -> Self {
        Self::new(
            DbErrorCode::NotFound,
            format!("Database document '{}' not found", location.into()),
        )
    }

    /// No table carries the given name
    pub fn table_not_found(name: &str) -> Self {
        Self::new(DbErrorCode::NotFound, format!("Table '{}' not found", name))
    }

    /// No table is declared for the given type
    pub fn table_of_type_not_found(type_name: &str) -> Self {
        Self::new(
            DbErrorCode::NotFound,
            format!("Table of type '{}' not found", type_name),
        )
    }

    /// No record carries the given identifier
    pub fn record_not_found(table: &str, identifier: impl fmt::Display) -> Self {
        Self::new(
            DbErrorCode::NotFound,
            format!("Record with identifier '{}' not found", identifier),
        )
        .with_details(format!("table: {}", table))
    }

    /// A table with this name already exists
    pub fn table_name_conflict(name: &str) -> Self {
        Self::new(
            DbErrorCode::Conflict,
            format!("Table '{}' already exists", name),
        )
    }

    /// A table of this type already exists under by-type uniqueness
    pub fn table_type_conflict(type_name: &str, existing: &str) -> Self {
        Self::new(
            DbErrorCode::Conflict,
            format!("A table of type '{}' already exists", type_name),
        )
        .with_details(format!("existing table: {}", existing))
    }

    /// Two different structural types claim the same descriptor
    pub fn type_descriptor_conflict(descriptor: &str) -> Self {
        Self::new(
            DbErrorCode::Conflict,
            format!("Type descriptor '{}' is already registered to another type", descriptor),
        )
    }

    /// A value or view disagrees with the table's declared type
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        Self::new(
            DbErrorCode::TypeMismatch,
            format!("Expected type '{}', got '{}'", expected, actual),
        )
    }

    /// A name failed validation
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(DbErrorCode::Validation, message)
    }

    /// Decoding the encoded form failed
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(DbErrorCode::Decode, message)
    }

    /// Encoding a payload failed
    pub fn encode(message: impl Into<String>) -> Self {
        Self::new(DbErrorCode::Encode, message)
    }

    /// Backing storage failure with I/O source
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: DbErrorCode::Io,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Backing storage failure without I/O source
    pub fn io_no_source(message: impl Into<String>) -> Self {
        Self::new(DbErrorCode::Io, message)
    }

    /// Returns the error code
    pub fn code(&self) -> DbErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_not_found(&self) -> bool {
        self.code == DbErrorCode::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.code == DbErrorCode::Conflict
    }

    pub fn is_type_mismatch(&self) -> bool {
        self.code == DbErrorCode::TypeMismatch
    }

    pub fn is_decode(&self) -> bool {
        self.code == DbErrorCode::Decode
    }

    pub fn is_encode(&self) -> bool {
        self.code == DbErrorCode::Encode
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<CodecError> for DbError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::SerializationFailed { .. } => DbError::encode(err.to_string()),
            _ => DbError::decode(err.to_string()),
        }
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

//! Persisted document layout
//!
//! ```text
//! {
//!   "format_version": 1,
//!   "saved_at": "2026-01-01T00:00:00Z",
//!   "tables": [
//!     {
//!       "name": "Contacts",
//!       "type": "Contact",
//!       "records": [
//!         { "identifier": "<uuid>", "value": "<codec output as text>" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! A document is always written whole; there is no partial patching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DbError, DbResult};

/// Current layout version
pub const FORMAT_VERSION: u32 = 1;

/// One encoded record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedRecord {
    /// Hyphenated record identifier
    pub identifier: String,
    /// Codec output stored as text
    pub value: String,
}

/// One encoded table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedTable {
    pub name: String,
    /// Type descriptor resolved through the registry at load time
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub records: Vec<EncodedRecord>,
}

/// The whole durable document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedDocument {
    pub format_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tables: Vec<EncodedTable>,
}

impl EncodedDocument {
    /// A document with an empty tables section
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn new(tables: Vec<EncodedTable>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            saved_at: Some(Utc::now()),
            tables,
        }
    }

    pub fn to_bytes(&self, pretty: bool) -> DbResult<Vec<u8>> {
        let result = if pretty {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        };
        result.map_err(|e| DbError::encode(format!("Failed to encode document: {}", e)))
    }

    /// Parses a document, rejecting unknown layout versions.
    pub fn from_bytes(bytes: &[u8]) -> DbResult<Self> {
        let document: EncodedDocument = serde_json::from_slice(bytes)
            .map_err(|e| DbError::decode(format!("Malformed document: {}", e)))?;

        if document.format_version != FORMAT_VERSION {
            return Err(DbError::decode(format!(
                "Unsupported document format version {}",
                document.format_version
            )));
        }

        Ok(document)
    }
}

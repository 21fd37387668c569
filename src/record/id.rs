//! Record identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::CodecError;

/// Stable unique identifier of a record.
///
/// Assigned once when the record is created and carried unchanged through
/// every erase/restore and save/load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh random (v4) identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecordId {
    type Err = CodecError;

    /// Accepts only the lowercase hyphenated form written by `Display`,
    /// so a stored identifier's text survives save and load unchanged.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CodecError::MalformedIdentifier(s.to_string());
        let uuid = Uuid::parse_str(s).map_err(|_| malformed())?;
        if uuid.hyphenated().to_string() != s {
            return Err(malformed());
        }
        Ok(Self(uuid))
    }
}

//! Observable events for flatdb
//!
//! Events are explicit and typed. Load and save are logged through
//! [`super::ObservationScope`] as `LOAD_*` and `SAVE_*`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Empty document written for a store that had none
    DocumentCreated,
    /// Document decoded into tables
    DocumentOpened,
    /// In-memory tables replaced from storage
    DocumentReloaded,
    /// Configuration file read
    ConfigLoaded,
    TableCreated,
    TableDeleted,
    /// Table explicitly queued for the next save
    TableMarkedPending,
    /// Structural type registered for decoding
    TypeRegistered,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::DocumentCreated => "DOCUMENT_CREATED",
            Event::DocumentOpened => "DOCUMENT_OPENED",
            Event::DocumentReloaded => "DOCUMENT_RELOADED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TableCreated => "TABLE_CREATED",
            Event::TableDeleted => "TABLE_DELETED",
            Event::TableMarkedPending => "TABLE_MARKED_PENDING",
            Event::TypeRegistered => "TYPE_REGISTERED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

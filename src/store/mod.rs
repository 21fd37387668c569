//! Durable storage for the encoded document
//!
//! The document model only needs three things from storage: whether a
//! document exists, its full bytes, and a way to replace it whole.
//!
//! # Invariants
//!
//! - A write replaces the entire document or leaves the previous one intact
//! - The store never patches part of a document

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::errors::DbResult;

/// Backing storage for one encoded document.
///
/// The document assumes exclusive ownership of its store for the life of
/// the process; concurrent external writers must be prevented by the caller.
pub trait DocumentStore {
    /// True when a document has been written
    fn exists(&self) -> bool;

    /// Reads the full encoded document.
    ///
    /// Returns not-found when no document exists.
    fn read_document(&self) -> DbResult<Vec<u8>>;

    /// Atomically replaces the full encoded document.
    fn write_document(&mut self, bytes: &[u8]) -> DbResult<()>;

    /// Human-readable location for logs and errors
    fn describe(&self) -> String;
}

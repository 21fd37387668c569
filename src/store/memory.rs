//! In-memory document store
//!
//! Clones share the same underlying buffer, so a test can keep a handle
//! after moving the store into a database.

use std::cell::RefCell;
use std::rc::Rc;

use super::DocumentStore;
use crate::errors::{DbError, DbResult};

#[derive(Debug, Default)]
struct MemoryState {
    document: Option<Vec<u8>>,
    fail_writes: bool,
    writes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `bytes`
    pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.set_contents(bytes);
        store
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.state.borrow().document.clone()
    }

    /// Overwrites the stored bytes without counting as a write
    pub fn set_contents(&self, bytes: impl Into<Vec<u8>>) {
        self.state.borrow_mut().document = Some(bytes.into());
    }

    /// Makes every following write fail until reset
    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }
}

impl DocumentStore for MemoryStore {
    fn exists(&self) -> bool {
        self.state.borrow().document.is_some()
    }

    fn read_document(&self) -> DbResult<Vec<u8>> {
        self.contents()
            .ok_or_else(|| DbError::document_not_found(self.describe()))
    }

    fn write_document(&mut self, bytes: &[u8]) -> DbResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(DbError::io_no_source("Simulated write failure"));
        }
        state.document = Some(bytes.to_vec());
        state.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

//! Opening a document
//!
//! A [`Database`] only exists once its backing document has been decoded.
//! The builder covers the uninitialized side: it either opens an existing
//! document or writes an empty one first and then opens it.

use crate::codec::{EncodedDocument, JsonCodec, PayloadCodec, TypeRegistry};
use crate::config::{DatabaseConfig, Uniqueness};
use crate::errors::{DbError, DbResult};
use crate::observability::{log_event_with_fields, Event};
use crate::record::RecordType;
use crate::store::DocumentStore;

use super::database::{load_document, Database, NameInference};

pub struct DatabaseBuilder {
    pub(super) store: Box<dyn DocumentStore>,
    pub(super) registry: TypeRegistry,
    pub(super) codec: Box<dyn PayloadCodec>,
    pub(super) uniqueness: Uniqueness,
    pub(super) pretty: bool,
    pub(super) name_inference: Option<NameInference>,
}

impl DatabaseBuilder {
    pub fn new(store: impl DocumentStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            registry: TypeRegistry::new(),
            codec: Box::new(JsonCodec),
            uniqueness: Uniqueness::default(),
            pretty: true,
            name_inference: None,
        }
    }

    /// Replaces the type registry used to decode tables
    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Registers one structural type
    pub fn register<T: RecordType>(mut self) -> DbResult<Self> {
        self.registry.register::<T>()?;
        Ok(self)
    }

    pub fn codec(mut self, codec: impl PayloadCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn uniqueness(mut self, uniqueness: Uniqueness) -> Self {
        self.uniqueness = uniqueness;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Hook deriving a default table name from a type descriptor
    pub fn name_inference(mut self, infer: impl Fn(&str) -> String + 'static) -> Self {
        self.name_inference = Some(Box::new(infer));
        self
    }

    /// Applies the document-level settings of a config
    pub fn apply_config(self, config: &DatabaseConfig) -> Self {
        self.uniqueness(config.table_uniqueness).pretty(config.pretty)
    }

    /// Opens an existing document.
    ///
    /// # Errors
    ///
    /// - not-found if the store holds no document
    /// - decode error if any table or record fails to decode; no partially
    ///   loaded database is returned
    pub fn open(self) -> DbResult<Database> {
        if !self.store.exists() {
            return Err(DbError::document_not_found(self.store.describe()));
        }

        let loaded = load_document(self.store.as_ref(), &self.registry, self.codec.as_ref())?;

        let store = self.store.describe();
        let tables = loaded.tables.len().to_string();
        log_event_with_fields(
            Event::DocumentOpened,
            &[("store", store.as_str()), ("tables", tables.as_str())],
        );

        Ok(Database::from_parts(self, loaded))
    }

    /// Writes an empty document if none exists, then opens it.
    pub fn create_or_open(mut self) -> DbResult<Database> {
        if !self.store.exists() {
            let bytes = EncodedDocument::empty().to_bytes(self.pretty)?;
            self.store.write_document(&bytes)?;
            let store = self.store.describe();
            log_event_with_fields(Event::DocumentCreated, &[("store", store.as_str())]);
        }
        self.open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_open_missing_document_is_not_found() {
        let err = DatabaseBuilder::new(MemoryStore::new()).open().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_or_open_writes_empty_document() {
        let store = MemoryStore::new();
        let db = DatabaseBuilder::new(store.clone()).create_or_open().unwrap();

        assert_eq!(db.table_names().len(), 0);
        assert_eq!(store.write_count(), 1);

        let document = EncodedDocument::from_bytes(&store.contents().unwrap()).unwrap();
        assert!(document.tables.is_empty());
    }

    #[test]
    fn test_create_or_open_keeps_existing_document() {
        let store = MemoryStore::new();
        DatabaseBuilder::new(store.clone()).create_or_open().unwrap();
        DatabaseBuilder::new(store.clone()).create_or_open().unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_open_garbage_is_decode_error() {
        let store = MemoryStore::with_document(b"<FlatDB><Tables/></FlatDB>".to_vec());
        let err = DatabaseBuilder::new(store).open().unwrap_err();
        assert!(err.is_decode());
    }
}

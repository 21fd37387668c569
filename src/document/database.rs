//! The database document model
//!
//! Owns every table of one document, resolves tables by type or by name,
//! tracks which tables changed since the last save, and writes the whole
//! document back through its store.

use std::collections::HashMap;
use std::fmt;

use crate::codec::{EncodedDocument, EncodedTable, PayloadCodec, TypeRegistry};
use crate::config::{DatabaseConfig, Uniqueness};
use crate::errors::{DbError, DbResult};
use crate::observability::{log_event_with_fields, Event, Logger, ObservationScope};
use crate::record::RecordType;
use crate::store::{DocumentStore, FileStore};
use crate::table::{ErasedTable, TableView, TableViewMut};

use super::builder::DatabaseBuilder;

/// Derives a table name from a type descriptor
pub type NameInference = Box<dyn Fn(&str) -> String>;

/// Tables decoded from a document, plus the encoding they were read from
pub(super) struct LoadedDocument {
    pub(super) tables: Vec<ErasedTable>,
    pub(super) durable: HashMap<String, EncodedTable>,
}

/// Reads and decodes the whole document.
///
/// All-or-nothing: a single bad table or record fails the load.
pub(super) fn load_document(
    store: &dyn DocumentStore,
    registry: &TypeRegistry,
    codec: &dyn PayloadCodec,
) -> DbResult<LoadedDocument> {
    let location = store.describe();
    let scope = ObservationScope::with_fields("LOAD", &[("store", location.as_str())]);

    match decode_document(store, registry, codec) {
        Ok(loaded) => {
            let tables = loaded.tables.len().to_string();
            let records: usize = loaded.tables.iter().map(|t| t.len()).sum();
            let records = records.to_string();
            scope.complete_with_fields(&[("tables", tables.as_str()), ("records", records.as_str())]);
            Ok(loaded)
        }
        Err(e) => {
            scope.fail(&e.to_string());
            Err(e)
        }
    }
}

fn decode_document(
    store: &dyn DocumentStore,
    registry: &TypeRegistry,
    codec: &dyn PayloadCodec,
) -> DbResult<LoadedDocument> {
    let bytes = store.read_document()?;
    let document = EncodedDocument::from_bytes(&bytes)?;

    let mut tables: Vec<ErasedTable> = Vec::with_capacity(document.tables.len());
    let mut durable = HashMap::with_capacity(document.tables.len());

    for encoded in document.tables {
        if durable.contains_key(&encoded.name) {
            return Err(DbError::decode(format!(
                "Duplicate table name '{}' in document",
                encoded.name
            )));
        }
        let table = ErasedTable::from_encoded_form(&encoded, registry, codec)?;
        tables.push(table);
        durable.insert(encoded.name.clone(), encoded);
    }

    Ok(LoadedDocument { tables, durable })
}

pub struct Database {
    store: Box<dyn DocumentStore>,
    registry: TypeRegistry,
    codec: Box<dyn PayloadCodec>,
    uniqueness: Uniqueness,
    pretty: bool,
    name_inference: Option<NameInference>,
    /// In first-registration order
    tables: Vec<ErasedTable>,
    /// Last durable encoding of each table, reused for clean tables
    durable: HashMap<String, EncodedTable>,
    /// Tables deleted since the last save
    removed: Vec<String>,
}

impl Database {
    pub fn builder(store: impl DocumentStore + 'static) -> DatabaseBuilder {
        DatabaseBuilder::new(store)
    }

    /// Opens an existing document; not-found if the store holds none.
    pub fn open(store: impl DocumentStore + 'static, registry: TypeRegistry) -> DbResult<Self> {
        DatabaseBuilder::new(store).registry(registry).open()
    }

    /// Writes an empty document if the store holds none, then opens it.
    pub fn create_or_open(
        store: impl DocumentStore + 'static,
        registry: TypeRegistry,
    ) -> DbResult<Self> {
        DatabaseBuilder::new(store).registry(registry).create_or_open()
    }

    /// Opens the file document described by `config`.
    pub fn open_with_config(config: &DatabaseConfig, registry: TypeRegistry) -> DbResult<Self> {
        config.validate()?;
        Logger::set_min_severity(config.severity()?);

        let builder = DatabaseBuilder::new(FileStore::new(&config.path))
            .registry(registry)
            .apply_config(config);

        if config.create_if_missing {
            builder.create_or_open()
        } else {
            builder.open()
        }
    }

    pub(super) fn from_parts(builder: DatabaseBuilder, loaded: LoadedDocument) -> Self {
        Self {
            store: builder.store,
            registry: builder.registry,
            codec: builder.codec,
            uniqueness: builder.uniqueness,
            pretty: builder.pretty,
            name_inference: builder.name_inference,
            tables: loaded.tables,
            durable: loaded.durable,
            removed: Vec::new(),
        }
    }

    /// Replaces the in-memory tables with the stored document.
    ///
    /// Unsaved changes are discarded. On failure nothing changes.
    pub fn reload(&mut self) -> DbResult<()> {
        let loaded = load_document(self.store.as_ref(), &self.registry, self.codec.as_ref())?;
        self.tables = loaded.tables;
        self.durable = loaded.durable;
        self.removed.clear();

        let tables = self.tables.len().to_string();
        log_event_with_fields(Event::DocumentReloaded, &[("tables", tables.as_str())]);
        Ok(())
    }

    pub fn store_location(&self) -> String {
        self.store.describe()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn uniqueness(&self) -> Uniqueness {
        self.uniqueness
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.name() == name)
    }

    fn position_of<T: RecordType>(&self) -> Option<usize> {
        self.tables.iter().position(|t| t.type_tag().is::<T>())
    }

    fn register_type<T: RecordType>(&mut self) -> DbResult<()> {
        let known = self.registry.contains(T::TYPE_NAME);
        self.registry.register::<T>()?;
        if !known {
            log_event_with_fields(Event::TypeRegistered, &[("type", T::TYPE_NAME)]);
        }
        Ok(())
    }

    /// Creates an empty table for `T`.
    ///
    /// The table is held in memory and pending until the next save.
    ///
    /// # Errors
    ///
    /// - validation error if `name` is blank
    /// - conflict if a table named `name` exists, or, under
    ///   [`Uniqueness::ByType`], if a table of type `T` exists
    pub fn create_table<T: RecordType>(&mut self, name: &str) -> DbResult<TableViewMut<'_, T>> {
        let table = ErasedTable::create_for::<T>(name)?;

        if self.position(name).is_some() {
            return Err(DbError::table_name_conflict(name));
        }
        if self.uniqueness == Uniqueness::ByType {
            if let Some(index) = self.position_of::<T>() {
                return Err(DbError::table_type_conflict(
                    T::TYPE_NAME,
                    self.tables[index].name(),
                ));
            }
        }

        self.register_type::<T>()?;
        self.tables.push(table);
        self.removed.retain(|removed| removed != name);

        log_event_with_fields(Event::TableCreated, &[("table", name), ("type", T::TYPE_NAME)]);

        let index = self.tables.len() - 1;
        TableViewMut::bind(&mut self.tables[index])
    }

    /// Creates a table for `T` named by the name-inference hook, or by the
    /// type descriptor when no hook is set.
    pub fn create_default_table<T: RecordType>(&mut self) -> DbResult<TableViewMut<'_, T>> {
        let name = self.default_table_name::<T>();
        self.create_table::<T>(&name)
    }

    pub fn default_table_name<T: RecordType>(&self) -> String {
        match &self.name_inference {
            Some(infer) => infer(T::TYPE_NAME),
            None => T::TYPE_NAME.to_string(),
        }
    }

    /// Removes a table by name.
    ///
    /// It disappears from the encoded form on the next save.
    pub fn delete_table(&mut self, name: &str) -> DbResult<ErasedTable> {
        let index = self
            .position(name)
            .ok_or_else(|| DbError::table_not_found(name))?;
        Ok(self.remove_at(index))
    }

    /// Removes the first table declared for `T`
    pub fn delete_table_of<T: RecordType>(&mut self) -> DbResult<ErasedTable> {
        let index = self
            .position_of::<T>()
            .ok_or_else(|| DbError::table_of_type_not_found(T::TYPE_NAME))?;
        Ok(self.remove_at(index))
    }

    fn remove_at(&mut self, index: usize) -> ErasedTable {
        let table = self.tables.remove(index);
        self.durable.remove(table.name());
        self.removed.push(table.name().to_string());
        log_event_with_fields(Event::TableDeleted, &[("table", table.name())]);
        table
    }

    /// Typed view of the table declared for `T`.
    ///
    /// When several tables share `T`, the first one created or loaded wins.
    /// Use [`Database::table_named`] to pick a specific one.
    pub fn table<T: RecordType>(&self) -> DbResult<TableView<'_, T>> {
        let index = self
            .position_of::<T>()
            .ok_or_else(|| DbError::table_of_type_not_found(T::TYPE_NAME))?;
        TableView::bind(&self.tables[index])
    }

    /// Mutable form of [`Database::table`]
    pub fn table_mut<T: RecordType>(&mut self) -> DbResult<TableViewMut<'_, T>> {
        let index = self
            .position_of::<T>()
            .ok_or_else(|| DbError::table_of_type_not_found(T::TYPE_NAME))?;
        TableViewMut::bind(&mut self.tables[index])
    }

    /// Typed view of the table named `name`, checked against `T`
    pub fn table_named<T: RecordType>(&self, name: &str) -> DbResult<TableView<'_, T>> {
        TableView::bind(self.erased_table(name)?)
    }

    pub fn table_named_mut<T: RecordType>(&mut self, name: &str) -> DbResult<TableViewMut<'_, T>> {
        TableViewMut::bind(self.erased_table_mut(name)?)
    }

    /// Resolves a table by name only, without checking its type.
    ///
    /// The caller binds a typed view afterwards.
    pub fn erased_table(&self, name: &str) -> DbResult<&ErasedTable> {
        self.tables
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| DbError::table_not_found(name))
    }

    pub fn erased_table_mut(&mut self, name: &str) -> DbResult<&mut ErasedTable> {
        self.tables
            .iter_mut()
            .find(|t| t.name() == name)
            .ok_or_else(|| DbError::table_not_found(name))
    }

    pub fn tables(&self) -> impl Iterator<Item = &ErasedTable> {
        self.tables.iter()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name()).collect()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Queues a table for the next save regardless of its dirty state.
    ///
    /// Several tables may be queued at once.
    pub fn mark_pending(&mut self, name: &str) -> DbResult<()> {
        self.erased_table_mut(name)?.mark_pending();
        log_event_with_fields(Event::TableMarkedPending, &[("table", name)]);
        Ok(())
    }

    fn needs_encoding(&self, table: &ErasedTable) -> bool {
        table.is_pending() || !self.durable.contains_key(table.name())
    }

    /// Names of tables whose changes are not yet durable
    pub fn pending_tables(&self) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|t| self.needs_encoding(t))
            .map(|t| t.name())
            .collect()
    }

    /// Names of tables deleted since the last save
    pub fn pending_removals(&self) -> &[String] {
        &self.removed
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.removed.is_empty() || self.tables.iter().any(|t| self.needs_encoding(t))
    }

    /// Writes the document, re-encoding only pending tables.
    ///
    /// Clean tables reuse their last durable encoding. The whole document is
    /// still replaced in one write.
    pub fn save(&mut self) -> DbResult<()> {
        self.write_document(false)
    }

    /// Writes the document, re-encoding every table.
    pub fn save_all(&mut self) -> DbResult<()> {
        self.write_document(true)
    }

    fn write_document(&mut self, reencode_all: bool) -> DbResult<()> {
        let location = self.store.describe();
        let mode = if reencode_all { "all" } else { "pending" };
        let scope = ObservationScope::with_fields(
            "SAVE",
            &[("store", location.as_str()), ("mode", mode)],
        );

        let (document, reencoded) = match self.encode_document(reencode_all) {
            Ok(encoded) => encoded,
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(e);
            }
        };

        let written = document
            .to_bytes(self.pretty)
            .and_then(|bytes| self.store.write_document(&bytes));
        if let Err(e) = written {
            scope.fail(&e.to_string());
            return Err(e);
        }

        // Only now is the new encoding durable
        self.durable = document
            .tables
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();
        for table in &mut self.tables {
            table.clear_pending();
        }
        let removed = self.removed.len().to_string();
        self.removed.clear();

        let tables = self.tables.len().to_string();
        let reencoded = reencoded.to_string();
        scope.complete_with_fields(&[
            ("tables", tables.as_str()),
            ("reencoded", reencoded.as_str()),
            ("removed", removed.as_str()),
        ]);
        Ok(())
    }

    fn encode_document(&self, reencode_all: bool) -> DbResult<(EncodedDocument, usize)> {
        let mut encoded = Vec::with_capacity(self.tables.len());
        let mut reencoded = 0;

        for table in &self.tables {
            let cached = if reencode_all || table.is_pending() {
                None
            } else {
                self.durable.get(table.name())
            };

            match cached {
                Some(previous) => encoded.push(previous.clone()),
                None => {
                    encoded.push(table.to_encoded_form(self.codec.as_ref())?);
                    reencoded += 1;
                }
            }
        }

        Ok((EncodedDocument::new(encoded), reencoded))
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("store", &self.store.describe())
            .field("codec", &self.codec.name())
            .field("uniqueness", &self.uniqueness)
            .field("tables", &self.table_names())
            .field("removed", &self.removed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Contact {
        name: String,
    }

    impl RecordType for Contact {
        const TYPE_NAME: &'static str = "Contact";
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Invoice {
        total: u64,
    }

    impl RecordType for Invoice {
        const TYPE_NAME: &'static str = "Invoice";
    }

    fn empty_db() -> (MemoryStore, Database) {
        let store = MemoryStore::new();
        let db = Database::create_or_open(store.clone(), TypeRegistry::new()).unwrap();
        (store, db)
    }

    fn contact(name: &str) -> Contact {
        Contact { name: name.into() }
    }

    #[test]
    fn test_create_table_name_conflict() {
        let (_store, mut db) = empty_db();
        db.create_table::<Contact>("Contacts").unwrap();
        let err = db.create_table::<Contact>("Contacts").unwrap_err();
        assert!(err.is_conflict());
        let err = db.create_table::<Invoice>("Contacts").unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_create_table_type_conflict_only_by_type() {
        let (_store, mut db) = empty_db();
        db.create_table::<Contact>("Contacts").unwrap();
        db.create_table::<Contact>("Archive").unwrap();

        let store = MemoryStore::new();
        let mut strict = Database::builder(store)
            .uniqueness(Uniqueness::ByType)
            .create_or_open()
            .unwrap();
        strict.create_table::<Contact>("Contacts").unwrap();
        let err = strict.create_table::<Contact>("Archive").unwrap_err();
        assert!(err.is_conflict());
        assert!(err.details().unwrap_or_default().contains("Contacts"));
    }

    #[test]
    fn test_create_table_registers_type() {
        let (_store, mut db) = empty_db();
        assert!(!db.registry().contains("Contact"));
        db.create_table::<Contact>("Contacts").unwrap();
        assert!(db.registry().contains("Contact"));
    }

    #[test]
    fn test_get_by_type_first_registration_wins() {
        let (_store, mut db) = empty_db();
        db.create_table::<Contact>("First").unwrap().add(contact("a")).unwrap();
        db.create_table::<Contact>("Second").unwrap();

        let view = db.table::<Contact>().unwrap();
        assert_eq!(view.name(), "First");
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_get_missing_type_is_not_found() {
        let (_store, db) = empty_db();
        assert!(db.table::<Contact>().unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_by_name_validates_type() {
        let (_store, mut db) = empty_db();
        db.create_table::<Contact>("Contacts").unwrap();

        assert!(db.table_named::<Contact>("Contacts").is_ok());
        assert!(db.table_named::<Invoice>("Contacts").unwrap_err().is_type_mismatch());
        assert!(db.table_named::<Contact>("Missing").unwrap_err().is_not_found());

        // the unchecked variant resolves regardless of type
        let erased = db.erased_table("Contacts").unwrap();
        assert_eq!(erased.type_tag().name(), "Contact");
    }

    #[test]
    fn test_views_share_live_state() {
        let (_store, mut db) = empty_db();
        db.create_table::<Contact>("Contacts").unwrap();
        db.table_mut::<Contact>().unwrap().add(contact("a")).unwrap();
        db.table_named_mut::<Contact>("Contacts")
            .unwrap()
            .add(contact("b"))
            .unwrap();

        let names: Vec<_> = db
            .table::<Contact>()
            .unwrap()
            .enumerate()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_delete_table() {
        let (_store, mut db) = empty_db();
        db.create_table::<Contact>("Contacts").unwrap();

        let removed = db.delete_table("Contacts").unwrap();
        assert_eq!(removed.name(), "Contacts");
        assert!(!db.has_table("Contacts"));
        assert_eq!(db.pending_removals(), ["Contacts".to_string()]);
        assert!(db.delete_table("Contacts").unwrap_err().is_not_found());
        assert!(db.delete_table_of::<Contact>().unwrap_err().is_not_found());
    }

    #[test]
    fn test_default_table_name_uses_hook() {
        let (_store, mut db) = empty_db();
        assert_eq!(db.default_table_name::<Contact>(), "Contact");
        db.create_default_table::<Contact>().unwrap();
        assert!(db.has_table("Contact"));

        let mut db = Database::builder(MemoryStore::new())
            .name_inference(|name| format!("{}s", name))
            .create_or_open()
            .unwrap();
        db.create_default_table::<Invoice>().unwrap();
        assert!(db.has_table("Invoices"));
    }

    #[test]
    fn test_save_clears_pending() {
        let (_store, mut db) = empty_db();
        db.create_table::<Contact>("Contacts").unwrap().add(contact("a")).unwrap();
        assert_eq!(db.pending_tables(), vec!["Contacts"]);
        assert!(db.has_unsaved_changes());

        db.save().unwrap();
        assert!(db.pending_tables().is_empty());
        assert!(!db.has_unsaved_changes());
        assert!(!db.table::<Contact>().unwrap().records().unwrap()[0].is_dirty());
    }

    #[test]
    fn test_mark_pending_queues_several_tables() {
        let (_store, mut db) = empty_db();
        db.create_table::<Contact>("Contacts").unwrap();
        db.create_table::<Invoice>("Invoices").unwrap();
        db.save().unwrap();

        db.mark_pending("Contacts").unwrap();
        db.mark_pending("Invoices").unwrap();
        assert_eq!(db.pending_tables(), vec!["Contacts", "Invoices"]);
        assert!(db.mark_pending("Missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_failed_save_keeps_pending_and_document() {
        let (store, mut db) = empty_db();
        let before = store.contents().unwrap();

        db.create_table::<Contact>("Contacts").unwrap().add(contact("a")).unwrap();
        store.fail_writes(true);

        let err = db.save().unwrap_err();
        assert_eq!(err.code(), crate::errors::DbErrorCode::Io);
        assert_eq!(store.contents().unwrap(), before);
        assert_eq!(db.pending_tables(), vec!["Contacts"]);
    }

    #[test]
    fn test_reload_discards_unsaved_changes() {
        let (_store, mut db) = empty_db();
        db.create_table::<Contact>("Contacts").unwrap();
        db.save().unwrap();

        db.table_mut::<Contact>().unwrap().add(contact("unsaved")).unwrap();
        db.reload().unwrap();
        assert!(db.table::<Contact>().unwrap().is_empty());
    }

    #[test]
    fn test_debug_lists_tables() {
        let (_store, mut db) = empty_db();
        db.create_table::<Contact>("Contacts").unwrap();
        let debug = format!("{:?}", db);
        assert!(debug.contains("Contacts"));
        assert!(debug.contains("<memory>"));
    }
}

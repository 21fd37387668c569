//! Document Round-Trip Tests
//!
//! A saved document, reopened from its file, yields the same tables in the
//! same order with the same records, identifiers and payloads.

use flatdb::{Database, DbResult, FileStore, RecordType, TypeRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Contact {
    title: String,
    first: String,
    last: String,
    email: String,
}

impl RecordType for Contact {
    const TYPE_NAME: &'static str = "Contact";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    text: String,
    pinned: bool,
}

impl RecordType for Note {
    const TYPE_NAME: &'static str = "Note";
}

fn contact(title: &str, first: &str, last: &str, email: &str) -> Contact {
    Contact {
        title: title.into(),
        first: first.into(),
        last: last.into(),
        email: email.into(),
    }
}

fn document_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("contacts.json")
}

fn registry() -> TypeRegistry {
    TypeRegistry::new()
        .with::<Contact>()
        .and_then(|r| r.with::<Note>())
        .expect("registry")
}

fn reopen(path: &Path) -> DbResult<Database> {
    Database::open(FileStore::new(path), registry())
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_contacts_survive_save_and_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = document_path(&temp_dir);

    let mut db = Database::create_or_open(FileStore::new(&path), TypeRegistry::new()).unwrap();
    let (ada, grace) = {
        let mut contacts = db.create_table::<Contact>("Contacts").unwrap();
        let ada = contacts
            .add(contact("Dr", "Ada", "Lovelace", "ada@example.com"))
            .unwrap();
        let grace = contacts
            .add(contact("Rear Admiral", "Grace", "Hopper", "grace@example.com"))
            .unwrap();
        (ada, grace)
    };
    db.save().unwrap();
    drop(db);

    let db = reopen(&path).unwrap();
    let contacts = db.table::<Contact>().unwrap();
    assert_eq!(contacts.name(), "Contacts");
    assert_eq!(contacts.len(), 2);

    let records = contacts.records().unwrap();
    assert_eq!(records[0].identifier(), ada);
    assert_eq!(records[1].identifier(), grace);
    assert_eq!(records[0].payload().first, "Ada");
    assert_eq!(records[1].payload().email, "grace@example.com");
    assert!(records.iter().all(|r| !r.is_dirty()));
}

#[test]
fn test_zero_tables_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = document_path(&temp_dir);

    let mut db = Database::create_or_open(FileStore::new(&path), TypeRegistry::new()).unwrap();
    db.save().unwrap();

    let db = reopen(&path).unwrap();
    assert!(db.table_names().is_empty());
    assert!(!db.has_unsaved_changes());
}

#[test]
fn test_empty_table_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = document_path(&temp_dir);

    let mut db = Database::create_or_open(FileStore::new(&path), TypeRegistry::new()).unwrap();
    db.create_table::<Note>("Notes").unwrap();
    db.save().unwrap();

    let db = reopen(&path).unwrap();
    let notes = db.table::<Note>().unwrap();
    assert!(notes.is_empty());
    assert_eq!(notes.enumerate().count(), 0);
}

#[test]
fn test_multiple_tables_keep_order_and_types() {
    let temp_dir = TempDir::new().unwrap();
    let path = document_path(&temp_dir);

    let mut db = Database::create_or_open(FileStore::new(&path), TypeRegistry::new()).unwrap();
    db.create_table::<Note>("Notes")
        .unwrap()
        .add(Note {
            text: "call back".into(),
            pinned: true,
        })
        .unwrap();
    db.create_table::<Contact>("Contacts")
        .unwrap()
        .add(contact("Mr", "Alan", "Turing", "alan@example.com"))
        .unwrap();
    db.create_table::<Contact>("Archive").unwrap();
    db.save().unwrap();

    let db = reopen(&path).unwrap();
    assert_eq!(db.table_names(), vec!["Notes", "Contacts", "Archive"]);

    let erased: Vec<_> = db.tables().map(|t| t.type_tag().name()).collect();
    assert_eq!(erased, vec!["Note", "Contact", "Contact"]);

    let notes = db.table::<Note>().unwrap();
    assert!(notes.enumerate().next().unwrap().pinned);

    // first table declared for the type wins
    assert_eq!(db.table::<Contact>().unwrap().name(), "Contacts");
    assert!(db.table_named::<Contact>("Archive").unwrap().is_empty());
}

#[test]
fn test_enumeration_is_restartable() {
    let temp_dir = TempDir::new().unwrap();
    let path = document_path(&temp_dir);

    let mut db = Database::create_or_open(FileStore::new(&path), TypeRegistry::new()).unwrap();
    {
        let mut contacts = db.create_table::<Contact>("Contacts").unwrap();
        contacts.add(contact("", "A", "One", "a@example.com")).unwrap();
        contacts.add(contact("", "B", "Two", "b@example.com")).unwrap();
    }

    let view = db.table::<Contact>().unwrap();
    let values = view.enumerate();
    let first: Vec<_> = values.clone().map(|c| c.first.clone()).collect();
    let second: Vec<_> = values.map(|c| c.first.clone()).collect();
    assert_eq!(first, vec!["A", "B"]);
    assert_eq!(first, second);
}

#[test]
fn test_config_open_creates_document() {
    use flatdb::DatabaseConfig;

    let temp_dir = TempDir::new().unwrap();
    let path = document_path(&temp_dir);
    let config = DatabaseConfig::new(&path).create_if_missing(true);

    let mut db = Database::open_with_config(&config, TypeRegistry::new()).unwrap();
    db.create_table::<Note>("Notes").unwrap();
    db.save().unwrap();
    assert!(path.exists());

    let config = DatabaseConfig::new(&path);
    let db = Database::open_with_config(&config, registry()).unwrap();
    assert!(db.has_table("Notes"));
}

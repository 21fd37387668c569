//! Identity Stability Tests
//!
//! A record's identifier is assigned once and never changes: not through
//! erasure and restoration, not across repeated save and load cycles.

use flatdb::codec::{EncodedDocument, EncodedRecord, EncodedTable};
use flatdb::{Database, FileStore, MemoryStore, Record, RecordId, RecordType, TypeRegistry};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Task {
    title: String,
    done: bool,
}

impl RecordType for Task {
    const TYPE_NAME: &'static str = "Task";
}

fn task(title: &str) -> Task {
    Task {
        title: title.into(),
        done: false,
    }
}

#[test]
fn test_identifier_survives_erase_and_restore() {
    let record = Record::create_new(task("write tests"));
    let id = record.identifier();

    let erased = record.erase();
    assert_eq!(erased.identifier(), id);

    let restored = erased.restore::<Task>().unwrap();
    assert_eq!(restored.identifier(), id);
    assert_eq!(restored.payload().title, "write tests");
}

#[test]
fn test_identifiers_are_distinct() {
    let a = Record::create_new(task("a"));
    let b = Record::create_new(task("a"));
    assert_ne!(a.identifier(), b.identifier());
}

#[test]
fn test_identifier_parses_from_storage_text() {
    let id = RecordId::new();
    let record = Record::create_from_storage(task("stored"), &id.to_string()).unwrap();
    assert_eq!(record.identifier(), id);
    assert!(!record.is_dirty());

    let err = Record::create_from_storage(task("stored"), "not-a-uuid").unwrap_err();
    assert!(err.is_decode());
}

#[test]
fn test_identifiers_stable_across_repeated_saves() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tasks.json");

    let mut db = Database::create_or_open(FileStore::new(&path), TypeRegistry::new()).unwrap();
    let ids: Vec<RecordId> = {
        let mut tasks = db.create_table::<Task>("Tasks").unwrap();
        ["one", "two", "three"]
            .iter()
            .map(|t| tasks.add(task(t)).unwrap())
            .collect()
    };
    db.save().unwrap();

    for _ in 0..3 {
        let mut db =
            Database::open(FileStore::new(&path), TypeRegistry::new().with::<Task>().unwrap())
                .unwrap();
        let loaded: Vec<RecordId> = db
            .table::<Task>()
            .unwrap()
            .records()
            .unwrap()
            .iter()
            .map(|r| r.identifier())
            .collect();
        assert_eq!(loaded, ids);

        db.save_all().unwrap();
    }
}

#[test]
fn test_update_keeps_identifier() {
    let mut db = Database::create_or_open(MemoryStore::new(), TypeRegistry::new()).unwrap();
    let mut tasks = db.create_table::<Task>("Tasks").unwrap();
    let id = tasks.add(task("draft")).unwrap();

    tasks
        .update(
            id,
            Task {
                title: "draft".into(),
                done: true,
            },
        )
        .unwrap();

    let record = tasks.get(id).unwrap().unwrap();
    assert_eq!(record.identifier(), id);
    assert!(record.payload().done);
    assert_eq!(tasks.len(), 1);
}

#[test]
fn test_remove_by_identifier() {
    let mut db = Database::create_or_open(MemoryStore::new(), TypeRegistry::new()).unwrap();
    let mut tasks = db.create_table::<Task>("Tasks").unwrap();
    let keep = tasks.add(task("keep")).unwrap();
    let drop_id = tasks.add(task("drop")).unwrap();

    let removed = tasks.remove(drop_id).unwrap();
    assert_eq!(removed.identifier(), drop_id);
    assert_eq!(removed.payload().title, "drop");
    assert_eq!(tasks.len(), 1);
    assert!(tasks.get(keep).unwrap().is_some());

    let err = tasks.remove(drop_id).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(tasks.len(), 1);

    let err = tasks.remove(RecordId::new()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_non_canonical_stored_identifier_fails_open() {
    let id = RecordId::new();
    let padded_simple = format!("  {}  ", id.as_uuid().simple());
    let bytes = EncodedDocument::new(vec![EncodedTable {
        name: "Tasks".into(),
        type_name: "Task".into(),
        records: vec![EncodedRecord {
            identifier: padded_simple,
            value: r#"{"title":"stored","done":false}"#.into(),
        }],
    }])
    .to_bytes(false)
    .unwrap();

    let registry = TypeRegistry::new().with::<Task>().unwrap();
    let err = Database::open(MemoryStore::with_document(bytes), registry).unwrap_err();
    assert!(err.is_decode());
}

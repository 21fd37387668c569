//! flatdb - a single-file, schema-on-read typed record store
//!
//! Records of arbitrary structural types live in named tables inside one
//! document. Tables are stored type-erased and rebound to their concrete
//! type through checked views.
//!
//! ```ignore
//! let mut db = Database::create_or_open(FileStore::new("contacts.json"), TypeRegistry::new())?;
//! let mut contacts = db.create_table::<Contact>("Contacts")?;
//! contacts.add(Contact::new("Ada", "Lovelace"))?;
//! db.save()?;
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod document;
pub mod errors;
pub mod observability;
pub mod record;
pub mod store;
pub mod table;

pub use codec::{JsonCodec, PayloadCodec, TypeRegistry};
pub use config::{DatabaseConfig, Uniqueness};
pub use document::{Database, DatabaseBuilder};
pub use errors::{DbError, DbErrorCode, DbResult};
pub use record::{ErasedRecord, Record, RecordId, RecordType};
pub use store::{DocumentStore, FileStore, MemoryStore};
pub use table::{ErasedTable, TableView, TableViewMut};

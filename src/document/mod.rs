//! Document model
//!
//! A [`Database`] is one document: an ordered set of named tables, each
//! declared for a single record type, loaded in full on open and written
//! back in full on save.
//!
//! Tables are created in memory and become durable on the next save. Saving
//! re-encodes only tables with pending changes; clean tables reuse the
//! encoding they were last written with.

mod builder;
mod database;

pub use builder::DatabaseBuilder;
pub use database::{Database, NameInference};

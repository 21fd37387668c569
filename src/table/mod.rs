//! Table subsystem for flatdb
//!
//! # Design Principles
//!
//! - The erased table owns the records; typed views only project
//! - Every inserted value must match the table's declared type
//! - Removal is by identity, never by value
//! - A table is pending until its encoded form is durable

mod erased;
mod view;

pub use erased::ErasedTable;
pub use view::{TableView, TableViewMut, Values};

//! Record subsystem for flatdb
//!
//! Records are the unit of identity. Their identifier is generated once
//! and never regenerated when a record crosses the erased/typed boundary.

mod id;
mod payload;
#[allow(clippy::module_inception)]
mod record;

pub use id::RecordId;
pub use payload::{ErasedPayload, RecordType, TypeTag};
pub use record::{ErasedRecord, Record};

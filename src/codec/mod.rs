//! Codec subsystem for flatdb
//!
//! Converts single payloads to and from their encoded bytes, resolves
//! persisted type descriptors, and defines the layout of the durable
//! document.

mod errors;
mod json;
mod layout;
mod registry;

pub use errors::{CodecError, CodecResult};
pub use json::{JsonCodec, PayloadCodec};
pub use layout::{EncodedDocument, EncodedRecord, EncodedTable, FORMAT_VERSION};
pub use registry::{TypeBinding, TypeRegistry};

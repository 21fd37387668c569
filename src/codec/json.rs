//! JSON payload codec
//!
//! Payloads are stored as compact JSON text inside the record's `value`.

use serde_json::Value;

use super::errors::{CodecError, CodecResult};

/// Converts a structural payload to and from its encoded bytes.
///
/// The bytes produced by `encode` are persisted as text, so implementations
/// must emit valid UTF-8.
pub trait PayloadCodec {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Encode one payload
    fn encode(&self, type_name: &'static str, value: &Value) -> CodecResult<Vec<u8>>;

    /// Decode one payload
    fn decode(&self, type_name: &str, bytes: &[u8]) -> CodecResult<Value>;
}

/// Compact JSON codec backed by `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, type_name: &'static str, value: &Value) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CodecError::serialization(type_name, e))
    }

    fn decode(&self, type_name: &str, bytes: &[u8]) -> CodecResult<Value> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::deserialization(type_name, e))
    }
}

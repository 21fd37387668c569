//! Codec error types

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Failures while converting a single payload to or from its encoded form
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("Failed to serialize value of type '{type_name}': {reason}")]
    SerializationFailed {
        type_name: &'static str,
        reason: String,
    },

    #[error("Failed to deserialize value of type '{type_name}': {reason}")]
    DeserializationFailed { type_name: String, reason: String },

    #[error("Unknown type descriptor: {0}")]
    UnknownType(String),

    #[error("Malformed record identifier '{0}'")]
    MalformedIdentifier(String),
}

impl CodecError {
    pub(crate) fn serialization(type_name: &'static str, reason: impl ToString) -> Self {
        CodecError::SerializationFailed {
            type_name,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn deserialization(type_name: impl Into<String>, reason: impl ToString) -> Self {
        CodecError::DeserializationFailed {
            type_name: type_name.into(),
            reason: reason.to_string(),
        }
    }
}

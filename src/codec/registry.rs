//! Type descriptor registry
//!
//! A table's `type` attribute is a descriptor string. At load time the
//! registry resolves it back to the structural type that decodes the
//! table's payloads.

use std::collections::HashMap;

use serde_json::Value;

use super::errors::{CodecError, CodecResult};
use super::json::PayloadCodec;
use crate::errors::{DbError, DbResult};
use crate::record::{ErasedPayload, RecordType, TypeTag};

type RestoreFn = fn(Value) -> Result<Box<dyn ErasedPayload>, serde_json::Error>;

fn restore_structural<T: RecordType>(value: Value) -> Result<Box<dyn ErasedPayload>, serde_json::Error> {
    let typed: T = serde_json::from_value(value)?;
    Ok(Box::new(typed))
}

/// Decoding entry point for one registered structural type
#[derive(Clone, Copy)]
pub struct TypeBinding {
    tag: TypeTag,
    restore: RestoreFn,
}

impl TypeBinding {
    fn of<T: RecordType>() -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            restore: restore_structural::<T>,
        }
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Decodes one payload through the codec into an erased value of this type.
    pub fn decode(&self, codec: &dyn PayloadCodec, bytes: &[u8]) -> CodecResult<Box<dyn ErasedPayload>> {
        let structural = codec.decode(self.tag.name(), bytes)?;
        (self.restore)(structural).map_err(|e| CodecError::deserialization(self.tag.name(), e))
    }
}

impl std::fmt::Debug for TypeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeBinding").field("tag", &self.tag).finish()
    }
}

/// Registry of structural types known to a document
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    bindings: HashMap<&'static str, TypeBinding>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under its descriptor.
    ///
    /// Registering the same type twice is a no-op. Registering a different
    /// type under an existing descriptor is a conflict.
    pub fn register<T: RecordType>(&mut self) -> DbResult<()> {
        let binding = TypeBinding::of::<T>();
        match self.bindings.get(T::TYPE_NAME) {
            Some(existing) if existing.tag == binding.tag => Ok(()),
            Some(_) => Err(DbError::type_descriptor_conflict(T::TYPE_NAME)),
            None => {
                self.bindings.insert(T::TYPE_NAME, binding);
                Ok(())
            }
        }
    }

    /// Builder form of [`TypeRegistry::register`]
    pub fn with<T: RecordType>(mut self) -> DbResult<Self> {
        self.register::<T>()?;
        Ok(self)
    }

    /// Resolves a persisted descriptor to its binding.
    pub fn resolve(&self, descriptor: &str) -> CodecResult<&TypeBinding> {
        self.bindings
            .get(descriptor)
            .ok_or_else(|| CodecError::UnknownType(descriptor.to_string()))
    }

    pub fn contains(&self, descriptor: &str) -> bool {
        self.bindings.contains_key(descriptor)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

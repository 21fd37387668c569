//! Structural types and erased payloads
//!
//! A table stores payloads of many different Rust types side by side, so
//! each payload is held behind [`ErasedPayload`], which remembers its
//! [`TypeTag`] and can be turned back into the concrete type through a
//! checked downcast.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codec::{CodecError, CodecResult};

/// A type that can be stored as the payload of a table's records.
///
/// `TYPE_NAME` is persisted as the table's type descriptor, so it must stay
/// stable across releases.
///
/// ```ignore
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Contact { title: String, email: Option<String> }
///
/// impl RecordType for Contact {
///     const TYPE_NAME: &'static str = "Contact";
/// }
/// ```
pub trait RecordType: Serialize + DeserializeOwned + Clone + fmt::Debug + 'static {
    const TYPE_NAME: &'static str;
}

/// Runtime identity of a structural type.
///
/// Equality is decided by `TypeId`; the name is only for descriptors and
/// messages.
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    name: &'static str,
    id: TypeId,
}

impl TypeTag {
    pub fn of<T: RecordType>() -> Self {
        Self {
            name: T::TYPE_NAME,
            id: TypeId::of::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: RecordType>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A payload whose concrete type is tracked only as metadata.
pub trait ErasedPayload: Any + fmt::Debug {
    fn type_tag(&self) -> TypeTag;

    /// Structural form handed to the codec
    fn to_structural(&self) -> CodecResult<Value>;

    /// Checks that `value` restores as this payload's type.
    ///
    /// Serde maps some values, such as non-finite floats, to a structural
    /// form that does not decode back.
    fn verify_structural(&self, value: Value) -> CodecResult<()>;

    fn clone_payload(&self) -> Box<dyn ErasedPayload>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: RecordType> ErasedPayload for T {
    fn type_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn to_structural(&self) -> CodecResult<Value> {
        serde_json::to_value(self).map_err(|e| CodecError::serialization(T::TYPE_NAME, e))
    }

    fn verify_structural(&self, value: Value) -> CodecResult<()> {
        serde_json::from_value::<T>(value)
            .map(|_| ())
            .map_err(|e| CodecError::serialization(T::TYPE_NAME, format!("value does not decode back: {}", e)))
    }

    fn clone_payload(&self) -> Box<dyn ErasedPayload> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl Clone for Box<dyn ErasedPayload> {
    fn clone(&self) -> Self {
        self.clone_payload()
    }
}

//! Identity-bearing records
//!
//! A record owns one payload plus its identifier and a dirty flag. The
//! same struct serves both forms: `Record<T>` for typed access and
//! [`ErasedRecord`] for storage inside a table.

use super::id::RecordId;
use super::payload::{ErasedPayload, RecordType, TypeTag};
use crate::errors::{DbError, DbResult};

/// A record as stored in a table, payload type tracked only at runtime
pub type ErasedRecord = Record<Box<dyn ErasedPayload>>;

#[derive(Debug, Clone)]
pub struct Record<T> {
    identifier: RecordId,
    payload: T,
    dirty: bool,
}

impl<T> Record<T> {
    /// Creates a record for a value the caller is adding.
    ///
    /// The identifier is freshly generated and the record starts dirty.
    pub fn create_new(payload: T) -> Self {
        Self {
            identifier: RecordId::new(),
            payload,
            dirty: true,
        }
    }

    /// Creates a record decoded from the encoded form.
    ///
    /// # Errors
    ///
    /// Returns a decode error if `identifier` is not a valid identifier.
    pub fn create_from_storage(payload: T, identifier: &str) -> DbResult<Self> {
        let identifier: RecordId = identifier.parse()?;
        Ok(Self::with_identifier(payload, identifier))
    }

    /// Creates a clean record with an already parsed identifier
    pub fn with_identifier(payload: T, identifier: RecordId) -> Self {
        Self {
            identifier,
            payload,
            dirty: false,
        }
    }

    pub fn identifier(&self) -> RecordId {
        self.identifier
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    /// True when the record has changes not yet written to storage
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replaces the payload and marks the record dirty.
    pub fn set_payload(&mut self, payload: T) {
        self.payload = payload;
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn map_payload<U>(self, f: impl FnOnce(T) -> U) -> Record<U> {
        Record {
            identifier: self.identifier,
            payload: f(self.payload),
            dirty: self.dirty,
        }
    }
}

impl<T: RecordType> Record<T> {
    /// Degrades the record to its erased form, keeping identifier and dirty flag.
    pub fn erase(self) -> ErasedRecord {
        self.map_payload(|payload| Box::new(payload) as Box<dyn ErasedPayload>)
    }
}

impl ErasedRecord {
    pub fn type_tag(&self) -> TypeTag {
        self.payload.type_tag()
    }

    /// The erased payload as a trait object
    pub fn value(&self) -> &dyn ErasedPayload {
        self.payload.as_ref()
    }

    /// Borrows the payload as `T` if that is its runtime type.
    pub fn downcast_ref<T: RecordType>(&self) -> Option<&T> {
        self.payload.as_any().downcast_ref::<T>()
    }

    /// Converts back to the typed form.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the payload is not a `T`.
    pub fn restore<T: RecordType>(self) -> DbResult<Record<T>> {
        let actual = self.type_tag();
        if !actual.is::<T>() {
            return Err(DbError::type_mismatch(T::TYPE_NAME, actual.name()));
        }
        let Record {
            identifier,
            payload,
            dirty,
        } = self;
        match payload.into_any().downcast::<T>() {
            Ok(typed) => Ok(Record {
                identifier,
                payload: *typed,
                dirty,
            }),
            Err(_) => Err(DbError::type_mismatch(T::TYPE_NAME, actual.name())),
        }
    }

    /// Typed copy of this record, leaving the erased record in place.
    pub fn restore_cloned<T: RecordType>(&self) -> DbResult<Record<T>> {
        let typed = self
            .downcast_ref::<T>()
            .ok_or_else(|| DbError::type_mismatch(T::TYPE_NAME, self.type_tag().name()))?;
        Ok(Record {
            identifier: self.identifier,
            payload: typed.clone(),
            dirty: self.dirty,
        })
    }
}

//! Type-erased tables
//!
//! The erased table is the single source of truth for a table's records.
//! Typed views project to and from it on every access.

use crate::codec::{CodecError, EncodedRecord, EncodedTable, PayloadCodec, TypeRegistry};
use crate::errors::{DbError, DbResult};
use crate::record::{ErasedPayload, ErasedRecord, Record, RecordId, RecordType, TypeTag};

/// A named table whose records all share one structural type.
#[derive(Debug, Clone)]
pub struct ErasedTable {
    name: String,
    tag: TypeTag,
    records: Vec<ErasedRecord>,
    pending: bool,
}

impl ErasedTable {
    /// Creates an empty table.
    ///
    /// A fresh table has never been written, so it starts pending.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `name` is blank.
    pub fn create(name: impl Into<String>, tag: TypeTag) -> DbResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DbError::validation("Table name must not be blank"));
        }
        Ok(Self {
            name,
            tag,
            records: Vec::new(),
            pending: true,
        })
    }

    /// Creates an empty table for `T`
    pub fn create_for<T: RecordType>(name: impl Into<String>) -> DbResult<Self> {
        Self::create(name, TypeTag::of::<T>())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order
    pub fn records(&self) -> &[ErasedRecord] {
        &self.records
    }

    pub fn get(&self, identifier: RecordId) -> Option<&ErasedRecord> {
        self.records.iter().find(|r| r.identifier() == identifier)
    }

    pub fn contains(&self, identifier: RecordId) -> bool {
        self.get(identifier).is_some()
    }

    fn position(&self, identifier: RecordId) -> DbResult<usize> {
        self.records
            .iter()
            .position(|r| r.identifier() == identifier)
            .ok_or_else(|| DbError::record_not_found(&self.name, identifier))
    }

    fn check_type(&self, value: &dyn ErasedPayload) -> DbResult<()> {
        let actual = value.type_tag();
        if actual != self.tag {
            return Err(DbError::type_mismatch(self.tag.name(), actual.name()));
        }
        Ok(())
    }

    /// Appends a new record holding `value`.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if `value` is not of the table's type.
    pub fn add(&mut self, value: Box<dyn ErasedPayload>) -> DbResult<RecordId> {
        self.check_type(value.as_ref())?;
        let record = Record::create_new(value);
        let identifier = record.identifier();
        self.records.push(record);
        self.pending = true;
        Ok(identifier)
    }

    /// Appends an existing record, keeping its identifier.
    pub fn push_record(&mut self, record: ErasedRecord) -> DbResult<()> {
        self.check_type(record.value())?;
        if self.contains(record.identifier()) {
            return Err(DbError::decode(format!(
                "Duplicate record identifier '{}'",
                record.identifier()
            ))
            .with_details(format!("table: {}", self.name)));
        }
        self.records.push(record);
        self.pending = true;
        Ok(())
    }

    /// Removes the record carrying `identifier`.
    ///
    /// # Errors
    ///
    /// Returns not-found if no record carries that identifier.
    pub fn remove(&mut self, identifier: RecordId) -> DbResult<ErasedRecord> {
        let index = self.position(identifier)?;
        self.pending = true;
        Ok(self.records.remove(index))
    }

    /// Replaces the payload of an existing record, marking it dirty.
    pub fn update(&mut self, identifier: RecordId, value: Box<dyn ErasedPayload>) -> DbResult<()> {
        self.check_type(value.as_ref())?;
        let index = self.position(identifier)?;
        self.records[index].set_payload(value);
        Ok(())
    }

    /// Removes every record
    pub fn clear(&mut self) {
        if !self.records.is_empty() {
            self.records.clear();
            self.pending = true;
        }
    }

    /// Payload values in insertion order.
    ///
    /// The iterator is lazy and can be restarted by cloning it or calling
    /// this again.
    pub fn enumerate(&self) -> impl Iterator<Item = &dyn ErasedPayload> + Clone + '_ {
        self.records.iter().map(|r| r.value())
    }

    /// True when the table has changes not yet written to storage
    pub fn is_pending(&self) -> bool {
        self.pending || self.records.iter().any(|r| r.is_dirty())
    }

    pub fn mark_pending(&mut self) {
        self.pending = true;
    }

    /// Called once the table's encoded form is durable.
    pub(crate) fn clear_pending(&mut self) {
        self.pending = false;
        for record in &mut self.records {
            record.mark_clean();
        }
    }

    /// Encodes every record through the codec.
    ///
    /// Each encoded payload is decoded back before it is accepted, so a
    /// value that would not survive a load fails here as an encode error.
    pub fn to_encoded_form(&self, codec: &dyn PayloadCodec) -> DbResult<EncodedTable> {
        let mut records = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let context = || format!("table: {}, record: {}", self.name, record.identifier());
            let structural = record
                .value()
                .to_structural()
                .map_err(|e| DbError::from(e).with_details(context()))?;
            let bytes = codec
                .encode(self.tag.name(), &structural)
                .map_err(|e| DbError::from(e).with_details(context()))?;
            codec
                .decode(self.tag.name(), &bytes)
                .map_err(|e| CodecError::serialization(self.tag.name(), e))
                .and_then(|decoded| record.value().verify_structural(decoded))
                .map_err(|e| DbError::from(e).with_details(context()))?;
            let value = String::from_utf8(bytes).map_err(|_| {
                DbError::encode(format!("Codec '{}' produced non UTF-8 output", codec.name()))
                    .with_details(context())
            })?;
            records.push(EncodedRecord {
                identifier: record.identifier().to_string(),
                value,
            });
        }

        Ok(EncodedTable {
            name: self.name.clone(),
            type_name: self.tag.name().to_string(),
            records,
        })
    }

    /// Rebuilds a table from its encoded form.
    ///
    /// Any failing record aborts the whole table; a table is never returned
    /// with records silently dropped.
    pub fn from_encoded_form(
        encoded: &EncodedTable,
        registry: &TypeRegistry,
        codec: &dyn PayloadCodec,
    ) -> DbResult<Self> {
        let binding = registry
            .resolve(&encoded.type_name)
            .map_err(|e| DbError::from(e).with_details(format!("table: {}", encoded.name)))?;

        let mut table = Self::create(encoded.name.clone(), binding.tag())
            .map_err(|e| DbError::decode(e.message().to_string()))?;

        for (index, entry) in encoded.records.iter().enumerate() {
            let context = || format!("table: {}, record: {}", encoded.name, index);
            let payload = binding
                .decode(codec, entry.value.as_bytes())
                .map_err(|e| DbError::from(e).with_details(context()))?;
            let record = Record::create_from_storage(payload, &entry.identifier)
                .map_err(|e| e.with_details(context()))?;
            table.push_record(record)?;
        }

        table.clear_pending();
        Ok(table)
    }
}

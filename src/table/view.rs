//! Typed table views
//!
//! A view is a statically typed facade bound to one erased table. It holds
//! no records of its own: every read converts from the erased table and
//! every write erases into it, so a view always reflects the table's live
//! state. Borrowing guarantees no view outlives a mutation made elsewhere.

use std::marker::PhantomData;

use crate::errors::{DbError, DbResult};
use crate::record::{ErasedRecord, Record, RecordId, RecordType};

use super::erased::ErasedTable;

fn check_binding<T: RecordType>(table: &ErasedTable) -> DbResult<()> {
    let tag = table.type_tag();
    if !tag.is::<T>() {
        return Err(DbError::type_mismatch(T::TYPE_NAME, tag.name())
            .with_details(format!("table: {}", table.name())));
    }
    Ok(())
}

/// Read-only typed view over an erased table
#[derive(Debug)]
pub struct TableView<'a, T> {
    table: &'a ErasedTable,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for TableView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TableView<'_, T> {}

impl<'a, T: RecordType> TableView<'a, T> {
    /// Binds to `table`.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the table is declared for another type.
    pub fn bind(table: &'a ErasedTable) -> DbResult<Self> {
        check_binding::<T>(table)?;
        Ok(Self {
            table,
            _marker: PhantomData,
        })
    }

    pub fn name(&self) -> &'a str {
        self.table.name()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn contains(&self, identifier: RecordId) -> bool {
        self.table.contains(identifier)
    }

    pub fn is_pending(&self) -> bool {
        self.table.is_pending()
    }

    /// Converts every erased record to a typed record.
    ///
    /// Nothing is cached; each call reflects the table as it is now.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if a record fails to restore as `T`.
    pub fn records(&self) -> DbResult<Vec<Record<T>>> {
        self.table
            .records()
            .iter()
            .map(|r| r.restore_cloned::<T>())
            .collect()
    }

    /// Typed copy of the record carrying `identifier`, if any
    pub fn get(&self, identifier: RecordId) -> DbResult<Option<Record<T>>> {
        self.table
            .get(identifier)
            .map(|r| r.restore_cloned::<T>())
            .transpose()
    }

    /// Typed payload values in insertion order
    pub fn enumerate(&self) -> Values<'a, T> {
        Values {
            inner: self.table.records().iter(),
            _marker: PhantomData,
        }
    }

    /// Records whose payload satisfies `predicate` (linear scan)
    pub fn find<P>(&self, mut predicate: P) -> DbResult<Vec<Record<T>>>
    where
        P: FnMut(&T) -> bool,
    {
        let mut found = Vec::new();
        for record in self.table.records() {
            let typed = record.restore_cloned::<T>()?;
            if predicate(typed.payload()) {
                found.push(typed);
            }
        }
        Ok(found)
    }
}

impl<'a, T: RecordType> IntoIterator for TableView<'a, T> {
    type Item = &'a T;
    type IntoIter = Values<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.enumerate()
    }
}

/// Mutable typed view over an erased table
#[derive(Debug)]
pub struct TableViewMut<'a, T> {
    table: &'a mut ErasedTable,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: RecordType> TableViewMut<'a, T> {
    /// Binds to `table`.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the table is declared for another type.
    pub fn bind(table: &'a mut ErasedTable) -> DbResult<Self> {
        check_binding::<T>(table)?;
        Ok(Self {
            table,
            _marker: PhantomData,
        })
    }

    /// Read-only view of the same table
    pub fn as_view(&self) -> TableView<'_, T> {
        TableView {
            table: &*self.table,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn records(&self) -> DbResult<Vec<Record<T>>> {
        self.as_view().records()
    }

    pub fn get(&self, identifier: RecordId) -> DbResult<Option<Record<T>>> {
        self.as_view().get(identifier)
    }

    pub fn enumerate(&self) -> Values<'_, T> {
        self.as_view().enumerate()
    }

    /// Erases `value` into a new record on the bound table.
    pub fn add(&mut self, value: T) -> DbResult<RecordId> {
        self.table.add(Box::new(value))
    }

    /// Removes a record and hands back its typed form.
    pub fn remove(&mut self, identifier: RecordId) -> DbResult<Record<T>> {
        self.table.remove(identifier)?.restore::<T>()
    }

    /// Replaces a record's payload in place.
    pub fn update(&mut self, identifier: RecordId, value: T) -> DbResult<()> {
        self.table.update(identifier, Box::new(value))
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn mark_pending(&mut self) {
        self.table.mark_pending();
    }
}

/// Iterator over the typed payloads of a table.
///
/// Cloning it restarts enumeration from the same position.
pub struct Values<'a, T> {
    inner: std::slice::Iter<'a, ErasedRecord>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Values<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<'a, T: RecordType> Iterator for Values<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        // binding already checked the table type, so every payload downcasts
        self.inner.by_ref().find_map(|r| r.downcast_ref::<T>())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.inner.len()))
    }
}

//! The polymorphic database handle: a type-erased, trivially-copyable
//! reference to a concrete backend, dispatched through the [`KvBackend`]
//! trait object's vtable.
//!
//! A mis-signed method on a concrete backend is a compile error, since the
//! unsized coercion `&T as &dyn KvBackend` only type-checks when every
//! method on `T` matches the trait exactly — this is the "vtable synthesized
//! once per T, mis-signed entries become compile errors" contract realized
//! without a hand-rolled function-pointer table.

use std::fmt;

use crate::column::ColumnName;
use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::metrics::DbMetric;
use crate::value::{BorrowedValue, Entry};

/// The typed operations a concrete storage backend must provide. Object-safe
/// by construction, so `&dyn KvBackend` is the type-erased vtable pointer.
pub trait KvBackend: fmt::Debug + Send + Sync {
    fn get(&self, key: &[u8], flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError>;

    /// `value = None` means delete; this lets a single vtable entry cover
    /// both "put" and "absent-means-delete" without a separate dispatch.
    fn put(&self, key: &[u8], value: Option<&[u8]>, flags: WriteFlags) -> Result<(), StoreError>;

    fn delete(&self, key: &[u8], flags: WriteFlags) -> Result<(), StoreError>;

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError>;

    fn iterator(&self, ordered: bool) -> Result<DbIterator, StoreError>;

    fn snapshot(&self) -> Result<DbSnapshot, StoreError>;

    fn flush(&self, wait: bool) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;

    fn compact(&self) -> Result<(), StoreError>;

    fn gather_metric(&self) -> DbMetric;

    fn name(&self) -> ColumnName;
}

/// A non-owning, trivially-copyable reference to a concrete backend. Never
/// outlives the backend it points at — enforced by the `'a` lifetime rather
/// than by a runtime discipline.
#[derive(Clone, Copy)]
pub struct Database<'a> {
    backend: &'a dyn KvBackend,
}

impl<'a> Database<'a> {
    pub fn new(backend: &'a dyn KvBackend) -> Self {
        Database { backend }
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<BorrowedValue>, StoreError> {
        self.get_with_flags(key, ReadFlags::NONE)
    }

    pub fn get_with_flags(
        &self,
        key: &[u8],
        flags: ReadFlags,
    ) -> Result<Option<BorrowedValue>, StoreError> {
        self.backend.get(key, flags)
    }

    pub fn put(&self, key: &[u8], value: Option<&[u8]>) -> Result<(), StoreError> {
        self.put_with_flags(key, value, WriteFlags::NONE)
    }

    pub fn put_with_flags(
        &self,
        key: &[u8],
        value: Option<&[u8]>,
        flags: WriteFlags,
    ) -> Result<(), StoreError> {
        self.backend.put(key, value, flags)
    }

    pub fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.delete_with_flags(key, WriteFlags::NONE)
    }

    pub fn delete_with_flags(&self, key: &[u8], flags: WriteFlags) -> Result<(), StoreError> {
        self.backend.delete(key, flags)
    }

    pub fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.backend.contains(key)
    }

    pub fn iterator(&self, ordered: bool) -> Result<DbIterator, StoreError> {
        self.backend.iterator(ordered)
    }

    pub fn snapshot(&self) -> Result<DbSnapshot, StoreError> {
        self.backend.snapshot()
    }

    pub fn flush(&self, wait: bool) -> Result<(), StoreError> {
        self.backend.flush(wait)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.clear()
    }

    pub fn compact(&self) -> Result<(), StoreError> {
        self.backend.compact()
    }

    pub fn gather_metric(&self) -> DbMetric {
        self.backend.gather_metric()
    }

    pub fn name(&self) -> ColumnName {
        self.backend.name()
    }
}

/// A type-erased cursor over entries in backend-defined order. Abandoning it
/// early still runs backend cleanup, since dropping the box runs the
/// wrapped iterator's own `Drop` impl exactly once.
pub struct DbIterator {
    inner: Box<dyn Iterator<Item = Result<Entry, StoreError>> + Send>,
}

impl DbIterator {
    pub fn new(inner: impl Iterator<Item = Result<Entry, StoreError>> + Send + 'static) -> Self {
        DbIterator {
            inner: Box::new(inner),
        }
    }

    pub fn empty() -> Self {
        DbIterator::new(std::iter::empty())
    }
}

impl Iterator for DbIterator {
    type Item = Result<Entry, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// The operations a point-in-time read view must provide.
pub trait SnapshotBackend: Send + Sync {
    fn get(&self, key: &[u8], flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError>;

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError>;

    fn iterator(&self, ordered: bool) -> Result<DbIterator, StoreError>;
}

/// A type-erased point-in-time read view. Observations are stable from
/// creation until this value is dropped, regardless of concurrent writes to
/// the backend it was taken from.
pub struct DbSnapshot {
    inner: Box<dyn SnapshotBackend>,
}

impl DbSnapshot {
    pub fn new(inner: impl SnapshotBackend + 'static) -> Self {
        DbSnapshot {
            inner: Box::new(inner),
        }
    }

    pub fn get(&self, key: &[u8], flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError> {
        self.inner.get(key, flags)
    }

    pub fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.inner.contains(key)
    }

    pub fn iterator(&self, ordered: bool) -> Result<DbIterator, StoreError> {
        self.inner.iterator(ordered)
    }
}

impl fmt::Debug for DbSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSnapshot").finish_non_exhaustive()
    }
}

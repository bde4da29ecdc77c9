//! The null-object backend: every read reports absence, every write is a
//! silent no-op. Holds zero bytes, so it can be declared as an immutable
//! `static` sentinel — the "const sentinel" design note realized directly.

use crate::column::ColumnName;
use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::handle::{DbIterator, DbSnapshot, KvBackend, SnapshotBackend};
use crate::metrics::DbMetric;
use crate::value::BorrowedValue;

/// A stateless, zero-sized backend that discards every write and answers
/// every read with absence. Writes succeed silently by design: a true null
/// object must not break callers that never check whether storage is wired
/// up, unlike an earlier variant of this backend that errored on writes.
#[derive(Debug, Clone, Copy)]
pub struct NullBackend {
    name: ColumnName,
}

impl NullBackend {
    pub const fn new(name: ColumnName) -> Self {
        NullBackend { name }
    }
}

/// A zero-sized, immutable singleton bound to the metadata column, for
/// callers that just need "a `Database`" without caring which column.
pub static NULL_BACKEND: NullBackend = NullBackend::new(ColumnName::Metadata);

impl KvBackend for NullBackend {
    fn get(&self, _key: &[u8], _flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError> {
        Ok(None)
    }

    fn put(
        &self,
        _key: &[u8],
        _value: Option<&[u8]>,
        _flags: WriteFlags,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn delete(&self, _key: &[u8], _flags: WriteFlags) -> Result<(), StoreError> {
        Ok(())
    }

    fn contains(&self, _key: &[u8]) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn iterator(&self, _ordered: bool) -> Result<DbIterator, StoreError> {
        Ok(DbIterator::empty())
    }

    fn snapshot(&self) -> Result<DbSnapshot, StoreError> {
        Ok(DbSnapshot::new(NullSnapshot))
    }

    fn flush(&self, _wait: bool) -> Result<(), StoreError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn compact(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn gather_metric(&self) -> DbMetric {
        DbMetric::default()
    }

    fn name(&self) -> ColumnName {
        self.name
    }
}

struct NullSnapshot;

impl SnapshotBackend for NullSnapshot {
    fn get(&self, _key: &[u8], _flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError> {
        Ok(None)
    }

    fn contains(&self, _key: &[u8]) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn iterator(&self, _ordered: bool) -> Result<DbIterator, StoreError> {
        Ok(DbIterator::empty())
    }
}

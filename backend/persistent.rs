//! Adapter for the embedded persistent engine. This is an interface
//! contract, not an implementation: until a real engine is wired in behind
//! the same [`KvBackend`] impl, every operation returns `StorageFailure` so
//! that higher layers compile and test against the adapter's shape (spec
//! §4.4, Open Question 1 in DESIGN.md).

use std::path::PathBuf;

use tracing::error;

use crate::column::ColumnName;
use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::handle::{DbIterator, DbSnapshot, KvBackend};
use crate::metrics::DbMetric;
use crate::settings::Settings;
use crate::value::BorrowedValue;

/// Opens (at construction) and closes (on drop) the underlying engine.
/// Every operation forwards to the engine; until the engine exists, that
/// forwarding point is simply "return `StorageFailure`".
#[derive(Debug)]
pub struct PersistentBackend {
    name: ColumnName,
    path: PathBuf,
}

impl PersistentBackend {
    /// Opens the backend for the column and path named in `settings`.
    ///
    /// `settings.delete_on_start` and `settings.can_delete_folder` are
    /// accepted and validated here so the real engine only has to honor
    /// them, not re-derive them; this stub does not touch the filesystem.
    pub fn open(settings: &Settings) -> Result<Self, StoreError> {
        if settings.delete_on_start && !settings.can_delete_folder {
            return Err(StoreError::storage_failure(
                "delete_on_start requested but can_delete_folder is false",
            ));
        }
        Ok(PersistentBackend {
            name: settings.name,
            path: settings.path.clone(),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn unimplemented(&self, op: &'static str) -> StoreError {
        error!(
            column = ?self.name,
            path = %self.path.display(),
            operation = op,
            "persistent engine adapter is a stub; wire in a real engine"
        );
        StoreError::storage_failure(format!(
            "persistent engine not implemented (column {:?}, op {op})",
            self.name
        ))
    }
}

impl KvBackend for PersistentBackend {
    fn get(&self, _key: &[u8], _flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError> {
        Err(self.unimplemented("get"))
    }

    fn put(&self, _key: &[u8], _value: Option<&[u8]>, _flags: WriteFlags) -> Result<(), StoreError> {
        Err(self.unimplemented("put"))
    }

    fn delete(&self, _key: &[u8], _flags: WriteFlags) -> Result<(), StoreError> {
        Err(self.unimplemented("delete"))
    }

    fn contains(&self, _key: &[u8]) -> Result<bool, StoreError> {
        Err(self.unimplemented("contains"))
    }

    fn iterator(&self, _ordered: bool) -> Result<DbIterator, StoreError> {
        Err(self.unimplemented("iterator"))
    }

    fn snapshot(&self) -> Result<DbSnapshot, StoreError> {
        Err(self.unimplemented("snapshot"))
    }

    fn flush(&self, _wait: bool) -> Result<(), StoreError> {
        Err(self.unimplemented("flush"))
    }

    fn clear(&self) -> Result<(), StoreError> {
        Err(self.unimplemented("clear"))
    }

    fn compact(&self) -> Result<(), StoreError> {
        Err(self.unimplemented("compact"))
    }

    fn gather_metric(&self) -> DbMetric {
        DbMetric::default()
    }

    fn name(&self) -> ColumnName {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_surfaces_storage_failure() {
        let settings = Settings::new(ColumnName::State, "/tmp/does-not-matter");
        let backend = PersistentBackend::open(&settings).unwrap();

        assert!(backend.get(b"k", ReadFlags::NONE).is_err());
        assert!(backend.put(b"k", Some(b"v"), WriteFlags::NONE).is_err());
        assert!(backend.delete(b"k", WriteFlags::NONE).is_err());
        assert!(backend.contains(b"k").is_err());
        assert!(backend.iterator(true).is_err());
        assert!(backend.snapshot().is_err());
        assert!(backend.flush(true).is_err());
        assert!(backend.clear().is_err());
        assert!(backend.compact().is_err());
    }

    #[test]
    fn rejects_delete_on_start_without_can_delete_folder() {
        let settings = Settings::new(ColumnName::State, "/tmp/does-not-matter")
            .with_delete_on_start(true)
            .with_can_delete_folder(false);
        assert!(PersistentBackend::open(&settings).is_err());
    }
}

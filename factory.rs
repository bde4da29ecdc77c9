//! Factories: given [`Settings`], produce an owned, ready-to-use handle
//! (spec §4.10). Where [`crate::handle::Database`] borrows a backend someone
//! else owns, a [`Factory`] is the thing that owns it — the boundary where a
//! column's storage actually gets opened, and where it gets torn down.

use std::fmt;
use std::path::PathBuf;

use crate::backend::memory::MemoryBackend;
use crate::backend::null::NullBackend;
use crate::backend::persistent::PersistentBackend;
use crate::backend::read_only::OverlayState;
use crate::column::{ColumnEnum, ColumnName};
use crate::columns::ColumnGroup;
use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::handle::{Database, DbIterator, DbSnapshot, KvBackend, SnapshotBackend};
use crate::metrics::DbMetric;
use crate::provider::ReadOnlyMode;
use crate::settings::Settings;
use crate::value::BorrowedValue;

/// An owned backend plus the handle borrowed from it. Dropping this value
/// drops the backend, running whatever teardown its `Drop` impl performs;
/// there is no separate "close" call to remember.
pub struct OwnedHandle {
    inner: Box<dyn KvBackend>,
}

impl OwnedHandle {
    pub fn new(inner: Box<dyn KvBackend>) -> Self {
        OwnedHandle { inner }
    }

    pub fn handle(&self) -> Database<'_> {
        Database::new(self.inner.as_ref())
    }
}

impl fmt::Debug for OwnedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedHandle").field("inner", &self.inner).finish()
    }
}

/// Opens a column's backend for a given [`Settings`] value, and knows where
/// on disk (if anywhere) that column's data would live.
pub trait Factory: fmt::Debug {
    fn create_db(&self, settings: &Settings) -> Result<OwnedHandle, StoreError>;

    fn get_full_db_path(&self, settings: &Settings) -> PathBuf;

    /// Releases any factory-wide resources. Most factories have none; the
    /// default is a no-op.
    fn deinit(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Produces [`MemoryBackend`] handles. `delete_on_start` is honored
/// trivially, since a freshly created in-memory backend starts empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryFactory;

impl Factory for MemoryFactory {
    fn create_db(&self, settings: &Settings) -> Result<OwnedHandle, StoreError> {
        Ok(OwnedHandle::new(Box::new(MemoryBackend::new(settings.name))))
    }

    fn get_full_db_path(&self, settings: &Settings) -> PathBuf {
        settings.path.join(settings.name.wire_name())
    }
}

/// Produces [`NullBackend`] handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFactory;

impl Factory for NullFactory {
    fn create_db(&self, settings: &Settings) -> Result<OwnedHandle, StoreError> {
        Ok(OwnedHandle::new(Box::new(NullBackend::new(settings.name))))
    }

    fn get_full_db_path(&self, settings: &Settings) -> PathBuf {
        settings.path.join(settings.name.wire_name())
    }
}

/// Produces [`PersistentBackend`] handles — the stub adapter described in
/// `backend/persistent.rs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PersistentFactory;

impl Factory for PersistentFactory {
    fn create_db(&self, settings: &Settings) -> Result<OwnedHandle, StoreError> {
        Ok(OwnedHandle::new(Box::new(PersistentBackend::open(settings)?)))
    }

    fn get_full_db_path(&self, settings: &Settings) -> PathBuf {
        settings.path.join(settings.name.wire_name())
    }
}

/// Owns one factory-produced backend per `E` variant, and hands out the
/// non-owning [`ColumnGroup`] view over them. The owning counterpart to
/// [`crate::columns::InMemoryColumnGroup`], for handles opened through a
/// [`Factory`] rather than constructed directly.
pub struct OwnedColumnGroup<E> {
    handles: Box<[OwnedHandle]>,
    _marker: std::marker::PhantomData<E>,
}

impl<E: ColumnEnum> OwnedColumnGroup<E> {
    fn new(handles: Vec<OwnedHandle>) -> Self {
        assert_eq!(
            handles.len(),
            E::VARIANTS.len(),
            "owned column group must supply exactly one handle per variant"
        );
        OwnedColumnGroup {
            handles: handles.into_boxed_slice(),
            _marker: std::marker::PhantomData,
        }
    }

    /// The non-owning view over these handles, for issuing reads, writes,
    /// batches, and snapshots.
    pub fn columns_db(&self) -> ColumnGroup<'_, E> {
        ColumnGroup::new(self.handles.iter().map(OwnedHandle::handle).collect())
    }
}

/// Generic, compile-time-dispatched column-group production. Kept separate
/// from the object-safe [`Factory`] trait: `E` isn't erased the way backend
/// operations are, so a caller must know `E` at the call site to build one,
/// and `&dyn Factory` alone can't offer this method.
pub trait ColumnGroupFactory<E: ColumnEnum>: Factory {
    fn create_column_group_db(&self, base: &Settings) -> Result<OwnedColumnGroup<E>, StoreError>;
}

/// Builds a column group over [`ColumnName`] itself: one in-memory backend
/// per logical column, each opened from `base` renamed via
/// [`Settings::with_name`] to that column — the natural way to open every
/// column a [`crate::provider::Provider`] would otherwise need registered
/// one at a time.
impl ColumnGroupFactory<ColumnName> for MemoryFactory {
    fn create_column_group_db(&self, base: &Settings) -> Result<OwnedColumnGroup<ColumnName>, StoreError> {
        let mut handles = Vec::with_capacity(ColumnName::VARIANTS.len());
        for variant in ColumnName::VARIANTS {
            handles.push(self.create_db(&base.with_name(variant))?);
        }
        Ok(OwnedColumnGroup::new(handles))
    }
}

/// Wraps another factory so every handle it produces is read-only, in
/// either mode. Unlike [`crate::backend::read_only::ReadOnlyWrapper`], which
/// borrows its base, this owns the base outright — a factory product has no
/// ambient lifetime to borrow against.
#[derive(Debug)]
pub struct ReadOnlyFactory<F> {
    inner: F,
    mode: ReadOnlyMode,
}

impl<F: Factory> ReadOnlyFactory<F> {
    pub fn new(inner: F, mode: ReadOnlyMode) -> Self {
        ReadOnlyFactory { inner, mode }
    }
}

impl<F: Factory> Factory for ReadOnlyFactory<F> {
    fn create_db(&self, settings: &Settings) -> Result<OwnedHandle, StoreError> {
        let base = self.inner.create_db(settings)?;
        let backend = OwnedReadOnlyBackend::new(base, settings.name, self.mode);
        Ok(OwnedHandle::new(Box::new(backend)))
    }

    fn get_full_db_path(&self, settings: &Settings) -> PathBuf {
        self.inner.get_full_db_path(settings)
    }

    fn deinit(&self) -> Result<(), StoreError> {
        self.inner.deinit()
    }
}

/// The owned-base counterpart to [`crate::backend::read_only::ReadOnlyWrapper`]:
/// same strict/overlay semantics, but `base` is a box this value owns rather
/// than a borrowed [`Database`].
struct OwnedReadOnlyBackend {
    base: OwnedHandle,
    name: ColumnName,
    overlay: Option<OverlayState>,
}

impl fmt::Debug for OwnedReadOnlyBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedReadOnlyBackend")
            .field("name", &self.name)
            .field("is_overlay", &self.overlay.is_some())
            .finish()
    }
}

impl OwnedReadOnlyBackend {
    fn new(base: OwnedHandle, name: ColumnName, mode: ReadOnlyMode) -> Self {
        OwnedReadOnlyBackend {
            base,
            name,
            overlay: match mode {
                ReadOnlyMode::Strict => None,
                ReadOnlyMode::Overlay => Some(OverlayState::new(name)),
            },
        }
    }
}

impl KvBackend for OwnedReadOnlyBackend {
    fn get(&self, key: &[u8], flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError> {
        let Some(state) = &self.overlay else {
            return self.base.handle().get_with_flags(key, flags);
        };
        if state.is_tombstoned(key) {
            return Ok(None);
        }
        if let Some(value) = state.raw_get(key, flags)? {
            return Ok(Some(value));
        }
        self.base.handle().get_with_flags(key, flags)
    }

    fn put(&self, key: &[u8], value: Option<&[u8]>, flags: WriteFlags) -> Result<(), StoreError> {
        let Some(state) = &self.overlay else {
            return Err(StoreError::storage_failure(
                "strict read-only factory backend rejects writes",
            ));
        };
        match value {
            Some(value) => state.put(key, value, flags),
            None => state.delete(key, flags),
        }
    }

    fn delete(&self, key: &[u8], flags: WriteFlags) -> Result<(), StoreError> {
        let Some(state) = &self.overlay else {
            return Err(StoreError::storage_failure(
                "strict read-only factory backend rejects writes",
            ));
        };
        state.delete(key, flags)
    }

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        let Some(state) = &self.overlay else {
            return self.base.handle().contains(key);
        };
        if state.is_tombstoned(key) {
            return Ok(false);
        }
        if state.raw_contains(key)? {
            return Ok(true);
        }
        self.base.handle().contains(key)
    }

    fn iterator(&self, ordered: bool) -> Result<DbIterator, StoreError> {
        let Some(state) = &self.overlay else {
            return self.base.handle().iterator(ordered);
        };
        let tombstones = state.tombstones_snapshot();
        let mut merged: std::collections::BTreeMap<Vec<u8>, Vec<u8>> =
            std::collections::BTreeMap::new();
        for entry in self.base.handle().iterator(ordered)? {
            let entry = entry?;
            merged.insert(entry.key.into_vec(), entry.value.into_vec());
        }
        for entry in state.raw_iterator(ordered)? {
            let entry = entry?;
            merged.insert(entry.key.into_vec(), entry.value.into_vec());
        }
        for key in &tombstones {
            merged.remove(key);
        }
        Ok(DbIterator::new(merged.into_iter().map(|(k, v)| {
            Ok(crate::value::Entry::new(BorrowedValue::inert(k), BorrowedValue::inert(v)))
        })))
    }

    fn snapshot(&self) -> Result<DbSnapshot, StoreError> {
        let Some(state) = &self.overlay else {
            return self.base.handle().snapshot();
        };
        let (overlay_snapshot, tombstones) = state.snapshot_parts()?;
        let base_snapshot = self.base.handle().snapshot()?;
        Ok(DbSnapshot::new(OwnedReadOnlySnapshot {
            base: base_snapshot,
            overlay: overlay_snapshot,
            tombstones,
        }))
    }

    fn flush(&self, wait: bool) -> Result<(), StoreError> {
        self.base.handle().flush(wait)
    }

    fn clear(&self) -> Result<(), StoreError> {
        match &self.overlay {
            Some(state) => state.clear(),
            None => Err(StoreError::storage_failure(
                "strict read-only factory backend rejects writes",
            )),
        }
    }

    fn compact(&self) -> Result<(), StoreError> {
        self.base.handle().compact()
    }

    fn gather_metric(&self) -> DbMetric {
        self.base.handle().gather_metric()
    }

    fn name(&self) -> ColumnName {
        self.name
    }
}

struct OwnedReadOnlySnapshot {
    base: DbSnapshot,
    overlay: DbSnapshot,
    tombstones: std::collections::BTreeSet<Vec<u8>>,
}

impl SnapshotBackend for OwnedReadOnlySnapshot {
    fn get(&self, key: &[u8], flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError> {
        if self.tombstones.contains(key) {
            return Ok(None);
        }
        if let Some(value) = self.overlay.get(key, flags)? {
            return Ok(Some(value));
        }
        self.base.get(key, flags)
    }

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        if self.tombstones.contains(key) {
            return Ok(false);
        }
        if self.overlay.contains(key)? {
            return Ok(true);
        }
        self.base.contains(key)
    }

    fn iterator(&self, ordered: bool) -> Result<DbIterator, StoreError> {
        self.base.iterator(ordered)
    }
}

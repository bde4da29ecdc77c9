//! Read-only wrapper, in strict and overlay modes.
//!
//! Strict rejects every mutation and adds no state beyond the base
//! reference. Overlay piles up writes in an owned in-memory layer plus a
//! tombstone set, masking the base without ever touching it — the pattern
//! used for speculative block execution (discard the overlay at block end)
//! and read-only RPC execution (strict, zero allocation on the hot path).

use std::collections::BTreeSet;

use parking_lot::RwLock;
use tracing::debug;

use crate::backend::memory::MemoryBackend;
use crate::column::ColumnName;
use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::handle::{Database, DbIterator, DbSnapshot, KvBackend, SnapshotBackend};
use crate::metrics::DbMetric;
use crate::value::{BorrowedValue, Entry};

pub(crate) struct OverlayState {
    overlay: MemoryBackend,
    tombstones: RwLock<BTreeSet<Vec<u8>>>,
}

impl OverlayState {
    pub(crate) fn new(name: ColumnName) -> Self {
        OverlayState {
            overlay: MemoryBackend::new(name),
            tombstones: RwLock::new(BTreeSet::new()),
        }
    }

    pub(crate) fn is_tombstoned(&self, key: &[u8]) -> bool {
        self.tombstones.read().contains(key)
    }

    /// Reads the overlay layer directly, ignoring tombstone state.
    pub(crate) fn raw_get(&self, key: &[u8], flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError> {
        self.overlay.get(key, flags)
    }

    /// Checks the overlay layer directly, ignoring tombstone state.
    pub(crate) fn raw_contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.overlay.contains(key)
    }

    pub(crate) fn put(&self, key: &[u8], value: &[u8], flags: WriteFlags) -> Result<(), StoreError> {
        self.tombstones.write().remove(key);
        self.overlay.put(key, Some(value), flags)
    }

    pub(crate) fn delete(&self, key: &[u8], flags: WriteFlags) -> Result<(), StoreError> {
        self.tombstones.write().insert(key.to_vec());
        self.overlay.delete(key, flags)
    }

    pub(crate) fn clear(&self) -> Result<(), StoreError> {
        self.overlay.clear()?;
        self.tombstones.write().clear();
        Ok(())
    }

    pub(crate) fn snapshot_parts(&self) -> Result<(DbSnapshot, BTreeSet<Vec<u8>>), StoreError> {
        Ok((self.overlay.snapshot()?, self.tombstones.read().clone()))
    }

    /// Iterates the overlay layer directly, ignoring tombstone state.
    pub(crate) fn raw_iterator(&self, ordered: bool) -> Result<DbIterator, StoreError> {
        self.overlay.iterator(ordered)
    }

    pub(crate) fn tombstones_snapshot(&self) -> BTreeSet<Vec<u8>> {
        self.tombstones.read().clone()
    }
}

/// A read-only view over a base [`Database`], either forwarding verbatim
/// (strict) or layering writable overlay state in front of it (overlay).
#[derive(Debug)]
pub struct ReadOnlyWrapper<'a> {
    base: Database<'a>,
    name: ColumnName,
    overlay: Option<OverlayState>,
}

impl std::fmt::Debug for OverlayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayState")
            .field("tombstones", &self.tombstones.read().len())
            .finish()
    }
}

impl<'a> ReadOnlyWrapper<'a> {
    /// A strict wrapper: reads forward verbatim, every mutation is
    /// rejected without ever consulting the base.
    pub fn strict(base: Database<'a>) -> Self {
        ReadOnlyWrapper {
            base,
            name: base.name(),
            overlay: None,
        }
    }

    /// An overlay wrapper: writes accumulate in an owned in-memory layer
    /// and tombstone set, masking the base until [`clear_temp_changes`] is
    /// called.
    ///
    /// [`clear_temp_changes`]: ReadOnlyWrapper::clear_temp_changes
    pub fn overlay(base: Database<'a>) -> Self {
        let name = base.name();
        ReadOnlyWrapper {
            base,
            name,
            overlay: Some(OverlayState::new(name)),
        }
    }

    pub fn is_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Drops every overlay entry and every tombstone, restoring this
    /// wrapper to a pristine view of the base. A no-op in strict mode.
    pub fn clear_temp_changes(&self) -> Result<(), StoreError> {
        if let Some(state) = &self.overlay {
            debug!(column = ?self.name, "clearing overlay temp changes");
            state.overlay.clear()?;
            state.tombstones.write().clear();
        }
        Ok(())
    }
}

impl<'a> KvBackend for ReadOnlyWrapper<'a> {
    fn get(&self, key: &[u8], flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError> {
        let Some(state) = &self.overlay else {
            return self.base.get_with_flags(key, flags);
        };
        if state.tombstones.read().contains(key) {
            return Ok(None);
        }
        if let Some(value) = state.overlay.get(key, flags)? {
            return Ok(Some(value));
        }
        self.base.get_with_flags(key, flags)
    }

    fn put(&self, key: &[u8], value: Option<&[u8]>, flags: WriteFlags) -> Result<(), StoreError> {
        let Some(state) = &self.overlay else {
            return Err(StoreError::storage_failure(
                "strict read-only wrapper rejects writes",
            ));
        };
        match value {
            Some(value) => {
                state.tombstones.write().remove(key);
                state.overlay.put(key, Some(value), flags)
            }
            None => self.delete(key, flags),
        }
    }

    fn delete(&self, key: &[u8], flags: WriteFlags) -> Result<(), StoreError> {
        let Some(state) = &self.overlay else {
            return Err(StoreError::storage_failure(
                "strict read-only wrapper rejects writes",
            ));
        };
        state.tombstones.write().insert(key.to_vec());
        state.overlay.delete(key, flags)
    }

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        let Some(state) = &self.overlay else {
            return self.base.contains(key);
        };
        if state.tombstones.read().contains(key) {
            return Ok(false);
        }
        if state.overlay.contains(key)? {
            return Ok(true);
        }
        self.base.contains(key)
    }

    fn iterator(&self, ordered: bool) -> Result<DbIterator, StoreError> {
        let Some(state) = &self.overlay else {
            return self.base.iterator(ordered);
        };
        let tombstones = state.tombstones.read().clone();
        let mut merged: std::collections::BTreeMap<Vec<u8>, Vec<u8>> =
            std::collections::BTreeMap::new();
        for entry in self.base.iterator(ordered)? {
            let entry = entry?;
            merged.insert(entry.key.into_vec(), entry.value.into_vec());
        }
        for entry in state.overlay.iterator(ordered)? {
            let entry = entry?;
            merged.insert(entry.key.into_vec(), entry.value.into_vec());
        }
        for key in &tombstones {
            merged.remove(key);
        }
        Ok(DbIterator::new(merged.into_iter().map(|(k, v)| {
            Ok(Entry::new(BorrowedValue::inert(k), BorrowedValue::inert(v)))
        })))
    }

    fn snapshot(&self) -> Result<DbSnapshot, StoreError> {
        let Some(state) = &self.overlay else {
            return self.base.snapshot();
        };
        // Best-effort point-in-time composition: overlay, tombstones, then
        // base are captured in sequence. The single-threaded cooperative
        // scheduling model (spec §5) means no concurrent writer can
        // interleave between these reads in practice.
        let overlay_snapshot = state.overlay.snapshot()?;
        let tombstones = state.tombstones.read().clone();
        let base_snapshot = self.base.snapshot()?;
        Ok(DbSnapshot::new(ReadOnlySnapshot {
            base: base_snapshot,
            overlay: overlay_snapshot,
            tombstones,
        }))
    }

    fn flush(&self, wait: bool) -> Result<(), StoreError> {
        self.base.flush(wait)
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.overlay.is_some() {
            self.clear_temp_changes()
        } else {
            Err(StoreError::storage_failure(
                "strict read-only wrapper rejects writes",
            ))
        }
    }

    fn compact(&self) -> Result<(), StoreError> {
        self.base.compact()
    }

    fn gather_metric(&self) -> DbMetric {
        self.base.gather_metric()
    }

    fn name(&self) -> ColumnName {
        self.name
    }
}

struct ReadOnlySnapshot {
    base: DbSnapshot,
    overlay: DbSnapshot,
    tombstones: BTreeSet<Vec<u8>>,
}

impl SnapshotBackend for ReadOnlySnapshot {
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
        let mut merged: std::collections::BTreeMap<Vec<u8>, Vec<u8>> =
            std::collections::BTreeMap::new();
        for entry in self.base.iterator(ordered)? {
            let entry = entry?;
            merged.insert(entry.key.into_vec(), entry.value.into_vec());
        }
        for entry in self.overlay.iterator(ordered)? {
            let entry = entry?;
            merged.insert(entry.key.into_vec(), entry.value.into_vec());
        }
        for key in &self.tombstones {
            merged.remove(key);
        }
        Ok(DbIterator::new(merged.into_iter().map(|(k, v)| {
            Ok(Entry::new(BorrowedValue::inert(k), BorrowedValue::inert(v)))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;

    #[test]
    fn strict_forwards_reads_and_rejects_writes() {
        let base = MemoryBackend::new(ColumnName::State);
        let base_db = Database::new(&base);
        base_db.put(b"k", Some(b"v")).unwrap();

        let wrapper = ReadOnlyWrapper::strict(base_db);
        let ro = Database::new(&wrapper);

        assert_eq!(ro.get(b"k").unwrap().unwrap().as_bytes(), b"v");
        assert!(ro.put(b"k", Some(b"x")).is_err());
        assert!(ro.delete(b"k").is_err());
        assert_eq!(base_db.get(b"k").unwrap().unwrap().as_bytes(), b"v");
    }

    #[test]
    fn overlay_put_masks_base_without_mutating_it() {
        let base = MemoryBackend::new(ColumnName::State);
        let base_db = Database::new(&base);
        base_db.put(b"k", Some(b"v0")).unwrap();

        let wrapper = ReadOnlyWrapper::overlay(base_db);
        let wrap_db = Database::new(&wrapper);
        wrap_db.put(b"k", Some(b"v1")).unwrap();

        assert_eq!(wrap_db.get(b"k").unwrap().unwrap().as_bytes(), b"v1");
        assert_eq!(base_db.get(b"k").unwrap().unwrap().as_bytes(), b"v0");
    }

    #[test]
    fn overlay_delete_is_a_tombstone_masking_base() {
        let base = MemoryBackend::new(ColumnName::State);
        let base_db = Database::new(&base);
        base_db.put(b"k", Some(b"v0")).unwrap();

        let wrapper = ReadOnlyWrapper::overlay(base_db);
        let wrap_db = Database::new(&wrapper);
        wrap_db.delete(b"k").unwrap();

        assert!(wrap_db.get(b"k").unwrap().is_none());
        assert_eq!(base_db.get(b"k").unwrap().unwrap().as_bytes(), b"v0");
    }

    #[test]
    fn clear_temp_changes_restores_pristine_base_view() {
        let base = MemoryBackend::new(ColumnName::State);
        let base_db = Database::new(&base);
        base_db.put(b"k", Some(b"old")).unwrap();

        let wrapper = ReadOnlyWrapper::overlay(base_db);
        let wrap_db = Database::new(&wrapper);
        wrap_db.put(b"k", Some(b"new")).unwrap();
        wrap_db.put(b"t", Some(b"1")).unwrap();

        assert_eq!(wrap_db.get(b"k").unwrap().unwrap().as_bytes(), b"new");
        assert_eq!(wrap_db.get(b"t").unwrap().unwrap().as_bytes(), b"1");

        wrapper.clear_temp_changes().unwrap();

        assert_eq!(wrap_db.get(b"k").unwrap().unwrap().as_bytes(), b"old");
        assert!(wrap_db.get(b"t").unwrap().is_none());
    }

    #[test]
    fn overlay_snapshot_composes_base_overlay_and_tombstones() {
        let base = MemoryBackend::new(ColumnName::State);
        let base_db = Database::new(&base);
        base_db.put(b"a", Some(b"base-a")).unwrap();
        base_db.put(b"b", Some(b"base-b")).unwrap();

        let wrapper = ReadOnlyWrapper::overlay(base_db);
        let wrap_db = Database::new(&wrapper);
        wrap_db.put(b"a", Some(b"overlay-a")).unwrap();
        wrap_db.delete(b"b").unwrap();

        let snap = wrap_db.snapshot().unwrap();
        assert_eq!(
            snap.get(b"a", ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            b"overlay-a"
        );
        assert!(snap.get(b"b", ReadFlags::NONE).unwrap().is_none());
    }
}

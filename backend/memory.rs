//! In-memory backend: a `BTreeMap` behind a `parking_lot::RwLock`, in the
//! style of the teacher's own `backend/in_memory.rs` (clone-on-read,
//! `begin_read`/`begin_write` split collapsed here into the single
//! `KvBackend` vtable).

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::column::ColumnName;
use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::handle::{DbIterator, DbSnapshot, KvBackend, SnapshotBackend};
use crate::metrics::{DbMetric, DbMetricCounters};
use crate::value::{BorrowedValue, Entry};

#[derive(Default)]
struct MemoryState {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
    /// Side log of insertion order. A `BTreeMap` alone only gives sorted
    /// order; this is what lets `iterator(ordered = false)` walk insertion
    /// order instead.
    insertion_order: Vec<Vec<u8>>,
}

impl MemoryState {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        if self.map.insert(key.to_vec(), value.to_vec()).is_none() {
            self.insertion_order.push(key.to_vec());
        }
    }

    fn delete(&mut self, key: &[u8]) {
        if self.map.remove(key).is_some() {
            self.insertion_order.retain(|k| k != key);
        }
    }

    fn clear(&mut self) {
        self.map.clear();
        self.insertion_order.clear();
    }
}

/// An in-memory key/value backend. Keys and values are copied on insert;
/// reads hand back an owned clone wrapped as an *inert* `BorrowedValue`, so
/// there is nothing for a caller to release.
#[derive(Debug)]
pub struct MemoryBackend {
    name: ColumnName,
    state: RwLock<MemoryState>,
    metrics: DbMetricCounters,
}

impl std::fmt::Debug for MemoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryState")
            .field("len", &self.map.len())
            .finish()
    }
}

impl MemoryBackend {
    pub fn new(name: ColumnName) -> Self {
        MemoryBackend {
            name,
            state: RwLock::new(MemoryState::default()),
            metrics: DbMetricCounters::new(),
        }
    }

    fn entries_snapshot(&self, ordered: bool) -> Vec<(Vec<u8>, Vec<u8>)> {
        let state = self.state.read();
        if ordered {
            state
                .map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        } else {
            state
                .insertion_order
                .iter()
                .filter_map(|k| state.map.get(k).map(|v| (k.clone(), v.clone())))
                .collect()
        }
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &[u8], _flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError> {
        let state = self.state.read();
        let found = state.map.get(key).cloned();
        drop(state);
        match found {
            Some(bytes) => {
                self.metrics.record_get(bytes.len());
                Ok(Some(BorrowedValue::inert(bytes)))
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &[u8], value: Option<&[u8]>, _flags: WriteFlags) -> Result<(), StoreError> {
        match value {
            Some(value) => {
                self.state.write().put(key, value);
                self.metrics.record_put(value.len());
            }
            None => {
                self.state.write().delete(key);
                self.metrics.record_delete();
            }
        }
        Ok(())
    }

    fn delete(&self, key: &[u8], _flags: WriteFlags) -> Result<(), StoreError> {
        self.state.write().delete(key);
        self.metrics.record_delete();
        Ok(())
    }

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.state.read().map.contains_key(key))
    }

    fn iterator(&self, ordered: bool) -> Result<DbIterator, StoreError> {
        let entries = self.entries_snapshot(ordered);
        Ok(DbIterator::new(entries.into_iter().map(|(k, v)| {
            Ok(Entry::new(BorrowedValue::inert(k), BorrowedValue::inert(v)))
        })))
    }

    fn snapshot(&self) -> Result<DbSnapshot, StoreError> {
        let state = self.state.read();
        let map = state.map.clone();
        let insertion_order = state.insertion_order.clone();
        drop(state);
        Ok(DbSnapshot::new(MemorySnapshot {
            map,
            insertion_order,
        }))
    }

    fn flush(&self, _wait: bool) -> Result<(), StoreError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        debug!(column = ?self.name, "clearing in-memory backend");
        self.state.write().clear();
        Ok(())
    }

    fn compact(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn gather_metric(&self) -> DbMetric {
        self.metrics.snapshot()
    }

    fn name(&self) -> ColumnName {
        self.name
    }
}

/// A deep clone of a [`MemoryBackend`]'s contents at the instant of
/// [`KvBackend::snapshot`], immune to subsequent writes to the live map.
struct MemorySnapshot {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
    insertion_order: Vec<Vec<u8>>,
}

impl SnapshotBackend for MemorySnapshot {
    fn get(&self, key: &[u8], _flags: ReadFlags) -> Result<Option<BorrowedValue>, StoreError> {
        Ok(self.map.get(key).cloned().map(BorrowedValue::inert))
    }

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.map.contains_key(key))
    }

    fn iterator(&self, ordered: bool) -> Result<DbIterator, StoreError> {
        let entries: Vec<(Vec<u8>, Vec<u8>)> = if ordered {
            self.map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        } else {
            self.insertion_order
                .iter()
                .filter_map(|k| self.map.get(k).map(|v| (k.clone(), v.clone())))
                .collect()
        };
        Ok(DbIterator::new(entries.into_iter().map(|(k, v)| {
            Ok(Entry::new(BorrowedValue::inert(k), BorrowedValue::inert(v)))
        })))
    }
}

//! Provider: a sparse name-to-handle registry, and a read-only provider
//! layered over it (spec §4.8 / §4.9).

use once_cell::sync::OnceCell;

use crate::backend::read_only::ReadOnlyWrapper;
use crate::column::ColumnName;
use crate::error::StoreError;
use crate::handle::Database;

/// A sparse mapping from [`ColumnName`] to a registered handle. Columns the
/// call site never registers simply aren't present — looking one up returns
/// [`StoreError::NotRegistered`] rather than panicking, since which columns
/// a given deployment opens is a run-time decision (spec §4.1).
#[derive(Default)]
pub struct Provider<'a> {
    entries: std::collections::HashMap<ColumnName, Database<'a>>,
}

impl<'a> Provider<'a> {
    pub fn new() -> Self {
        Provider {
            entries: std::collections::HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: ColumnName, handle: Database<'a>) {
        self.entries.insert(name, handle);
    }

    pub fn get(&self, name: ColumnName) -> Result<Database<'a>, StoreError> {
        self.entries
            .get(&name)
            .copied()
            .ok_or_else(|| StoreError::NotRegistered(name.wire_name().to_string()))
    }

    pub fn contains(&self, name: ColumnName) -> bool {
        self.entries.contains_key(&name)
    }
}

/// Whether a [`ReadOnlyProvider`] forwards mutations rejected (`Strict`) or
/// accumulates them in a discardable overlay (`Overlay`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOnlyMode {
    Strict,
    Overlay,
}

/// Wraps a [`Provider`] so every column it serves is read-only, in either
/// mode. Wrappers are constructed lazily, one per [`ColumnName`], and cached
/// for the lifetime of this provider — repeated lookups of the same column
/// return the same overlay state rather than a fresh, empty one.
pub struct ReadOnlyProvider<'a> {
    base: Provider<'a>,
    mode: ReadOnlyMode,
    cache: Vec<OnceCell<ReadOnlyWrapper<'a>>>,
}

impl<'a> ReadOnlyProvider<'a> {
    pub fn new(base: Provider<'a>, mode: ReadOnlyMode) -> Self {
        let cache = (0..ColumnName::VARIANTS.len())
            .map(|_| OnceCell::new())
            .collect();
        ReadOnlyProvider { base, mode, cache }
    }

    /// Returns the read-only handle for `name`, constructing and caching its
    /// wrapper on first access.
    pub fn get(&self, name: ColumnName) -> Result<Database<'_>, StoreError> {
        let base = self.base.get(name)?;
        let mode = self.mode;
        let wrapper = self.cache[name.ordinal()].get_or_try_init(|| {
            Ok::<_, StoreError>(match mode {
                ReadOnlyMode::Strict => ReadOnlyWrapper::strict(base),
                ReadOnlyMode::Overlay => ReadOnlyWrapper::overlay(base),
            })
        })?;
        Ok(Database::new(wrapper))
    }

    /// Returns the cached wrapper for `name` without constructing one,
    /// `None` if `name` hasn't been accessed yet through [`get`].
    ///
    /// [`get`]: ReadOnlyProvider::get
    pub fn get_opt(&self, name: ColumnName) -> Option<Database<'_>> {
        self.cache[name.ordinal()].get().map(Database::new)
    }

    pub fn is_overlay(&self) -> bool {
        self.mode == ReadOnlyMode::Overlay
    }

    /// Clears temp changes on every column wrapper constructed so far. A
    /// no-op in strict mode, and a no-op for columns never accessed.
    pub fn clear_all_temp_changes(&self) -> Result<(), StoreError> {
        for cell in &self.cache {
            if let Some(wrapper) = cell.get() {
                wrapper.clear_temp_changes()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;

    #[test]
    fn unregistered_column_is_an_error() {
        let provider = Provider::new();
        match provider.get(ColumnName::State) {
            Err(StoreError::NotRegistered(name)) => assert_eq!(name, "state"),
            other => panic!("expected NotRegistered, got {other:?}"),
        }
    }

    #[test]
    fn registered_column_round_trips() {
        let backend = MemoryBackend::new(ColumnName::State);
        let mut provider = Provider::new();
        provider.insert(ColumnName::State, Database::new(&backend));
        assert!(provider.contains(ColumnName::State));
        provider.get(ColumnName::State).unwrap().put(b"k", Some(b"v")).unwrap();
        assert_eq!(
            provider.get(ColumnName::State).unwrap().get(b"k").unwrap().unwrap().as_bytes(),
            b"v"
        );
    }

    #[test]
    fn read_only_provider_caches_wrapper_across_lookups() {
        let backend = MemoryBackend::new(ColumnName::State);
        let mut provider = Provider::new();
        provider.insert(ColumnName::State, Database::new(&backend));
        let ro = ReadOnlyProvider::new(provider, ReadOnlyMode::Overlay);

        assert!(ro.get_opt(ColumnName::State).is_none());
        ro.get(ColumnName::State).unwrap().put(b"k", Some(b"v1")).unwrap();
        assert_eq!(
            ro.get(ColumnName::State).unwrap().get(b"k").unwrap().unwrap().as_bytes(),
            b"v1"
        );
        assert!(ro.get_opt(ColumnName::State).is_some());
        assert_eq!(backend_is_untouched(&backend), true);
    }

    fn backend_is_untouched(backend: &MemoryBackend) -> bool {
        Database::new(backend).get(b"k").unwrap().is_none()
    }

    #[test]
    fn strict_read_only_provider_rejects_writes() {
        let backend = MemoryBackend::new(ColumnName::State);
        let mut provider = Provider::new();
        provider.insert(ColumnName::State, Database::new(&backend));
        let ro = ReadOnlyProvider::new(provider, ReadOnlyMode::Strict);

        assert!(ro.get(ColumnName::State).unwrap().put(b"k", Some(b"v")).is_err());
        assert!(!ro.is_overlay());
    }

    #[test]
    fn clear_all_temp_changes_resets_every_cached_column() {
        let state_backend = MemoryBackend::new(ColumnName::State);
        let code_backend = MemoryBackend::new(ColumnName::Code);
        let mut provider = Provider::new();
        provider.insert(ColumnName::State, Database::new(&state_backend));
        provider.insert(ColumnName::Code, Database::new(&code_backend));
        let ro = ReadOnlyProvider::new(provider, ReadOnlyMode::Overlay);

        ro.get(ColumnName::State).unwrap().put(b"k", Some(b"v")).unwrap();
        ro.get(ColumnName::Code).unwrap().put(b"k", Some(b"v")).unwrap();
        ro.clear_all_temp_changes().unwrap();

        assert!(ro.get(ColumnName::State).unwrap().get(b"k").unwrap().is_none());
        assert!(ro.get(ColumnName::Code).unwrap().get(b"k").unwrap().is_none());
    }
}

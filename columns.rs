//! Column families over a closed enumeration `E`: a dense mapping from each
//! variant to a handle, plus a cross-column write batch and a cross-column
//! snapshot (spec §4.7).

use crate::backend::memory::MemoryBackend;
use crate::batch::WriteBatch;
use crate::column::{ColumnEnum, ColumnName};
use crate::error::StoreError;
use crate::handle::{Database, DbSnapshot};

/// A non-owning, dense mapping from `E`'s variants to handles. Writes to
/// distinct variants are independent; nothing here routes a write across
/// column boundaries.
#[derive(Clone)]
pub struct ColumnGroup<'a, E: ColumnEnum> {
    handles: Box<[Database<'a>]>,
    _marker: std::marker::PhantomData<E>,
}

impl<'a, E: ColumnEnum> ColumnGroup<'a, E> {
    /// Builds a column group from handles given in `E::VARIANTS` order.
    ///
    /// # Panics
    /// Panics if `handles.len() != E::VARIANTS.len()`, since the mapping is
    /// required to be dense.
    pub fn new(handles: Vec<Database<'a>>) -> Self {
        assert_eq!(
            handles.len(),
            E::VARIANTS.len(),
            "column group must supply exactly one handle per variant"
        );
        ColumnGroup {
            handles: handles.into_boxed_slice(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn get_column_db(&self, key: E) -> Database<'a> {
        self.handles[key.ordinal()]
    }

    pub fn column_keys(&self) -> &'static [E] {
        E::VARIANTS
    }

    pub fn batch(&self) -> CrossColumnWriteBatch<'a, E> {
        CrossColumnWriteBatch::new(self)
    }

    pub fn snapshot(&self) -> Result<CrossColumnSnapshot<E>, StoreError> {
        let mut snapshots = Vec::with_capacity(E::VARIANTS.len());
        for (index, handle) in self.handles.iter().enumerate() {
            match handle.snapshot() {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => {
                    // Partial-failure semantics: deinit the K-1 successful
                    // snapshots (their own Drop impls do this) before
                    // surfacing the error. `snapshots` drops here, at index
                    // `index`, with no leaked engine handles.
                    drop(snapshots);
                    return Err(err);
                }
            }
        }
        Ok(CrossColumnSnapshot {
            snapshots,
            _marker: std::marker::PhantomData,
        })
    }
}

/// An owning column group: constructs one in-memory backend per `E`
/// variant — all tagged with the same logical `name`, the column these `E`
/// variants are families of — and hands out the non-owning [`ColumnGroup`]
/// view over them. Dropping this value drops every owned backend.
pub struct InMemoryColumnGroup<E: ColumnEnum> {
    backends: Box<[MemoryBackend]>,
    _marker: std::marker::PhantomData<E>,
}

impl<E: ColumnEnum> InMemoryColumnGroup<E> {
    /// Builds `E::VARIANTS.len()` in-memory backends, one per variant.
    pub fn new(name: ColumnName) -> Self {
        let backends = (0..E::VARIANTS.len())
            .map(|_| MemoryBackend::new(name))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        InMemoryColumnGroup {
            backends,
            _marker: std::marker::PhantomData,
        }
    }

    /// The non-owning view over these backends, for issuing reads, writes,
    /// batches, and snapshots.
    pub fn columns_db(&self) -> ColumnGroup<'_, E> {
        ColumnGroup::new(self.backends.iter().map(|b| Database::new(b)).collect())
    }
}

/// One write batch per column. Commit walks columns in enumeration order;
/// the first failure aborts without rolling back already-committed columns.
pub struct CrossColumnWriteBatch<'a, E: ColumnEnum> {
    batches: Vec<WriteBatch<'a>>,
    _marker: std::marker::PhantomData<E>,
}

impl<'a, E: ColumnEnum> CrossColumnWriteBatch<'a, E> {
    fn new(group: &ColumnGroup<'a, E>) -> Self {
        CrossColumnWriteBatch {
            batches: group
                .handles
                .iter()
                .map(|&handle| WriteBatch::new(handle))
                .collect(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn for_column(&mut self, key: E) -> &mut WriteBatch<'a> {
        &mut self.batches[key.ordinal()]
    }

    pub fn pending(&self) -> usize {
        self.batches.iter().map(WriteBatch::pending).sum()
    }

    pub fn commit(&mut self) -> Result<(), StoreError> {
        for batch in &mut self.batches {
            batch.commit()?;
        }
        Ok(())
    }
}

/// One snapshot per column, indexed by ordinal.
pub struct CrossColumnSnapshot<E: ColumnEnum> {
    snapshots: Vec<DbSnapshot>,
    _marker: std::marker::PhantomData<E>,
}

impl<E: ColumnEnum> CrossColumnSnapshot<E> {
    pub fn get_column(&self, key: E) -> &DbSnapshot {
        &self.snapshots[key.ordinal()]
    }
}

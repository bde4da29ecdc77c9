//! Write batch: an accumulated ordered op sequence bound to one handle,
//! committed as a single unit (spec §4.6).

use crate::error::StoreError;
use crate::handle::Database;

#[derive(Debug, Clone)]
enum BatchOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// Ops accumulate here and are replayed against `handle` on [`commit`].
///
/// [`commit`]: WriteBatch::commit
#[derive(Debug)]
pub struct WriteBatch<'a> {
    handle: Database<'a>,
    ops: Vec<BatchOp>,
}

impl<'a> WriteBatch<'a> {
    pub fn new(handle: Database<'a>) -> Self {
        WriteBatch {
            handle,
            ops: Vec::new(),
        }
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(BatchOp::Put(key.to_vec(), value.to_vec()));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.ops.push(BatchOp::Delete(key.to_vec()));
    }

    pub fn pending(&self) -> usize {
        self.ops.len()
    }

    /// Replays pending ops in order against the handle. Stops at the first
    /// failure and returns it; already-applied ops are **not** rolled back.
    /// On success, the pending ops list is emptied and the batch may be
    /// reused for a new accumulation.
    pub fn commit(&mut self) -> Result<(), StoreError> {
        for op in self.ops.drain(..) {
            match op {
                BatchOp::Put(key, value) => self.handle.put(&key, Some(&value))?,
                BatchOp::Delete(key) => self.handle.delete(&key)?,
            }
        }
        Ok(())
    }
}

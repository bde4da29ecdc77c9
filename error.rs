use thiserror::Error;

/// Flat, closed error set for the storage façade.
///
/// Every fallible operation in this crate surfaces one of these variants
/// unchanged; nothing here is ever swallowed or retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend I/O or corruption. The catch-all for a real engine's failures.
    #[error("storage failure: {0}")]
    StorageFailure(String),
    #[error("key too large ({len} bytes)")]
    KeyTooLarge { len: usize },
    #[error("value too large ({len} bytes)")]
    ValueTooLarge { len: usize },
    #[error("database closed")]
    DatabaseClosed,
    /// Allocator exhaustion. Never folded into `StorageFailure`.
    #[error("out of memory")]
    OutOfMemory,
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
    /// A provider lookup found no handle registered under the given name.
    #[error("not registered: {0}")]
    NotRegistered(String),
    #[error("{0}")]
    Custom(String),
}

impl StoreError {
    pub fn storage_failure(msg: impl Into<String>) -> Self {
        StoreError::StorageFailure(msg.into())
    }
}

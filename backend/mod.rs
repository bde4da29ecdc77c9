//! Concrete implementations of the [`crate::handle::KvBackend`] trait for
//! the backends this façade ships with.

/// In-memory backend — most useful for testing and for the overlay wrapper.
pub mod memory;
/// Null-object backend.
pub mod null;
/// Adapter for the embedded persistent engine (interface contract only).
pub mod persistent;
/// Read-only wrapper, strict or overlay.
pub mod read_only;

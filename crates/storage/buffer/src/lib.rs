//! Buffer management module for storage system.
//!
//! Implements the set-associative, row-locked, lock-counted page cache: a
//! fixed number of rows, each a small linearly-scanned associative set,
//! with LRU-within-row eviction gated by per-page lock counts and dirty
//! status.

pub mod buffer;
mod entry;
pub mod errors;
mod row;

/// Exposes `guard`-like structs that will provide the access to the `Page` instances
/// from the buffer via `&Page`
pub mod guards;

pub use buffer::BufferManager;
pub use errors::BufferError;
pub use guards::{PageReadGuard, PageWriteGuard};

//! Public facade over the storage engine: a single-file, hierarchical
//! key-value [`Store`] built from the `file`, `buffer` and `tree` crates.
//! This is the crate the rest of the engine (and `apps/`) programs
//! against; callers never touch `FileManager`/`BufferManager`/
//! `tree::Index` directly.

mod errors;
mod flags;
mod header;
mod page_source_impl;
mod store;

pub use errors::{StoreError, StoreResult};
pub use flags::{Collection, Direction, OpenFlags};
pub use header::FileHeader;
pub use store::{Handle, Store, last_error_message, MIN_CACHE_BYTES};

// Re-exported so callers can name node types/values without a direct
// dependency on the `tree` crate.
pub use tree::{InorderCursor, NodeType, NodeValue};

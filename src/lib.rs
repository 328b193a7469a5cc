//! # nodedb
//!
//! An embedded, single-file, hierarchical key-value store: one top-level
//! collection of keys, each owning its own subkey collection and value
//! collection, with typed leaf values and cross-key links.
//!
//! This crate is a thin re-export over [`storage_api`]; the store facade
//! itself — [`Store`], its operations, and its error type — lives there.
//! Application code (see `apps/nodedb-cli`) composes it with configuration
//! and logging; this crate only re-exports the embeddable API surface.

pub use storage_api::{
    Collection, Direction, FileHeader, Handle, InorderCursor, MIN_CACHE_BYTES, NodeType,
    NodeValue, OpenFlags, Store, StoreError, StoreResult, last_error_message,
};

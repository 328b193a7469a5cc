//! An AVL-balanced index over node records stored in `page`-crate pages
//! Every child collection in the store — a key's
//! subkeys, a key's values, and the store-wide back-link table — is one of
//! these trees, distinguished only by what bytes its callers use as node
//! names and what `NodeValue` its leaves carry.
//!
//! This crate knows nothing about caching, locking, or files: it reaches
//! pages only through [`PageSource`], so the concurrency and durability
//! machinery in `buffer`/`file`/`storage-api` stays out of its way.

mod backtrace;
pub mod errors;
mod node;
mod node_ref;
mod node_type;
mod page_source;
mod tree;

pub use errors::TreeError;
pub use node::{Node, NodeValue, NAME_MAX, SHORT_VALUE_MAX};
pub use node_ref::NodeRef;
pub use node_type::NodeType;
pub use page_source::PageSource;
pub use tree::{Index, InorderCursor};

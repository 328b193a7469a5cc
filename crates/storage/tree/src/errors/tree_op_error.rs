use crate::errors::node_error::NodeError;
use crate::errors::search_error::SearchError;
use crate::node_ref::NodeRef;
use thiserror::Error;

/// Public error type for the `tree` crate: AVL index operations over node
/// records stored in `page`-crate pages.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A node record did not decode to the expected shape.
    #[error(transparent)]
    Node(#[from] NodeError),
    /// The backtrace stack or another walk invariant was violated.
    #[error(transparent)]
    Search(#[from] SearchError),
    /// The underlying page failed to allocate, read, or write.
    #[error("page access failed while operating on {reference}")]
    Page {
        reference: NodeRef,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// A key with the same name already exists under the parent collection.
    #[error("a node named {name:?} already exists under {parent}")]
    Exists { parent: NodeRef, name: Vec<u8> },
    /// No node with the requested name exists under the parent collection.
    #[error("no node matches under {parent}")]
    NotFound { parent: NodeRef },
    /// The node found is not of the type the operation required.
    #[error("node {reference} has type {actual:?}, expected {expected:?}")]
    Mismatch {
        reference: NodeRef,
        expected: &'static str,
        actual: crate::node_type::NodeType,
    },
    /// Deleting a key that still has subkeys or values, or deleting a node
    /// a link still points at.
    #[error("operation on {reference} is not permitted: {reason}")]
    InvalidOperation {
        reference: NodeRef,
        reason: &'static str,
    },
    /// A name or value exceeded its fixed on-disk limit.
    #[error("parameter rejected: {0}")]
    Param(&'static str),
}

impl TreeError {
    /// Wraps an opaque page-access failure (from the `PageSource`
    /// implementation) with the node reference that triggered it.
    pub fn page_source(
        reference: NodeRef,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TreeError::Page {
            reference,
            source: Box::new(source),
        }
    }
}

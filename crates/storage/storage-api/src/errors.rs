//! The public error type for the `storage-api` crate: everything a `Store`
//! operation can fail with, spanning the file, buffer and tree layers it
//! composes — not-found/exists/invalid-operation state errors, corruption,
//! abort-on-flush, and argument/flag validation failures.

use binary_helpers::bin_error::BinaryError;
use buffer::BufferError;
use thiserror::Error;
use tree::{NodeRef, TreeError};

/// Errors raised by a [`crate::store::Store`] operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested name already exists under the parent collection.
    #[error("a node named {name:?} already exists under {parent}")]
    Exists { parent: NodeRef, name: Vec<u8> },
    /// No node matches the requested name under the parent collection.
    #[error("not found")]
    NotFound,
    /// The operation is not permitted given the node's current state (e.g.
    /// deleting a key that still has children, or a value a link targets).
    #[error("operation not permitted: {reason}")]
    InvalidOperation { reason: &'static str },
    /// The node found is not of the type the operation required.
    #[error("node {reference} has type {actual:?}, expected {expected:?}")]
    TypeMismatch {
        reference: NodeRef,
        expected: &'static str,
        actual: tree::NodeType,
    },
    /// A page, the header, or a node record failed checksum verification or
    /// otherwise did not decode to a sensible shape.
    #[error("store data is corrupt")]
    Corrupt,
    /// The file's magic/version/page-size fields do not describe a store
    /// this build understands.
    #[error("file is not a recognized store")]
    NotAStore,
    /// `open` was passed a disallowed flag combination (e.g. CREATE with
    /// READONLY, or neither READWRITE nor READONLY).
    #[error("invalid open flags: {reason}")]
    InvalidFlags { reason: &'static str },
    /// A write-class operation was attempted on a store opened READONLY.
    #[error("store is open read-only")]
    ReadOnly,
    /// An operation aborted because completing it would require flushing a
    /// dirty page with AUTOSAVE off; the caller's changes were rolled back.
    #[error("operation aborted: {0}")]
    Abort(#[source] BufferError),
    /// A name or value parameter exceeded a fixed on-disk limit, or was
    /// otherwise malformed.
    #[error("parameter rejected: {0}")]
    Param(&'static str),
    /// The page cache failed to service a page access.
    #[error("buffer error")]
    Buffer(#[from] BufferError),
    /// The AVL index layer failed an operation.
    #[error("tree error")]
    Tree(#[source] TreeError),
    /// Binary encoding/decoding of the file header failed.
    #[error("header encoding error")]
    Binary(#[from] BinaryError),
    /// The underlying file I/O port failed.
    #[error("file error")]
    File(#[from] file::FileError),
}

/// A tree operation can fail because a page access deep inside it hit
/// `BufferError::MustFlush` (evicting a dirty page with AUTOSAVE off).
/// That specific case surfaces as `StoreError::Abort` rather than the
/// generic `Tree` wrapper.
impl From<TreeError> for StoreError {
    fn from(err: TreeError) -> Self {
        if let TreeError::Page { reference, source } = err {
            match source.downcast::<BufferError>() {
                Ok(buffer_err) => {
                    return match *buffer_err {
                        BufferError::MustFlush { .. } => StoreError::Abort(*buffer_err),
                        BufferError::Corrupt { .. } | BufferError::NotFound { .. } => {
                            StoreError::Corrupt
                        }
                        BufferError::BufferFull { .. } => StoreError::Buffer(*buffer_err),
                    };
                }
                Err(source) => return StoreError::Tree(TreeError::Page { reference, source }),
            }
        }
        StoreError::Tree(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

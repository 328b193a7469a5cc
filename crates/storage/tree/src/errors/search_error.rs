use crate::node_ref::NodeRef;
use thiserror::Error;

/// Errors raised while walking the tree (search, insert-descent,
/// delete-descent).
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("ancestor backtrace stack overflowed its {max}-entry cap at {at}")]
    BacktraceOverflow { at: NodeRef, max: usize },
    #[error("node at {reference} does not decode")]
    Decode {
        reference: NodeRef,
        #[source]
        source: crate::errors::node_error::NodeError,
    },
}

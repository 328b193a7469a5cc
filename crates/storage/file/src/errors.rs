//! Errors raised by the file I/O port.

use page::page_id::FileId;
use thiserror::Error;

/// Errors surfaced by a [`crate::api::FileManager`] implementation.
#[derive(Debug, Error)]
pub enum FileError {
    /// The underlying platform I/O call failed.
    #[error("I/O error on file {file_id}")]
    Io {
        file_id: FileId,
        #[source]
        source: std::io::Error,
    },
    /// `file_id` has no registered path in the file catalog.
    #[error("file {file_id} is not registered in the file catalog")]
    NotCataloged { file_id: FileId },
    /// A read or write was attempted against a file that was never opened.
    #[error("file {file_id} is not open")]
    NotOpen { file_id: FileId },
}

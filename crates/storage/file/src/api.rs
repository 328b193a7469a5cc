//! Public API for the `file` crate

use crate::errors::FileError;
use crate::file_catalog::FileCatalog;
use page::page_id::{FileId, PageId};
use std::sync::Arc;

/// File manager public API
///
/// A `FileManager` manages a collection of fixed-size pages addressed by
/// `PageId`, multiplexed across several underlying files identified by
/// `FileId` and resolved through a [`FileCatalog`]. This is the I/O port
/// boundary: positioned read/write plus open/create/close/sync. The
/// platform-specific read/write primitives themselves are an external
/// collaborator; this trait is the seam the rest of the engine programs
/// against.
pub trait FileManager {
    /// Creates a new file manager bound to the given catalog. No file is
    /// opened until `open_existing`/`create_truncate` is called for a
    /// `file_id` registered in `file_catalog`.
    fn new(file_catalog: Arc<FileCatalog>) -> Self;

    /// Opens an existing file registered under `file_id`. Fails if the file
    /// does not exist or `file_id` has no catalog entry.
    fn open_existing(&self, file_id: FileId) -> Result<(), FileError>;

    /// Creates (truncating if it already exists) the file registered under
    /// `file_id`.
    fn create_truncate(&self, file_id: FileId) -> Result<(), FileError>;

    /// Closes the file registered under `file_id`, if open. A no-op if it
    /// was never opened.
    fn close(&self, file_id: FileId) -> Result<(), FileError>;

    /// Flushes any buffered writes for `file_id` to stable storage.
    fn sync(&self, file_id: FileId) -> Result<(), FileError>;

    /// Reads the page identified by `page_id` into `destination`.
    ///
    /// Returns `true` if the page existed and was copied into `destination`;
    /// `false` if the read was short (e.g. past end of file) — a read past
    /// EOF is treated as "page does not exist yet", not an error.
    fn read_page(&self, page_id: PageId, destination: &mut [u8]) -> bool;

    /// Writes `page_data` as the page for `page_id`. Panics if the owning
    /// file was never opened — a caller reaching this without having opened
    /// the file is an engine-internal invariant violation, not a reportable
    /// I/O failure.
    fn write_page(&self, page_id: PageId, page_data: &[u8]);
}

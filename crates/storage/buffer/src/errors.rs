use page::page_id::PageId;
use thiserror::Error;

/// Errors raised by the page cache.
#[derive(Debug, Error)]
pub enum BufferError {
    /// No evictable, unlocked slot was found in the target row.
    #[error("cache row for page {page_id} has no evictable slot")]
    BufferFull { page_id: PageId },
    /// The page does not exist on disk (a short or empty read).
    #[error("page {page_id} not found")]
    NotFound { page_id: PageId },
    /// The page's stored checksum does not match its contents.
    #[error("page {page_id} failed checksum verification")]
    Corrupt { page_id: PageId },
    /// Non-AUTOSAVE eviction would require flushing a dirty page.
    #[error("evicting page {page_id} would require a flush (AUTOSAVE is off)")]
    MustFlush { page_id: PageId },
}

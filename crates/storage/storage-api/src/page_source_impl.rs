//! Implements `tree::PageSource` over a `BufferManager`, so the AVL index
//! never has to know about caching, eviction, or files. Page numbering for
//! data pages starts at 1 — page 0 is the header, which never lives in
//! the cache.

use buffer::buffer::BufferManager;
use buffer::errors::BufferError;
use buffer::guards::{PageReadGuard, PageWriteGuard};
use file::api::FileManager;
use page::page_id::{FileId, PageId};
use page::page_type::PageType;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tree::PageSource;

/// The `PageSource` the `Store` hands to `tree::Index`: a buffer manager
/// plus the monotonically increasing page-number counter new pages are
/// claimed from.
#[derive(Debug)]
pub struct BufferSource<F: FileManager> {
    buffer: Arc<BufferManager<F>>,
    file_id: FileId,
    next_page_number: AtomicU32,
}

impl<F: FileManager> BufferSource<F> {
    pub fn new(buffer: Arc<BufferManager<F>>, file_id: FileId, next_page_number: u32) -> Self {
        Self {
            buffer,
            file_id,
            next_page_number: AtomicU32::new(next_page_number),
        }
    }

    /// Rolls the allocation counter back to `value` (the last committed
    /// page count) — used by `Store::rollback` so a failed operation does
    /// not permanently burn page numbers it never actually persisted.
    pub fn reset_next_page_number(&self, value: u32) {
        self.next_page_number.store(value, Ordering::Release);
    }

    /// The next page number that would be handed out — i.e. the page count
    /// a commit should persist into the header.
    pub fn next_page_number(&self) -> u32 {
        self.next_page_number.load(Ordering::Acquire)
    }

    pub fn buffer(&self) -> &BufferManager<F> {
        &self.buffer
    }
}

impl<F: FileManager> PageSource for BufferSource<F> {
    type Read<'a>
        = PageReadGuard<'a>
    where
        Self: 'a;
    type Write<'a>
        = PageWriteGuard<'a>
    where
        Self: 'a;
    type Error = BufferError;

    fn read(&self, page_number: u32) -> Result<Self::Read<'_>, Self::Error> {
        self.buffer.read_page(PageId::new(self.file_id, page_number))
    }

    fn write(&self, page_number: u32) -> Result<Self::Write<'_>, Self::Error> {
        self.buffer.read_page_mut(PageId::new(self.file_id, page_number))
    }

    fn allocate(&self) -> Result<(u32, Self::Write<'_>), Self::Error> {
        let page_number = self.next_page_number.fetch_add(1, Ordering::AcqRel);
        let page_id = PageId::new(self.file_id, page_number);
        let guard = self.buffer.allocate_new_page(page_id, PageType::Keys)?;
        Ok((page_number, guard))
    }
}

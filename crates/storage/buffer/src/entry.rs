//! A single slot in a cache row: an optional resident page plus the
//! bookkeeping the eviction policy and lock-count discipline need.

use page::Page;
use page::page_id::PageId;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/// Packs a `PageId` into a single `u64` for atomic storage. `0` means
/// "unused" — safe as a sentinel since page 0 of file 0 is the store's own
/// header page, which the store owns outright and never routes through a
/// cache row.
pub(crate) fn pack(page_id: PageId) -> u64 {
    ((page_id.file_id as u64) << 32) | page_id.page_number as u64
}

pub(crate) fn unpack(key: u64) -> PageId {
    PageId::new((key >> 32) as u32, key as u32)
}

#[derive(Debug)]
pub(crate) struct CacheEntry {
    /// Packed `PageId` of the resident page, or 0 if this slot is unused.
    pub(crate) offset: AtomicU64,
    pub(crate) page: RwLock<Box<Page>>,
    /// Number of outstanding locks on this page. Eviction requires 0.
    pub(crate) lock_count: AtomicI64,
    /// This row's `load_count` snapshot at the time this entry was (re)loaded.
    pub(crate) load_time: AtomicU64,
    pub(crate) dirty: AtomicBool,
}

impl CacheEntry {
    pub(crate) fn unused() -> Self {
        Self {
            offset: AtomicU64::new(0),
            page: RwLock::new(Box::new(Page::new_zeroed(PageId::new(0, 0)))),
            lock_count: AtomicI64::new(0),
            load_time: AtomicU64::new(0),
            dirty: AtomicBool::new(false),
        }
    }

    pub(crate) fn matches(&self, key: u64) -> bool {
        self.offset.load(Ordering::Acquire) == key
    }
}

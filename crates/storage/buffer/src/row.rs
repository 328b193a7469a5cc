//! A single associative row of the page cache: `A` cache entries plus the
//! bookkeeping needed to coordinate lookups/evictions across threads.

use crate::entry::CacheEntry;
use std::sync::RwLock;
use std::sync::atomic::AtomicU64;

#[derive(Debug)]
pub(crate) struct CacheRow {
    pub(crate) entries: Vec<CacheEntry>,
    /// A hit takes this shared, so it can never observe an entry
    /// mid-eviction; resolving a miss (victim selection, load/evict) takes
    /// it exclusive, so eviction and lookup on the same row never overlap.
    pub(crate) claim: RwLock<()>,
    pub(crate) load_counter: AtomicU64,
}

impl CacheRow {
    pub(crate) fn new(associativity: usize) -> Self {
        Self {
            entries: (0..associativity).map(|_| CacheEntry::unused()).collect(),
            claim: RwLock::new(()),
            load_counter: AtomicU64::new(0),
        }
    }
}

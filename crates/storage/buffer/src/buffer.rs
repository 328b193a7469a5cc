//! Set-associative, row-locked page cache.
//!
//! Rows are chosen by hashing the page identity; each row is a small,
//! linearly-scanned, LRU-within-row associative set. A hit takes the row's
//! `claim` lock shared, just long enough to scan and bump the entry's lock
//! count; a miss takes it exclusive to serialize victim selection and
//! load/eviction, so a lookup can never observe an entry mid-eviction.

use crate::entry::{CacheEntry, pack, unpack};
use crate::errors::BufferError;
use crate::guards::{PageReadGuard, PageWriteGuard};
use crate::row::CacheRow;
use file::api::FileManager;
use page::Page;
use page::page_id::PageId;
use page::page_type::PageType;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// Ways per row. The source's default; kept as a named constant rather than
/// a configuration knob since nothing here needs it tunable.
const ASSOCIATIVITY: usize = 8;

/// The L'Ecuyer 1999 odd multiplier used to spread page identities across
/// rows.
const ROW_HASH_MULTIPLIER: u64 = 1_597_334_677;

fn floor_pow2(x: usize) -> usize {
    if x <= 1 {
        1
    } else {
        1usize << (usize::BITS - 1 - (x as u32).leading_zeros())
    }
}

/// The buffer manager responsible for the cache pool of data pages.
#[derive(Debug)]
pub struct BufferManager<F: FileManager> {
    file_manager: Arc<F>,
    rows: Vec<CacheRow>,
    row_mask: u64,
    autosave: bool,
}

impl<F: FileManager> BufferManager<F> {
    /// Builds a cache sized to `cache_bytes` (already validated as a power
    /// of two no smaller than 64 KiB by the caller) with `autosave`
    /// governing what happens when a dirty page must be evicted.
    pub fn new(file_manager: Arc<F>, cache_bytes: usize, autosave: bool) -> Self {
        let raw_rows = (cache_bytes / (ASSOCIATIVITY * page::PAGE_SIZE)).max(1);
        let row_count = floor_pow2(raw_rows);
        let rows = (0..row_count).map(|_| CacheRow::new(ASSOCIATIVITY)).collect();
        Self {
            file_manager,
            rows,
            row_mask: (row_count - 1) as u64,
            autosave,
        }
    }

    /// Returns a shared guard on the page identified by `page_id`, loading
    /// it from disk if it is not already resident.
    pub fn read_page(&self, page_id: PageId) -> Result<PageReadGuard<'_>, BufferError> {
        let (row, idx) = self.locate(page_id, true)?;
        let entry = &self.rows[row].entries[idx];
        Ok(PageReadGuard {
            guard: entry.page.read().unwrap(),
            lock_count: &entry.lock_count,
        })
    }

    /// Returns an exclusive guard on the page identified by `page_id`,
    /// loading it from disk if needed, and marks it dirty (any caller
    /// asking for mutable access intends to mutate it).
    pub fn read_page_mut(&self, page_id: PageId) -> Result<PageWriteGuard<'_>, BufferError> {
        let (row, idx) = self.locate(page_id, true)?;
        let entry = &self.rows[row].entries[idx];
        entry.dirty.store(true, Ordering::Release);
        Ok(PageWriteGuard {
            guard: entry.page.write().unwrap(),
            lock_count: &entry.lock_count,
        })
    }

    /// Claims a fresh, zero-filled page for `page_id` without reading from
    /// disk, initializes it as `page_type`, and returns it dirty and
    /// locked.
    pub fn allocate_new_page(
        &self,
        page_id: PageId,
        page_type: PageType,
    ) -> Result<PageWriteGuard<'_>, BufferError> {
        let (row, idx) = self.locate(page_id, false)?;
        let entry = &self.rows[row].entries[idx];
        {
            let mut page = entry.page.write().unwrap();
            page.initialize(page_id, page_type)
                .map_err(|_| BufferError::Corrupt { page_id })?;
        }
        entry.dirty.store(true, Ordering::Release);
        Ok(PageWriteGuard {
            guard: entry.page.write().unwrap(),
            lock_count: &entry.lock_count,
        })
    }

    /// Commit step 2: writes every dirty resident page back through the
    /// file manager. Stops and returns the first I/O error encountered.
    pub fn flush_all_dirty(&self) -> Result<(), BufferError> {
        for row in &self.rows {
            for entry in &row.entries {
                if entry.offset.load(Ordering::Acquire) != 0 && entry.dirty.load(Ordering::Acquire)
                {
                    let page_id = unpack(entry.offset.load(Ordering::Acquire));
                    self.flush_entry(entry, page_id)?;
                }
            }
        }
        Ok(())
    }

    /// Rollback steps 2-3: invalidate every dirty entry (so the next access
    /// reloads it from disk) and clear every lock count.
    pub fn invalidate_dirty_and_clear_locks(&self) {
        for row in &self.rows {
            for entry in &row.entries {
                if entry.dirty.load(Ordering::Acquire) {
                    entry.offset.store(0, Ordering::Release);
                    entry.dirty.store(false, Ordering::Release);
                }
                entry.lock_count.store(0, Ordering::Release);
            }
        }
    }

    /// Invariant: every occupied entry must have a zero lock count. Used
    /// by `Store::check_cache_consistency`.
    pub fn check_consistency(&self) -> bool {
        self.rows.iter().all(|row| {
            row.entries.iter().all(|entry| {
                entry.offset.load(Ordering::Acquire) == 0
                    || entry.lock_count.load(Ordering::Acquire) == 0
            })
        })
    }

    fn row_index(&self, page_id: PageId) -> usize {
        let key = pack(page_id);
        ((key.wrapping_mul(ROW_HASH_MULTIPLIER) >> 3) & self.row_mask) as usize
    }

    /// Implements the cache lookup algorithm. Returns the (row, slot) of a
    /// now-resident, lock-counted page.
    fn locate(&self, page_id: PageId, existing: bool) -> Result<(usize, usize), BufferError> {
        let row_idx = self.row_index(page_id);
        let row = &self.rows[row_idx];
        let key = pack(page_id);

        {
            // Shared: can run alongside other hits, but never alongside an
            // eviction on this row, so it can never match an entry whose
            // identity is mid-retirement.
            let _shared = row.claim.read().unwrap();
            if let Some(i) = Self::scan(row, key) {
                row.entries[i].lock_count.fetch_add(1, Ordering::AcqRel);
                return Ok((row_idx, i));
            }
        }

        // Miss: serialize victim selection/load on this row only.
        let _claim = row.claim.write().unwrap();

        // Someone may have loaded it while we waited for the claim lock.
        if let Some(i) = Self::scan(row, key) {
            row.entries[i].lock_count.fetch_add(1, Ordering::AcqRel);
            return Ok((row_idx, i));
        }

        let victim = Self::pick_victim(row).ok_or(BufferError::BufferFull { page_id })?;
        let entry = &row.entries[victim];

        if entry.dirty.load(Ordering::Acquire) {
            let victim_page_id = unpack(entry.offset.load(Ordering::Acquire));
            if self.autosave {
                self.flush_entry(entry, victim_page_id)?;
            } else {
                return Err(BufferError::MustFlush {
                    page_id: victim_page_id,
                });
            }
        }

        if existing {
            let mut fresh = Page::new_zeroed(page_id);
            if !self.file_manager.read_page(page_id, fresh.data_mut()) {
                return Err(BufferError::NotFound { page_id });
            }
            if !fresh
                .verify_checksum()
                .map_err(|_| BufferError::Corrupt { page_id })?
            {
                return Err(BufferError::Corrupt { page_id });
            }
            *entry.page.write().unwrap() = Box::new(fresh);
            let load_time = row.load_counter.fetch_add(1, Ordering::AcqRel) + 1;
            entry.load_time.store(load_time, Ordering::Release);
        } else {
            *entry.page.write().unwrap() = Box::new(Page::new_zeroed(page_id));
            // New pages start at load_time 0: the earliest eviction
            // candidates, not the latest.
            entry.load_time.store(0, Ordering::Release);
        }

        entry.offset.store(key, Ordering::Release);
        entry.dirty.store(false, Ordering::Release);
        entry.lock_count.store(1, Ordering::Release);

        Ok((row_idx, victim))
    }

    fn scan(row: &CacheRow, key: u64) -> Option<usize> {
        row.entries.iter().position(|e| e.matches(key))
    }

    fn pick_victim(row: &CacheRow) -> Option<usize> {
        if let Some(i) = row
            .entries
            .iter()
            .position(|e| e.offset.load(Ordering::Acquire) == 0)
        {
            return Some(i);
        }
        row.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.lock_count.load(Ordering::Acquire) == 0)
            .min_by_key(|(_, e)| e.load_time.load(Ordering::Acquire))
            .map(|(i, _)| i)
    }

    fn flush_entry(&self, entry: &CacheEntry, page_id: PageId) -> Result<(), BufferError> {
        let mut page = entry.page.write().unwrap();
        page.recompute_checksum()
            .map_err(|_| BufferError::Corrupt { page_id })?;
        self.file_manager.write_page(page_id, page.data());
        entry.dirty.store(false, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use file::file_catalog::FileCatalog;
    use file::in_memory_file_manager::InMemoryFileManager;
    use std::path::PathBuf;

    fn manager() -> BufferManager<InMemoryFileManager> {
        let catalog = Arc::new(FileCatalog::new());
        catalog.add_file(1, PathBuf::from("test.db"));
        let fm = Arc::new(InMemoryFileManager::new(catalog));
        fm.create_truncate(1).unwrap();
        BufferManager::new(fm, 64 * 1024, true)
    }

    #[test]
    fn allocate_then_read_round_trips() {
        let mgr = manager();
        let page_id = PageId::new(1, 1);
        {
            let guard = mgr.allocate_new_page(page_id, PageType::Keys).unwrap();
            assert_eq!(guard.page_id(), page_id);
        }
        let guard = mgr.read_page_mut(page_id).unwrap();
        assert_eq!(guard.page_id(), page_id);
    }

    #[test]
    fn check_consistency_passes_when_no_locks_held() {
        let mgr = manager();
        {
            let _guard = mgr.allocate_new_page(PageId::new(1, 1), PageType::Keys).unwrap();
            assert!(!mgr.check_consistency());
        }
        assert!(mgr.check_consistency());
    }

    #[test]
    fn row_count_is_power_of_two_and_at_least_one() {
        let mgr = manager();
        assert!((mgr.row_mask + 1).is_power_of_two());
    }
}

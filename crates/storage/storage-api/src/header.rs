//! The store's file header (page 0): total page count, the page
//! size it was created with, persisted flags, the two top-level tree
//! roots, and the 256-entry page-hint pool. Checksummed the same way every
//! other page is — [`page::Page::recompute_checksum`]/`verify_checksum`
//! cover this page's bytes exactly like any other, so no separate
//! checksum field is needed here.

use crate::errors::StoreError;
use binary_helpers::le::{read_le, write_le};
use page::Page;
use tree::NodeRef;

/// Identifies this file as a store of a format this build understands.
pub const MAGIC: u32 = 0x4E44_4231; // "1BDN" little-endian, i.e. "NDB1"
pub const CURRENT_VERSION: u16 = 1;
/// Number of buckets in the page-hint pool.
pub const HINT_POOL_LEN: usize = 256;

const MAGIC_OFFSET: usize = page::HEADER_SIZE;
const VERSION_OFFSET: usize = MAGIC_OFFSET + 4;
const FLAGS_OFFSET: usize = VERSION_OFFSET + 2;
const PAGE_SIZE_OFFSET: usize = FLAGS_OFFSET + 2;
const PAGE_COUNT_OFFSET: usize = PAGE_SIZE_OFFSET + 4;
const TOP_ROOT_OFFSET: usize = PAGE_COUNT_OFFSET + 4;
const BACKLINK_ROOT_OFFSET: usize = TOP_ROOT_OFFSET + 8;
const HINT_POOL_OFFSET: usize = BACKLINK_ROOT_OFFSET + 8;

/// Persisted flag bit: whether the store was created/last opened with
/// AUTOSAVE semantics (the cache's eviction-of-dirty-page policy).
pub const FLAG_AUTOSAVE: u16 = 1 << 0;

/// The store-wide metadata kept on page 0, plus the in-memory "old header"
/// rollback anchor lives alongside it in [`crate::store::Store`], not here.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub flags: u16,
    pub page_count: u32,
    pub top_root: NodeRef,
    pub backlink_root: NodeRef,
    pub hint_pool: [u32; HINT_POOL_LEN],
}

impl FileHeader {
    /// The header for a brand new, empty store: just the header page
    /// itself exists so far.
    pub fn fresh(autosave: bool) -> Self {
        Self {
            flags: if autosave { FLAG_AUTOSAVE } else { 0 },
            page_count: 1,
            top_root: NodeRef::NULL,
            backlink_root: NodeRef::NULL,
            hint_pool: [0u32; HINT_POOL_LEN],
        }
    }

    pub fn read(page: &Page) -> Result<Self, StoreError> {
        let data = page.data();
        if read_le::<u32>(data, MAGIC_OFFSET)? != MAGIC {
            return Err(StoreError::NotAStore);
        }
        if read_le::<u16>(data, VERSION_OFFSET)? != CURRENT_VERSION {
            return Err(StoreError::NotAStore);
        }
        let flags = read_le::<u16>(data, FLAGS_OFFSET)?;
        if read_le::<u32>(data, PAGE_SIZE_OFFSET)? as usize != page::PAGE_SIZE {
            return Err(StoreError::NotAStore);
        }
        let page_count = read_le::<u32>(data, PAGE_COUNT_OFFSET)?;
        if page_count < 1 {
            return Err(StoreError::Corrupt);
        }
        let top_root = NodeRef::from_bits(read_le::<u64>(data, TOP_ROOT_OFFSET)?);
        let backlink_root = NodeRef::from_bits(read_le::<u64>(data, BACKLINK_ROOT_OFFSET)?);
        let mut hint_pool = [0u32; HINT_POOL_LEN];
        for (i, slot) in hint_pool.iter_mut().enumerate() {
            *slot = read_le::<u32>(data, HINT_POOL_OFFSET + i * 4)?;
        }
        Ok(Self {
            flags,
            page_count,
            top_root,
            backlink_root,
            hint_pool,
        })
    }

    pub fn write(&self, page: &mut Page) -> Result<(), StoreError> {
        let data = page.data_mut();
        write_le(data, MAGIC_OFFSET, MAGIC)?;
        write_le(data, VERSION_OFFSET, CURRENT_VERSION)?;
        write_le(data, FLAGS_OFFSET, self.flags)?;
        write_le(data, PAGE_SIZE_OFFSET, page::PAGE_SIZE as u32)?;
        write_le(data, PAGE_COUNT_OFFSET, self.page_count)?;
        write_le(data, TOP_ROOT_OFFSET, self.top_root.to_bits())?;
        write_le(data, BACKLINK_ROOT_OFFSET, self.backlink_root.to_bits())?;
        for (i, v) in self.hint_pool.iter().enumerate() {
            write_le(data, HINT_POOL_OFFSET + i * 4, *v)?;
        }
        Ok(())
    }

    /// Page-hint-pool bucket index for a key at `level` (depth from its
    /// top-level tree's root), split between subkey and value collections:
    /// `(level>127)?254:(level<<1)`, +1 when `is_value`. Index 254 is the
    /// reserved back-link bucket; 255 is unused by any level-derived bucket
    /// below the overflow case.
    pub fn hint_index(level: u16, is_value: bool) -> usize {
        let base: usize = if level > 127 { 254 } else { (level as usize) << 1 };
        base + usize::from(is_value)
    }

    /// Reserved page-hint-pool index for the back-link tree's own root
    /// lookups.
    pub const BACKLINK_HINT_INDEX: usize = 254;

    pub fn hint(&self, index: usize) -> Option<u32> {
        match self.hint_pool[index] {
            0 => None,
            page_number => Some(page_number),
        }
    }

    pub fn set_hint(&mut self, index: usize, page_number: u32) {
        self.hint_pool[index] = page_number;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page::page_id::PageId;
    use page::page_type::PageType;

    #[test]
    fn header_round_trips_through_a_page() {
        let mut page = Page::new_zeroed(PageId::new(1, 0));
        page.initialize(PageId::new(1, 0), PageType::Header).unwrap();
        let mut header = FileHeader::fresh(true);
        header.top_root = NodeRef::new(3, 1);
        header.backlink_root = NodeRef::new(4, 2);
        header.page_count = 7;
        header.set_hint(FileHeader::hint_index(2, false), 5);
        header.write(&mut page).unwrap();

        let read_back = FileHeader::read(&page).unwrap();
        assert_eq!(read_back, header);
    }

    #[test]
    fn hint_index_reserves_254_for_overflow_and_backlink() {
        assert_eq!(FileHeader::hint_index(200, false), 254);
        assert_eq!(FileHeader::hint_index(200, true), 255);
        assert_eq!(FileHeader::hint_index(127, false), 254);
    }

    #[test]
    fn rejects_files_missing_the_magic() {
        let mut page = Page::new_zeroed(PageId::new(1, 0));
        page.initialize(PageId::new(1, 0), PageType::Header).unwrap();
        assert!(matches!(FileHeader::read(&page), Err(StoreError::NotAStore)));
    }
}

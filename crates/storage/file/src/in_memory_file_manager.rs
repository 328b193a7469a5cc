//! An in-memory [`FileManager`], used by integration tests that need a
//! store without touching disk.

use crate::api::FileManager;
use crate::errors::FileError;
use crate::file_catalog::FileCatalog;
use page::page_id::{FileId, PageId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// A `FileManager` that keeps every page in memory. Open/close/sync are
/// bookkeeping only — there is nothing to flush.
#[derive(Debug)]
pub struct InMemoryFileManager {
    file_catalog: Arc<FileCatalog>,
    open_files: RwLock<HashSet<FileId>>,
    pages: RwLock<HashMap<PageId, Box<[u8]>>>,
}

impl FileManager for InMemoryFileManager {
    fn new(file_catalog: Arc<FileCatalog>) -> Self {
        Self {
            file_catalog,
            open_files: RwLock::new(HashSet::new()),
            pages: RwLock::new(HashMap::new()),
        }
    }

    fn open_existing(&self, file_id: FileId) -> Result<(), FileError> {
        self.file_catalog
            .get_file_name(file_id)
            .ok_or(FileError::NotCataloged { file_id })?;
        self.open_files.write().unwrap().insert(file_id);
        Ok(())
    }

    fn create_truncate(&self, file_id: FileId) -> Result<(), FileError> {
        self.file_catalog
            .get_file_name(file_id)
            .ok_or(FileError::NotCataloged { file_id })?;
        self.pages
            .write()
            .unwrap()
            .retain(|page_id, _| page_id.file_id != file_id);
        self.open_files.write().unwrap().insert(file_id);
        Ok(())
    }

    fn close(&self, file_id: FileId) -> Result<(), FileError> {
        self.open_files.write().unwrap().remove(&file_id);
        Ok(())
    }

    fn sync(&self, file_id: FileId) -> Result<(), FileError> {
        if self.open_files.read().unwrap().contains(&file_id) {
            Ok(())
        } else {
            Err(FileError::NotOpen { file_id })
        }
    }

    fn read_page(&self, page_id: PageId, destination: &mut [u8]) -> bool {
        if let Some(page) = self.pages.read().unwrap().get(&page_id) {
            destination.copy_from_slice(page);
            true
        } else {
            false
        }
    }

    fn write_page(&self, page_id: PageId, page_data: &[u8]) {
        assert!(
            self.open_files.read().unwrap().contains(&page_id.file_id),
            "write_page on unopened file {}",
            page_id.file_id
        );
        let boxed = page_data.to_vec().into_boxed_slice();
        self.pages.write().unwrap().insert(page_id, boxed);
    }
}

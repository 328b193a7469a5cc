use crate::api::FileManager;
use crate::errors::FileError;
use crate::file_catalog::FileCatalog;
use page::PAGE_SIZE;
use page::page_id::{FileId, PageId};
use std::collections::HashMap;
use std::fs;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[cfg(unix)]
use std::os::unix::fs::FileExt;
#[cfg(windows)]
use std::os::windows::fs::FileExt;

/// A disk based file manager.
#[derive(Debug)]
pub struct DiskFileManager {
    files: RwLock<HashMap<FileId, Arc<File>>>,
    file_catalog: Arc<FileCatalog>,
}

impl FileManager for DiskFileManager {
    fn new(file_catalog: Arc<FileCatalog>) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            file_catalog,
        }
    }

    fn open_existing(&self, file_id: FileId) -> Result<(), FileError> {
        self.open(file_id, false)
    }

    fn create_truncate(&self, file_id: FileId) -> Result<(), FileError> {
        self.open(file_id, true)
    }

    fn close(&self, file_id: FileId) -> Result<(), FileError> {
        self.files.write().unwrap().remove(&file_id);
        Ok(())
    }

    fn sync(&self, file_id: FileId) -> Result<(), FileError> {
        let file = self
            .files
            .read()
            .unwrap()
            .get(&file_id)
            .cloned()
            .ok_or(FileError::NotOpen { file_id })?;
        file.sync_all().map_err(|source| FileError::Io { file_id, source })
    }

    fn read_page(&self, page_id: PageId, destination: &mut [u8]) -> bool {
        let Some(file) = self.get_open_file(page_id.file_id) else {
            return false;
        };

        let offset = (page_id.page_number as u64) * (PAGE_SIZE as u64);

        matches!(Self::read_at(file.as_ref(), destination, offset), Ok(n) if n == PAGE_SIZE)
    }

    fn write_page(&self, page_id: PageId, page_data: &[u8]) {
        let file = self
            .get_open_file(page_id.file_id)
            .unwrap_or_else(|| panic!("write_page on unopened file {}", page_id.file_id));

        let offset = (page_id.page_number as u64) * (PAGE_SIZE as u64);

        let mut written = 0;
        while written < PAGE_SIZE {
            let n = Self::write_at(
                file.as_ref(),
                &page_data[written..],
                offset + written as u64,
            )
            .expect("disk write failed");

            if n == 0 {
                panic!("disk write failed - wrote 0 bytes");
            }

            written += n;
        }
    }
}

impl DiskFileManager {
    fn get_open_file(&self, file_id: FileId) -> Option<Arc<File>> {
        self.files.read().unwrap().get(&file_id).cloned()
    }

    fn open(&self, file_id: FileId, truncate: bool) -> Result<(), FileError> {
        let path = self
            .file_catalog
            .get_file_name(file_id)
            .ok_or(FileError::NotCataloged { file_id })?;

        if truncate {
            Self::ensure_parent_dir(&path);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(truncate)
            .truncate(truncate)
            .open(&path)
            .map_err(|source| FileError::Io { file_id, source })?;

        self.files.write().unwrap().insert(file_id, Arc::new(file));
        Ok(())
    }

    #[inline]
    fn read_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        #[cfg(unix)]
        {
            file.read_at(buf, offset)
        }

        #[cfg(windows)]
        {
            file.seek_read(buf, offset)
        }
    }

    #[inline]
    fn write_at(file: &File, buf: &[u8], offset: u64) -> std::io::Result<usize> {
        #[cfg(unix)]
        {
            file.write_at(buf, offset)
        }

        #[cfg(windows)]
        {
            file.seek_write(buf, offset)
        }
    }

    fn ensure_parent_dir(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create data directory");
        }
    }
}

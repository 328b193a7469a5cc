use crate::config::EngineConfig;
use file::disk_file_manager::DiskFileManager;
use file::file_catalog::FileCatalog;
use std::sync::Arc;
use storage_api::{OpenFlags, Store, StoreError};

/// Owner of the singleton-like instances needed for the process lifetime:
/// the file catalog/manager and the open [`Store`] built on top of them.
#[derive(Debug)]
pub struct EngineEnvironment {
    pub store: Store<DiskFileManager>,
    pub engine_config: EngineConfig,
}

impl EngineEnvironment {
    pub fn open(config: EngineConfig) -> Result<Self, StoreError> {
        let file_catalog = Arc::new(FileCatalog::new());
        let path = config.storage.data_dir.join(&config.storage.file_name);
        file_catalog.add_file(1, path.clone());
        let file_manager = Arc::new(DiskFileManager::new(file_catalog));

        let mut flags = OpenFlags::READWRITE;
        if config.storage.autosave {
            flags = flags | OpenFlags::AUTOSAVE;
        }
        let flags = if path.exists() {
            flags
        } else {
            flags | OpenFlags::CREATE
        };

        let store = Store::open(file_manager, config.storage.cache_bytes.get(), flags)?;
        Ok(Self {
            store,
            engine_config: config,
        })
    }
}

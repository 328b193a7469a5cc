//! The store facade: opens/creates the file, holds the
//! header, exposes the public node operations, brackets each one with the
//! store-wide lock, and implements commit/rollback.
//!
//! Three lock tiers compose here: this module's `store_lock` is the
//! outermost (whole-store reader/writer lock); `BufferManager`'s per-row
//! `claim` mutex and per-page `RwLock` are the middle and innermost tiers,
//! already implemented in `buffer` and reached transparently through
//! `BufferSource`/`tree::Index`.

use crate::errors::{StoreError, StoreResult};
use crate::flags::{Collection, Direction, OpenFlags};
use crate::header::FileHeader;
use crate::page_source_impl::BufferSource;
use buffer::buffer::BufferManager;
use file::api::FileManager;
use page::page_id::{FileId, PageId};
use page::page_type::PageType;
use page::Page;
use std::cell::RefCell;
use std::sync::{Arc, RwLock};
use tree::{Index, InorderCursor, Node, NodeRef, NodeType, NodeValue, TreeError};

/// An opaque reference to a key or value node. `Handle::ROOT` addresses the
/// single top-level key collection (the only collection the store header
/// itself roots); every other handle is the `NodeRef` a prior operation
/// returned.
pub type Handle = NodeRef;

/// Minimum cache size accepted by `open`.
pub const MIN_CACHE_BYTES: usize = 64 * 1024;

/// Fixed file identifier the store registers its single backing file
/// under; a store is always exactly one file.
const FILE_ID: FileId = 1;
const HEADER_PAGE: u32 = 0;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn record_error(message: String) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

/// Returns the message of the most recent failure raised by any `Store`
/// operation on this thread — the last-error-message slot always names
/// the most recent failure.
pub fn last_error_message() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// An open store: the page cache, the live header, and the last-committed
/// header snapshot rollback restores from.
#[derive(Debug)]
pub struct Store<F: FileManager> {
    file_manager: Arc<F>,
    source: BufferSource<F>,
    header: RwLock<FileHeader>,
    old_header: RwLock<FileHeader>,
    store_lock: RwLock<()>,
    read_only: bool,
}

impl<F: FileManager> Store<F> {
    /// Opens (or creates) a store file under `flags`.
    pub fn open(file_manager: Arc<F>, cache_bytes: usize, flags: OpenFlags) -> StoreResult<Self> {
        if flags.contains(OpenFlags::CREATE) && flags.contains(OpenFlags::READONLY) {
            return Err(StoreError::InvalidFlags {
                reason: "CREATE is incompatible with READONLY",
            });
        }
        if !flags.contains(OpenFlags::READWRITE) && !flags.contains(OpenFlags::READONLY) {
            return Err(StoreError::InvalidFlags {
                reason: "at least one of READWRITE/READONLY is required",
            });
        }
        if cache_bytes < MIN_CACHE_BYTES {
            return Err(StoreError::Param("cache size must be at least 64 KiB"));
        }
        // Round down to the largest power of two not exceeding the requested
        // size.
        let cache_bytes = {
            let mut p = MIN_CACHE_BYTES;
            while p * 2 <= cache_bytes {
                p *= 2;
            }
            p
        };

        let autosave = flags.contains(OpenFlags::AUTOSAVE);
        let header_page_id = PageId::new(FILE_ID, HEADER_PAGE);

        let header = if flags.contains(OpenFlags::CREATE) {
            file_manager.create_truncate(FILE_ID)?;
            let header = FileHeader::fresh(autosave);
            let mut page = Page::new_zeroed(header_page_id);
            page.initialize(header_page_id, PageType::Header)
                .map_err(|_| StoreError::Corrupt)?;
            header.write(&mut page)?;
            page.recompute_checksum().map_err(|_| StoreError::Corrupt)?;
            file_manager.write_page(header_page_id, page.data());
            file_manager.sync(FILE_ID)?;
            header
        } else {
            file_manager.open_existing(FILE_ID)?;
            let mut page = Page::new_zeroed(header_page_id);
            if !file_manager.read_page(header_page_id, &mut page.data_mut()[..]) {
                return Err(StoreError::NotAStore);
            }
            if !page.verify_checksum().map_err(|_| StoreError::Corrupt)? {
                return Err(StoreError::Corrupt);
            }
            FileHeader::read(&page)?
        };

        let buffer = Arc::new(BufferManager::new(file_manager.clone(), cache_bytes, autosave));
        let source = BufferSource::new(buffer, FILE_ID, header.page_count);

        Ok(Self {
            file_manager,
            source,
            old_header: RwLock::new(header.clone()),
            header: RwLock::new(header),
            store_lock: RwLock::new(()),
            read_only: flags.contains(OpenFlags::READONLY) && !flags.contains(OpenFlags::READWRITE),
        })
    }

    /// Closes the store, syncing its file.
    pub fn close(self) -> StoreResult<()> {
        self.file_manager.close(FILE_ID)?;
        Ok(())
    }

    fn index(&self) -> Index<'_, BufferSource<F>> {
        Index::new(&self.source)
    }

    fn require_writable(&self) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }

    // ---- commit / rollback --------------------------------------------

    /// Commits all dirty pages (and the header) to the file. When `flush`
    /// is set, also calls the I/O port's `sync`.
    pub fn commit(&self, flush: bool) -> StoreResult<()> {
        let _guard = self.store_lock.write().unwrap();
        let result = (|| -> StoreResult<()> {
            self.source.buffer().flush_all_dirty()?;

            let mut header = self.header.write().unwrap().clone();
            header.page_count = self.source.next_page_number();
            let header_page_id = PageId::new(FILE_ID, HEADER_PAGE);
            let mut page = Page::new_zeroed(header_page_id);
            page.initialize(header_page_id, PageType::Header)
                .map_err(|_| StoreError::Corrupt)?;
            header.write(&mut page).map_err(|_| StoreError::Corrupt)?;
            page.recompute_checksum().map_err(|_| StoreError::Corrupt)?;
            self.file_manager.write_page(header_page_id, page.data());
            if flush {
                self.file_manager.sync(FILE_ID)?;
            }

            *self.header.write().unwrap() = header.clone();
            *self.old_header.write().unwrap() = header;
            Ok(())
        })();
        self.track(result)
    }

    /// Rolls the store back to the last committed header.
    pub fn rollback(&self) -> StoreResult<()> {
        let _guard = self.store_lock.write().unwrap();
        self.rollback_locked();
        Ok(())
    }

    fn rollback_locked(&self) {
        self.source.buffer().invalidate_dirty_and_clear_locks();
        let old = self.old_header.read().unwrap().clone();
        self.source.reset_next_page_number(old.page_count);
        *self.header.write().unwrap() = old;
    }

    /// Runs a mutating operation, rolling the store back if it fails
    /// (release locks and invoke rollback on any raised error from inside
    /// a mutating call).
    fn with_rollback<T>(&self, f: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        match f() {
            Ok(v) => Ok(v),
            Err(e) => {
                self.rollback_locked();
                Err(e)
            }
        }
    }

    /// Diagnostic: true if no occupied cache slot has a nonzero lock count
    /// (the no-locked-entries invariant).
    pub fn check_cache_consistency(&self) -> bool {
        self.source.buffer().check_consistency()
    }

    /// The total page count (header page plus every allocated data page)
    /// as of the last commit.
    pub fn page_count(&self) -> u32 {
        self.header.read().unwrap().page_count
    }

    fn track<T>(&self, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(ref e) = result {
            record_error(e.to_string());
        }
        result
    }

    // ---- collection resolution -----------------------------------------

    /// Resolves `(parent, collection)` to the root of the AVL tree that
    /// collection lives in, plus the level used to index the page-hint
    /// pool (the owning key's own level; 0 at the top).
    fn resolve(&self, parent: Option<Handle>, collection: Collection) -> StoreResult<(NodeRef, u16)> {
        match parent {
            None => {
                if collection != Collection::Keys {
                    return Err(StoreError::InvalidOperation {
                        reason: "the top level only has a key collection",
                    });
                }
                Ok((self.header.read().unwrap().top_root, 0))
            }
            Some(handle) => {
                let node = self.index().read_node(handle)?;
                let NodeValue::Key {
                    subkey_root,
                    value_root,
                    level,
                } = node.value
                else {
                    return Err(StoreError::TypeMismatch {
                        reference: handle,
                        expected: "Key",
                        actual: node.value.node_type(),
                    });
                };
                let root = match collection {
                    Collection::Keys => subkey_root,
                    Collection::Values => value_root,
                };
                Ok((root, level))
            }
        }
    }

    /// Persists a new collection root back into its owner: `header.top_root`
    /// for the top level, or the appropriate field of the parent key.
    fn set_collection_root(
        &self,
        parent: Option<Handle>,
        collection: Collection,
        new_root: NodeRef,
    ) -> StoreResult<()> {
        match parent {
            None => {
                self.header.write().unwrap().top_root = new_root;
                Ok(())
            }
            Some(handle) => {
                let mut node = self.index().read_node(handle)?;
                let NodeValue::Key {
                    subkey_root,
                    value_root,
                    level,
                } = node.value
                else {
                    return Err(StoreError::TypeMismatch {
                        reference: handle,
                        expected: "Key",
                        actual: node.value.node_type(),
                    });
                };
                node.value = match collection {
                    Collection::Keys => NodeValue::Key {
                        subkey_root: new_root,
                        value_root,
                        level,
                    },
                    Collection::Values => NodeValue::Key {
                        subkey_root,
                        value_root: new_root,
                        level,
                    },
                };
                self.write_node_value(handle, node.value)
            }
        }
    }

    fn write_node_value(&self, handle: Handle, value: NodeValue) -> StoreResult<()> {
        self.index().update_value(handle, value)?;
        Ok(())
    }

    fn hint_index(collection: Collection, level: u16) -> usize {
        FileHeader::hint_index(level, collection == Collection::Values)
    }

    // ---- find / inspect --------------------------------------------------

    /// Finds the node named `name` under `parent`'s `collection`.
    pub fn find(
        &self,
        parent: Option<Handle>,
        collection: Collection,
        name: &[u8],
    ) -> StoreResult<Option<Handle>> {
        let _guard = self.store_lock.read().unwrap();
        self.track((|| {
            let (root, _level) = self.resolve(parent, collection)?;
            Ok(self.index().search(root, name)?)
        })())
    }

    fn read(&self, handle: Handle) -> StoreResult<Node> {
        Ok(self.index().read_node(handle)?)
    }

    /// The type of node `handle` refers to.
    pub fn node_type(&self, handle: Handle) -> StoreResult<NodeType> {
        let _guard = self.store_lock.read().unwrap();
        self.track(self.read(handle).map(|n| n.node_type()))
    }

    // ---- create ------------------------------------------------------

    fn create_leaf(
        &self,
        parent: Option<Handle>,
        collection: Collection,
        name: &[u8],
        value: NodeValue,
    ) -> StoreResult<Handle> {
        self.require_writable()?;
        let _guard = self.store_lock.write().unwrap();
        let (root, level) = self.resolve(parent, collection)?;
        let result = self.with_rollback(|| {
            let hint_idx = Self::hint_index(collection, level);
            let preferred = self.header.read().unwrap().hint(hint_idx);
            let (new_root, new_ref) = self
                .index()
                .insert(root, preferred, name.to_vec(), value)
                .map_err(|e| map_insert_error(e, parent.unwrap_or(NodeRef::NULL), name))?;
            self.set_collection_root(parent, collection, new_root)?;
            self.header.write().unwrap().set_hint(hint_idx, new_ref.page_number);
            Ok(new_ref)
        });
        self.track(result)
    }

    /// Creates a subkey named `name` under `parent` (`None` for the top
    /// level).
    pub fn create_key(&self, parent: Option<Handle>, name: &[u8]) -> StoreResult<Handle> {
        let parent_level = match parent {
            None => 0,
            Some(handle) => {
                let node = self.read(handle)?;
                match node.value {
                    NodeValue::Key { level, .. } => level,
                    other => {
                        return Err(StoreError::TypeMismatch {
                            reference: handle,
                            expected: "Key",
                            actual: other.node_type(),
                        });
                    }
                }
            }
        };
        self.create_leaf(
            parent,
            Collection::Keys,
            name,
            NodeValue::Key {
                subkey_root: NodeRef::NULL,
                value_root: NodeRef::NULL,
                level: parent_level + 1,
            },
        )
    }

    pub fn create_int32(&self, parent: Handle, name: &[u8], value: i32) -> StoreResult<Handle> {
        self.create_leaf(Some(parent), Collection::Values, name, NodeValue::Int32(value))
    }

    pub fn create_int64(&self, parent: Handle, name: &[u8], value: i64) -> StoreResult<Handle> {
        self.create_leaf(Some(parent), Collection::Values, name, NodeValue::Int64(value))
    }

    pub fn create_double(&self, parent: Handle, name: &[u8], value: f64) -> StoreResult<Handle> {
        self.create_leaf(Some(parent), Collection::Values, name, NodeValue::Double(value))
    }

    pub fn create_string(&self, parent: Handle, name: &[u8], value: &str) -> StoreResult<Handle> {
        self.create_leaf(
            Some(parent),
            Collection::Values,
            name,
            NodeValue::ShortString(value.to_string()),
        )
    }

    pub fn create_binary(&self, parent: Handle, name: &[u8], value: &[u8]) -> StoreResult<Handle> {
        self.create_leaf(
            Some(parent),
            Collection::Values,
            name,
            NodeValue::ShortBinary(value.to_vec()),
        )
    }

    /// Creates a link named `name` under `parent`, pointing at `target`,
    /// and maintains the back-link companion entry.
    pub fn create_link(&self, parent: Handle, name: &[u8], target: Handle) -> StoreResult<Handle> {
        self.require_writable()?;
        let _guard = self.store_lock.write().unwrap();
        let (root, level) = self.resolve(Some(parent), Collection::Values)?;
        let result = self.with_rollback(|| {
            let hint_idx = Self::hint_index(Collection::Values, level);
            let preferred = self.header.read().unwrap().hint(hint_idx);
            let (new_root, new_ref) = self
                .index()
                .insert(root, preferred, name.to_vec(), NodeValue::Link(target))
                .map_err(|e| map_insert_error(e, parent, name))?;
            self.set_collection_root(Some(parent), Collection::Values, new_root)?;
            self.header.write().unwrap().set_hint(hint_idx, new_ref.page_number);
            self.create_backlink(target, new_ref)?;
            Ok(new_ref)
        });
        self.track(result)
    }

    fn create_backlink(&self, target: Handle, source: Handle) -> StoreResult<()> {
        let target_name = target.to_bits().to_le_bytes().to_vec();
        let backlink_root = self.header.read().unwrap().backlink_root;
        let target_key_ref = match self.index().search(backlink_root, &target_name)? {
            Some(existing) => existing,
            None => {
                let hint = self.header.read().unwrap().hint(FileHeader::BACKLINK_HINT_INDEX);
                let (new_backlink_root, new_ref) = self.index().insert(
                    backlink_root,
                    hint,
                    target_name,
                    NodeValue::Key {
                        subkey_root: NodeRef::NULL,
                        value_root: NodeRef::NULL,
                        level: 0,
                    },
                )?;
                self.header.write().unwrap().backlink_root = new_backlink_root;
                self.header
                    .write()
                    .unwrap()
                    .set_hint(FileHeader::BACKLINK_HINT_INDEX, new_ref.page_number);
                new_ref
            }
        };

        let target_key = self.read(target_key_ref)?;
        let NodeValue::Key { value_root, .. } = target_key.value else {
            unreachable!("just inserted or found a Key node");
        };
        let source_name = source.to_bits().to_le_bytes().to_vec();
        let (new_value_root, _) = self
            .index()
            .insert(value_root, None, source_name, NodeValue::Link(target))?;
        self.write_node_value(
            target_key_ref,
            NodeValue::Key {
                subkey_root: NodeRef::NULL,
                value_root: new_value_root,
                level: 0,
            },
        )
    }

    fn delete_backlink(&self, target: Handle, source: Handle) -> StoreResult<()> {
        let target_name = target.to_bits().to_le_bytes().to_vec();
        let backlink_root = self.header.read().unwrap().backlink_root;
        let Some(target_key_ref) = self.index().search(backlink_root, &target_name)? else {
            return Ok(());
        };
        let target_key = self.read(target_key_ref)?;
        let NodeValue::Key { value_root, .. } = target_key.value else {
            return Ok(());
        };
        let source_name = source.to_bits().to_le_bytes();
        let new_value_root = self.index().delete(value_root, &source_name)?;
        if new_value_root.is_null() {
            let new_backlink_root = self.index().delete(backlink_root, &target_name)?;
            self.header.write().unwrap().backlink_root = new_backlink_root;
        } else {
            self.write_node_value(
                target_key_ref,
                NodeValue::Key {
                    subkey_root: NodeRef::NULL,
                    value_root: new_value_root,
                    level: 0,
                },
            )?;
        }
        Ok(())
    }

    /// True if some link anywhere in the store still points at `handle`.
    fn is_linked(&self, handle: Handle) -> StoreResult<bool> {
        let backlink_root = self.header.read().unwrap().backlink_root;
        let name = handle.to_bits().to_le_bytes();
        Ok(self.index().search(backlink_root, &name)?.is_some())
    }

    // ---- get -----------------------------------------------------------

    /// The name `handle` was created under.
    pub fn get_name(&self, handle: Handle) -> StoreResult<Vec<u8>> {
        let _guard = self.store_lock.read().unwrap();
        self.track(self.read(handle).map(|n| n.name))
    }

    /// The node's current value, regardless of its concrete type — the
    /// generic counterpart to the typed `get_*` accessors below.
    pub fn get_value(&self, handle: Handle) -> StoreResult<NodeValue> {
        let _guard = self.store_lock.read().unwrap();
        self.track(self.read(handle).map(|n| n.value))
    }

    pub fn get_int32(&self, handle: Handle) -> StoreResult<i32> {
        self.get_typed(handle, "Int32", |v| match v {
            NodeValue::Int32(n) => Some(*n),
            _ => None,
        })
    }

    pub fn get_int64(&self, handle: Handle) -> StoreResult<i64> {
        self.get_typed(handle, "Int64", |v| match v {
            NodeValue::Int64(n) => Some(*n),
            _ => None,
        })
    }

    pub fn get_double(&self, handle: Handle) -> StoreResult<f64> {
        self.get_typed(handle, "Double", |v| match v {
            NodeValue::Double(n) => Some(*n),
            _ => None,
        })
    }

    pub fn get_string(&self, handle: Handle) -> StoreResult<String> {
        self.get_typed(handle, "ShortString", |v| match v {
            NodeValue::ShortString(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn get_binary(&self, handle: Handle) -> StoreResult<Vec<u8>> {
        self.get_typed(handle, "ShortBinary", |v| match v {
            NodeValue::ShortBinary(b) => Some(b.clone()),
            _ => None,
        })
    }

    pub fn get_link_target(&self, handle: Handle) -> StoreResult<Handle> {
        self.get_typed(handle, "Link", |v| match v {
            NodeValue::Link(t) => Some(*t),
            _ => None,
        })
    }

    fn get_typed<T>(
        &self,
        handle: Handle,
        expected: &'static str,
        extract: impl FnOnce(&NodeValue) -> Option<T>,
    ) -> StoreResult<T> {
        let _guard = self.store_lock.read().unwrap();
        self.track((|| {
            let node = self.read(handle)?;
            extract(&node.value).ok_or(StoreError::TypeMismatch {
                reference: handle,
                expected,
                actual: node.value.node_type(),
            })
        })())
    }

    // ---- update ----------------------------------------------------------

    fn update_leaf(&self, handle: Handle, expected: NodeType, value: NodeValue) -> StoreResult<()> {
        self.require_writable()?;
        let _guard = self.store_lock.write().unwrap();
        let result = self.with_rollback(|| {
            let current = self.read(handle)?;
            if current.node_type() != expected {
                return Err(StoreError::TypeMismatch {
                    reference: handle,
                    expected: "matching value type",
                    actual: current.node_type(),
                });
            }
            self.write_node_value(handle, value)
        });
        self.track(result)
    }

    pub fn update_int32(&self, handle: Handle, value: i32) -> StoreResult<()> {
        self.update_leaf(handle, NodeType::Int32, NodeValue::Int32(value))
    }

    pub fn update_int64(&self, handle: Handle, value: i64) -> StoreResult<()> {
        self.update_leaf(handle, NodeType::Int64, NodeValue::Int64(value))
    }

    pub fn update_double(&self, handle: Handle, value: f64) -> StoreResult<()> {
        self.update_leaf(handle, NodeType::Double, NodeValue::Double(value))
    }

    pub fn update_string(&self, handle: Handle, value: &str) -> StoreResult<()> {
        self.update_leaf(handle, NodeType::ShortString, NodeValue::ShortString(value.to_string()))
    }

    pub fn update_binary(&self, handle: Handle, value: &[u8]) -> StoreResult<()> {
        self.update_leaf(handle, NodeType::ShortBinary, NodeValue::ShortBinary(value.to_vec()))
    }

    // ---- delete ------------------------------------------------------

    /// Deletes the node named `name` under `parent`'s `collection`,
    /// enforcing the delete-time invariants (a key must be empty; a node
    /// any link still targets cannot be removed).
    pub fn delete(&self, parent: Option<Handle>, collection: Collection, name: &[u8]) -> StoreResult<()> {
        self.require_writable()?;
        let _guard = self.store_lock.write().unwrap();
        let (root, _level) = self.resolve(parent, collection)?;
        let target_ref = self
            .index()
            .search(root, name)?
            .ok_or(StoreError::NotFound)?;
        let target = self.read(target_ref)?;
        if let NodeValue::Key {
            subkey_root,
            value_root,
            ..
        } = target.value
        {
            if !subkey_root.is_null() || !value_root.is_null() {
                return Err(StoreError::InvalidOperation {
                    reason: "key still has subkeys or values",
                });
            }
        }
        if self.is_linked(target_ref)? {
            return Err(StoreError::InvalidOperation {
                reason: "a link still points at this node",
            });
        }

        let result = self.with_rollback(|| {
            if let NodeValue::Link(link_target) = target.value {
                self.delete_backlink(link_target, target_ref)?;
            }
            let new_root = self.index().delete(root, name)?;
            self.set_collection_root(parent, collection, new_root)?;
            Ok(())
        });
        self.track(result)
    }

    // ---- inorder iteration --------------------------------------------

    /// Positions a cursor at the first node (or the first `>= start`
    /// ascending / `<= start` descending) and returns it along with that
    /// node, if any.
    pub fn inorder_first(
        &self,
        parent: Option<Handle>,
        collection: Collection,
        start: Option<&[u8]>,
        direction: Direction,
    ) -> StoreResult<(InorderCursor, Option<Handle>)> {
        let _guard = self.store_lock.read().unwrap();
        self.track((|| {
            let (root, _level) = self.resolve(parent, collection)?;
            Ok(self
                .index()
                .inorder_first(root, start, direction == Direction::Ascending)?)
        })())
    }

    /// Advances a cursor previously returned by `inorder_first`.
    pub fn inorder_next(&self, cursor: &mut InorderCursor) -> StoreResult<Option<Handle>> {
        let _guard = self.store_lock.read().unwrap();
        self.track(Ok(self.index().inorder_next(cursor)?))
    }
}

fn map_insert_error(error: TreeError, parent: NodeRef, name: &[u8]) -> StoreError {
    match error {
        TreeError::Exists { .. } => StoreError::Exists {
            parent,
            name: name.to_vec(),
        },
        other => other.into(),
    }
}

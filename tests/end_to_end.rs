//! End-to-end scenarios over the public `Store` API: commit/reopen
//! durability, duplicate-name rejection, a large ordered insert-then-scan,
//! the link/back-link delete-refusal discipline, abort-on-evict-without-
//! autosave, and on-disk corruption detection.

use file::api::FileManager;
use file::disk_file_manager::DiskFileManager;
use file::file_catalog::FileCatalog;
use file::in_memory_file_manager::InMemoryFileManager;
use nodedb::{Collection, Direction, MIN_CACHE_BYTES, OpenFlags, Store, StoreError};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::Arc;

fn in_memory_store(flags: OpenFlags) -> (Arc<InMemoryFileManager>, Store<InMemoryFileManager>) {
    let catalog = Arc::new(FileCatalog::new());
    catalog.add_file(1, PathBuf::from("test.db"));
    let fm = Arc::new(InMemoryFileManager::new(catalog));
    let store = Store::open(fm.clone(), MIN_CACHE_BYTES, flags).unwrap();
    (fm, store)
}

#[test]
fn commit_close_reopen_preserves_the_tree() {
    let (fm, store) = in_memory_store(OpenFlags::READWRITE | OpenFlags::CREATE);

    let a = store.create_key(None, b"a").unwrap();
    store.create_int32(a, b"n", 42).unwrap();
    store.commit(true).unwrap();
    store.close().unwrap();

    let store = Store::open(fm, MIN_CACHE_BYTES, OpenFlags::READWRITE).unwrap();
    let a = store
        .find(None, Collection::Keys, b"a")
        .unwrap()
        .expect("key a survives reopen");
    let n = store
        .find(Some(a), Collection::Values, b"n")
        .unwrap()
        .expect("value n survives reopen");
    assert_eq!(store.get_int32(n).unwrap(), 42);
    assert!(store.page_count() >= 2);
}

#[test]
fn duplicate_create_is_rejected_and_leaves_prior_value_intact() {
    let (_fm, store) = in_memory_store(OpenFlags::READWRITE | OpenFlags::CREATE);

    let k = store.create_key(None, b"k").unwrap();
    store.create_int32(k, b"x", 1).unwrap();

    let err = store.create_int32(k, b"x", 2).unwrap_err();
    assert!(matches!(err, StoreError::Exists { .. }));

    let x = store.find(Some(k), Collection::Values, b"x").unwrap().unwrap();
    assert_eq!(store.get_int32(x).unwrap(), 1);
}

#[test]
fn ten_thousand_sequential_values_scan_in_ascending_order() {
    let (_fm, store) = in_memory_store(OpenFlags::READWRITE | OpenFlags::CREATE);

    let bucket = store.create_key(None, b"bucket").unwrap();

    const N: i64 = 10_000;
    for i in 0..N {
        let name = format!("{i:06}");
        store.create_int64(bucket, name.as_bytes(), i).unwrap();
    }

    let (mut cursor, first) = store
        .inorder_first(Some(bucket), Collection::Values, None, Direction::Ascending)
        .unwrap();

    let mut count = 0i64;
    let mut sum = 0i64;
    let mut previous: Option<i64> = None;
    let mut next = first;
    while let Some(handle) = next {
        let value = store.get_int64(handle).unwrap();
        if let Some(prev) = previous {
            assert!(value > prev, "traversal must be strictly ascending");
        }
        previous = Some(value);
        sum += value;
        count += 1;
        next = store.inorder_next(&mut cursor).unwrap();
    }

    assert_eq!(count, N);
    assert_eq!(sum, N * (N - 1) / 2);
}

#[test]
fn deleting_a_linked_value_is_refused_until_the_link_is_gone() {
    let (_fm, store) = in_memory_store(OpenFlags::READWRITE | OpenFlags::CREATE);

    let a = store.create_key(None, b"A").unwrap();
    let b = store.create_key(None, b"B").unwrap();
    let v = store.create_int32(b, b"v", 7).unwrap();
    store.create_link(a, b"L", v).unwrap();

    let err = store.delete(Some(b), Collection::Values, b"v").unwrap_err();
    assert!(matches!(err, StoreError::InvalidOperation { .. }));
    assert!(store.find(Some(b), Collection::Values, b"v").unwrap().is_some());

    store.delete(Some(a), Collection::Values, b"L").unwrap();
    store.delete(Some(b), Collection::Values, b"v").unwrap();
    assert!(store.find(Some(b), Collection::Values, b"v").unwrap().is_none());
}

#[test]
fn abort_on_dirty_eviction_without_autosave_leaves_the_committed_state_intact() {
    let catalog = Arc::new(FileCatalog::new());
    catalog.add_file(1, PathBuf::from("scenario5.db"));
    let fm = Arc::new(InMemoryFileManager::new(catalog));
    let store = Store::open(
        fm,
        MIN_CACHE_BYTES,
        OpenFlags::READWRITE | OpenFlags::CREATE,
    )
    .unwrap();

    store.commit(true).unwrap();

    let mut aborted = false;
    for i in 0..20_000i64 {
        let name = format!("key-{i:06}");
        match store.create_key(None, name.as_bytes()) {
            Ok(_) => {}
            Err(StoreError::Abort(_)) => {
                aborted = true;
                break;
            }
            Err(e) => panic!("unexpected error before eviction pressure hit: {e}"),
        }
    }
    assert!(aborted, "expected cache pressure to eventually abort a create");

    // An abort rolls the store back to the last commit, so nothing from the
    // aborted run (or the run leading up to it) should be visible.
    assert!(store.find(None, Collection::Keys, b"key-000000").unwrap().is_none());
    assert!(store.check_cache_consistency());
}

#[test]
fn corrupted_data_page_is_reported_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.db");

    let catalog = Arc::new(FileCatalog::new());
    catalog.add_file(1, path.clone());
    let fm = Arc::new(DiskFileManager::new(catalog));
    let store = Store::open(
        fm,
        MIN_CACHE_BYTES,
        OpenFlags::READWRITE | OpenFlags::CREATE,
    )
    .unwrap();
    store.create_key(None, b"a").unwrap();
    store.commit(true).unwrap();
    store.close().unwrap();

    // Flip a byte inside the first data page (page 1, right after the
    // 4 KiB header page), well clear of the checksum field.
    let mut file = std::fs::OpenOptions::new().write(true).read(true).open(&path).unwrap();
    file.seek(SeekFrom::Start(4096 + 40)).unwrap();
    let mut byte = [0u8; 1];
    file.read_exact(&mut byte).unwrap();
    file.seek(SeekFrom::Start(4096 + 40)).unwrap();
    file.write_all(&[byte[0] ^ 0xFF]).unwrap();
    file.sync_all().unwrap();
    drop(file);

    let catalog = Arc::new(FileCatalog::new());
    catalog.add_file(1, path);
    let fm = Arc::new(DiskFileManager::new(catalog));
    let store = Store::open(fm, MIN_CACHE_BYTES, OpenFlags::READWRITE).unwrap();

    let err = store.find(None, Collection::Keys, b"a").unwrap_err();
    assert!(matches!(err, StoreError::Corrupt));
}

#[test]
fn update_then_get_observes_the_new_value() {
    let (_fm, store) = in_memory_store(OpenFlags::READWRITE | OpenFlags::CREATE);

    let k = store.create_key(None, b"k").unwrap();
    let v = store.create_string(k, b"s", "before").unwrap();
    store.update_string(v, "after").unwrap();
    assert_eq!(store.get_string(v).unwrap(), "after");
}

#[test]
fn rollback_discards_uncommitted_creates() {
    let (_fm, store) = in_memory_store(OpenFlags::READWRITE | OpenFlags::CREATE);

    store.create_key(None, b"committed").unwrap();
    store.commit(true).unwrap();

    store.create_key(None, b"uncommitted").unwrap();
    store.rollback().unwrap();

    assert!(store.find(None, Collection::Keys, b"committed").unwrap().is_some());
    assert!(store.find(None, Collection::Keys, b"uncommitted").unwrap().is_none());
}

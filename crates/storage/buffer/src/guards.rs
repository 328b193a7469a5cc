//! `guard`-like structs providing access to a `Page` borrowed from the
//! cache. Dropping a guard releases the page's lock count — the only way a
//! page's lock count goes back down.

use page::Page;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

/// Shared access to a cached page. Multiple readers may hold one
/// concurrently.
#[derive(Debug)]
pub struct PageReadGuard<'a> {
    pub(crate) guard: RwLockReadGuard<'a, Box<Page>>,
    pub(crate) lock_count: &'a AtomicI64,
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl Drop for PageReadGuard<'_> {
    fn drop(&mut self) {
        self.lock_count.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Exclusive access to a cached page.
#[derive(Debug)]
pub struct PageWriteGuard<'a> {
    pub(crate) guard: RwLockWriteGuard<'a, Box<Page>>,
    pub(crate) lock_count: &'a AtomicI64,
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for PageWriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl Drop for PageWriteGuard<'_> {
    fn drop(&mut self) {
        self.lock_count.fetch_sub(1, Ordering::AcqRel);
    }
}

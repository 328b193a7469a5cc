//! The seam between the AVL index and wherever pages actually live. `tree`
//! only depends on `page`; `storage-api` supplies the real implementation
//! backed by its `BufferManager`, so the cache/locking machinery (spec
//! §4.4/§5) never has to be known about here.

use page::Page;
use std::ops::{Deref, DerefMut};

/// Shared or exclusive access to a single page, kept alive for as long as
/// the caller needs it — long enough to do hand-over-hand locking (spec
/// §4.3/§9: lock the child before releasing the parent).
pub trait PageSource {
    type Read<'a>: Deref<Target = Page> + 'a
    where
        Self: 'a;
    type Write<'a>: DerefMut<Target = Page> + 'a
    where
        Self: 'a;
    /// Opaque error surfaced by the backing cache/file layer.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Shared access to the page with this number, loading it if needed.
    fn read(&self, page_number: u32) -> Result<Self::Read<'_>, Self::Error>;
    /// Exclusive access to the page with this number, loading it if needed.
    fn write(&self, page_number: u32) -> Result<Self::Write<'_>, Self::Error>;
    /// Allocates and zero-initializes a fresh `Keys` page, returning its
    /// number and an exclusive guard on it.
    fn allocate(&self) -> Result<(u32, Self::Write<'_>), Self::Error>;
}

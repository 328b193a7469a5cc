//! Slotted 4 KiB page format and in-page allocator.
//!
//! Every page belonging to a store file is exactly [`PAGE_SIZE`] bytes: a
//! fixed [`header`] followed by a data region that grows upward and a slot
//! array that grows downward from the end of the page (see [`page`] for the
//! full layout). This crate only knows about bytes, slots and headers — node
//! encoding, keys, and the AVL index built on top of it live in the `tree`
//! crate.

pub mod checksum;
pub mod errors;
pub mod header;
pub mod insertion_plan;
pub mod page;
pub mod page_id;
pub mod page_type;
pub(crate) mod slot;
pub(crate) mod slot_array;

pub use header::HEADER_SIZE;
pub use page::api::Page;

/// Fixed size, in bytes, of every page in a store file.
pub const PAGE_SIZE: usize = 4096;

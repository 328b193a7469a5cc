//! Little-endian integer codec and narrowing conversions shared by the
//! storage crates.
//!
//! Every on-disk field (page header, slot, node header, typed payload) is
//! read and written through [`le::read_le`]/[`le::write_le`] so the byte
//! layout stays centralized in one place instead of scattered `from_le_bytes`
//! calls.

pub mod bin_error;
pub mod conversions;
pub mod le;

pub use bin_error::BinaryError;
pub use conversions::{ConversionError, UsizeConversion};

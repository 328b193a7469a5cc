use thiserror::Error;

/// Errors raised while reading or writing fields of a page header.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("Header error")]
    BinaryError(#[from] binary_helpers::bin_error::BinaryError),
    #[error("Arithmetic error while computing offsets within header")]
    OffsetArithmetic,
    #[error("Provided slice length ({actual}) does not match the expected length")]
    HeaderSliceSizeMismatch { actual: usize, expected: usize },
}

use thiserror::Error;

/// Errors raised while decoding or encoding the bytes of a single node
/// record.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("binary error decoding node record")]
    Binary(#[from] binary_helpers::bin_error::BinaryError),
    #[error("node name is {len} bytes, which exceeds the {max}-byte limit")]
    NameTooLong { len: usize, max: usize },
    #[error("short value is {len} bytes, which exceeds the {max}-byte limit")]
    ValueTooLong { len: usize, max: usize },
    #[error("node record is {actual} bytes, too small to hold a {node_type:?} payload")]
    RecordTooSmall { node_type: u8, actual: usize },
    #[error("expected a node of type {expected:?}, found {actual:?}")]
    TypeMismatch { expected: &'static str, actual: u8 },
    #[error("short string payload is not valid UTF-8")]
    InvalidUtf8,
}

use std::convert::TryFrom;

/// Discriminates the payload carried by a node record.
///
/// `Key` nodes form the subkey hierarchy; every other variant is a value
/// leaf attached under a key's value tree, except `Link`, which is attached
/// under a key's value tree but whose payload is itself a [`crate::NodeRef`]
/// pointing at another key elsewhere in the same store.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// A key: carries a subkey-tree root and a value-tree root.
    Key = 0,
    /// A 32-bit signed integer value.
    Int32 = 1,
    /// A 64-bit signed integer value.
    Int64 = 2,
    /// A 64-bit floating point value.
    Double = 3,
    /// A short (inline) UTF-8 string value.
    ShortString = 4,
    /// A short (inline) binary value.
    ShortBinary = 5,
    /// A long string value, stored as a chunk-tree envelope.
    LongString = 6,
    /// A long binary value, stored as a chunk-tree envelope.
    LongBinary = 7,
    /// A link to another key elsewhere in the store.
    Link = 8,
}

impl NodeType {
    /// Whether this type's payload is a variable-length inline value
    /// (short string/binary) requiring a length prefix.
    pub fn is_short_variable(self) -> bool {
        matches!(self, NodeType::ShortString | NodeType::ShortBinary)
    }

    /// Whether this type's payload is the fixed 8-byte envelope of an
    /// unimplemented long (chunked) value.
    pub fn is_long_variable(self) -> bool {
        matches!(self, NodeType::LongString | NodeType::LongBinary)
    }
}

impl From<NodeType> for u8 {
    fn from(t: NodeType) -> Self {
        t as u8
    }
}

impl TryFrom<u8> for NodeType {
    type Error = ();

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(NodeType::Key),
            1 => Ok(NodeType::Int32),
            2 => Ok(NodeType::Int64),
            3 => Ok(NodeType::Double),
            4 => Ok(NodeType::ShortString),
            5 => Ok(NodeType::ShortBinary),
            6 => Ok(NodeType::LongString),
            7 => Ok(NodeType::LongBinary),
            8 => Ok(NodeType::Link),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u8() {
        for t in [
            NodeType::Key,
            NodeType::Int32,
            NodeType::Int64,
            NodeType::Double,
            NodeType::ShortString,
            NodeType::ShortBinary,
            NodeType::LongString,
            NodeType::LongBinary,
            NodeType::Link,
        ] {
            assert_eq!(NodeType::try_from(u8::from(t)).unwrap(), t);
        }
    }

    #[test]
    fn rejects_unknown_discriminant() {
        assert!(NodeType::try_from(200).is_err());
    }
}

use std::fmt;

/// A reference to a node record: the page it lives on and the slot within
/// that page's slot array. Page 0 is always the store header and never
/// holds node slots, so `NodeRef { page_number: 0, slot: 0 }` doubles as the
/// null reference — mirroring the "offset 0 means null" convention of a
/// flat-file node reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeRef {
    /// The page the node's row lives on.
    pub page_number: u32,
    /// The slot index of the node's row within that page.
    pub slot: u32,
}

impl NodeRef {
    /// The null reference: no node.
    pub const NULL: NodeRef = NodeRef {
        page_number: 0,
        slot: 0,
    };

    /// Builds a reference to a specific page/slot pair.
    pub fn new(page_number: u32, slot: u32) -> Self {
        Self { page_number, slot }
    }

    /// Whether this reference points at no node.
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Packs the reference into a single 64-bit value for on-disk storage.
    pub fn to_bits(self) -> u64 {
        ((self.page_number as u64) << 32) | self.slot as u64
    }

    /// Unpacks a 64-bit on-disk value into a reference.
    pub fn from_bits(bits: u64) -> Self {
        Self {
            page_number: (bits >> 32) as u32,
            slot: (bits & 0xFFFF_FFFF) as u32,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page_number, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_page_zero_slot_zero() {
        assert!(NodeRef::NULL.is_null());
        assert!(NodeRef::default().is_null());
    }

    #[test]
    fn bits_round_trip() {
        let r = NodeRef::new(7, 3);
        assert_eq!(NodeRef::from_bits(r.to_bits()), r);
    }

    #[test]
    fn non_null_reference_reports_as_such() {
        assert!(!NodeRef::new(1, 0).is_null());
    }
}

use std::convert::TryFrom;

/// Enumeration of the page kinds a store file can contain.
///
/// A store file has exactly one [`PageType::Header`] page (page 0, holding
/// the file-level metadata and free-page-list head) and any number of
/// [`PageType::Keys`] pages, each a slotted container of AVL tree nodes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// The single metadata page at the start of every store file.
    Header = 0,
    /// A slotted page holding tree node records.
    Keys = 1,
}

impl From<PageType> for u16 {
    /// Converts a `PageType` enum variant to its corresponding `u16` value.
    fn from(p: PageType) -> Self {
        p as u16
    }
}

impl TryFrom<u16> for PageType {
    type Error = ();

    /// Attempts to convert a `u16` value to its corresponding `PageType` enum variant.
    fn try_from(v: u16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(PageType::Header),
            1 => Ok(PageType::Keys),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_from_u16() {
        assert_eq!(u16::from(PageType::Header), 0);
        assert_eq!(u16::from(PageType::Keys), 1);

        assert_eq!(PageType::try_from(0).unwrap(), PageType::Header);
        assert_eq!(PageType::try_from(1).unwrap(), PageType::Keys);

        assert!(PageType::try_from(99).is_err());
    }
}

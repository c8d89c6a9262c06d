//! Backward links between entries.

use serde::{Deserialize, Serialize};

use crate::text::EntryKey;

/// A backward reference from an entry to an earlier entry of the same log.
///
/// Encodes as `null` for [`Link::Root`] and as the key text otherwise, so the
/// canonical record matches the `key | none` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<EntryKey>", into = "Option<EntryKey>")]
pub enum Link {
    /// No earlier entry. Only the first entry of a log carries this.
    Root,
    /// Key of the referenced entry.
    Linked(EntryKey),
}

impl Link {
    /// Key of the referenced entry, if any.
    pub const fn key(&self) -> Option<&EntryKey> {
        match self {
            Self::Root => None,
            Self::Linked(key) => Some(key),
        }
    }

    /// Whether this link references nothing.
    pub const fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

impl From<Option<EntryKey>> for Link {
    fn from(key: Option<EntryKey>) -> Self {
        key.map_or(Self::Root, Self::Linked)
    }
}

impl From<Link> for Option<EntryKey> {
    fn from(link: Link) -> Self {
        match link {
            Link::Root => None,
            Link::Linked(key) => Some(key),
        }
    }
}

impl From<EntryKey> for Link {
    fn from(key: EntryKey) -> Self {
        Self::Linked(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding;

    #[test]
    fn root_encodes_as_null() {
        let bytes = encoding::to_canonical(&Link::Root).unwrap();
        assert_eq!(bytes, vec![0xf6]);
    }

    #[test]
    fn linked_encodes_like_the_key() {
        let key = EntryKey::from_bytes([7; 32]);
        let link_bytes = encoding::to_canonical(&Link::Linked(key)).unwrap();
        let key_bytes = encoding::to_canonical(&key).unwrap();
        assert_eq!(link_bytes, key_bytes);
    }

    #[test]
    fn decodes_back() {
        let key = EntryKey::from_bytes([9; 32]);
        for link in [Link::Root, Link::Linked(key)] {
            let bytes = encoding::to_canonical(&link).unwrap();
            let decoded: Link = encoding::from_slice(&bytes).unwrap();
            assert_eq!(decoded, link);
        }
    }
}

//! Single-entry verification.
//!
//! [`check_entry`] re-derives everything an entry commits to: its key, its
//! content proof and its signature. The link checks ([`check_links`],
//! [`check_backlink`], [`check_skip_link`]) validate an entry's position
//! relative to the entries it points at.

use std::fmt;

use lipmaa_crypto::{Verifier, content_proof, entry_key};
use lipmaa_proto::{AuthorId, EncodeError, Entry, EntryKey, Link};

use crate::address::skip_target;

/// Why an entry failed integrity or authenticity checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Stated key differs from the hash of the metadata.
    #[error("key {stated} does not match recomputed key {computed}")]
    HashMismatch {
        /// Key carried by the entry.
        stated: EntryKey,
        /// Key recomputed from the metadata.
        computed: EntryKey,
    },

    /// Content does not hash to the committed proof.
    #[error("content does not match its proof")]
    ContentMismatch,

    /// Signature does not verify under the author's identity.
    #[error("signature does not verify for author {author}")]
    InvalidSignature {
        /// Claimed author.
        author: AuthorId,
    },

    /// Metadata or content could not be re-encoded.
    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

/// Which backward link of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Link to the immediately preceding entry.
    Previous,
    /// Link to the lipmaa skip target.
    Skip,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Previous => f.write_str("previous"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

/// An entry's sequence or links are inconsistent with the log rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Sequence 0 is never valid.
    #[error("sequence numbers start at 1")]
    Zero,

    /// The first entry carries a backward link.
    #[error("first entry must not carry a {0} link")]
    RootWithLink(LinkKind),

    /// A later entry lacks a required backward link.
    #[error("entry {sequence} is missing its {link} link")]
    MissingLink {
        /// Sequence of the entry.
        sequence: u64,
        /// Which link is absent.
        link: LinkKind,
    },

    /// Predecessor is not at `sequence - 1`.
    #[error("predecessor has sequence {actual}, expected {expected}")]
    Predecessor {
        /// Required predecessor sequence.
        expected: u64,
        /// Sequence of the supplied predecessor.
        actual: u64,
    },

    /// Skip link points to an entry other than the lipmaa target.
    #[error("skip link resolved to sequence {actual}, expected {expected}")]
    SkipTarget {
        /// `skip_target` of the linking entry.
        expected: u64,
        /// Sequence of the linked entry.
        actual: u64,
    },

    /// Linked entry is not older than the linking entry.
    #[error("linked entry {linked} is not older than entry {sequence}")]
    NotBackward {
        /// Sequence of the linking entry.
        sequence: u64,
        /// Sequence of the linked entry.
        linked: u64,
    },

    /// Linked entry belongs to another author's log.
    #[error("entry {sequence} belongs to a different author")]
    ForeignAuthor {
        /// Sequence of the foreign entry.
        sequence: u64,
    },

    /// Linked entry's key is not the one the link names.
    #[error("{link} link names {expected}, got entry {actual}")]
    KeyMismatch {
        /// Which link was followed.
        link: LinkKind,
        /// Key stored in the link.
        expected: EntryKey,
        /// Key of the entry that was supplied.
        actual: EntryKey,
    },
}

/// Recompute the key an entry should carry.
pub fn compute_key(entry: &Entry) -> Result<EntryKey, EncodeError> {
    entry_key(&entry.metadata)
}

/// Check integrity (key and content proof) and authenticity (signature).
pub fn check_entry<V>(entry: &Entry, verifier: &V) -> Result<(), VerifyError>
where
    V: Verifier + ?Sized,
{
    let computed = compute_key(entry)?;
    if computed != entry.key {
        return Err(VerifyError::HashMismatch { stated: entry.key, computed });
    }

    if content_proof(&entry.content)? != entry.metadata.content_proof {
        return Err(VerifyError::ContentMismatch);
    }

    let message = entry.metadata.signing_bytes()?;
    if !verifier.verify(&message, &entry.metadata.signature, &entry.metadata.author) {
        return Err(VerifyError::InvalidSignature { author: entry.metadata.author });
    }

    Ok(())
}

/// Whether an entry passes [`check_entry`].
pub fn is_valid<V>(entry: &Entry, verifier: &V) -> bool
where
    V: Verifier + ?Sized,
{
    check_entry(entry, verifier).is_ok()
}

/// Check that the presence of links matches the sequence.
///
/// Sequence 1 carries no links; every later entry carries both.
pub fn check_links(entry: &Entry) -> Result<(), LinkError> {
    let sequence = entry.sequence();
    match sequence {
        0 => Err(LinkError::Zero),
        1 => {
            if !entry.previous().is_root() {
                return Err(LinkError::RootWithLink(LinkKind::Previous));
            }
            if !entry.skip().is_root() {
                return Err(LinkError::RootWithLink(LinkKind::Skip));
            }
            Ok(())
        },
        _ => {
            if entry.previous().is_root() {
                return Err(LinkError::MissingLink { sequence, link: LinkKind::Previous });
            }
            if entry.skip().is_root() {
                return Err(LinkError::MissingLink { sequence, link: LinkKind::Skip });
            }
            Ok(())
        },
    }
}

fn check_linked(
    entry: &Entry,
    linked: &Entry,
    link: Link,
    kind: LinkKind,
) -> Result<(), LinkError> {
    let sequence = entry.sequence();
    let Link::Linked(expected) = link else {
        return Err(LinkError::MissingLink { sequence, link: kind });
    };
    if linked.key != expected {
        return Err(LinkError::KeyMismatch { link: kind, expected, actual: linked.key });
    }
    if linked.author() != entry.author() {
        return Err(LinkError::ForeignAuthor { sequence: linked.sequence() });
    }
    if linked.sequence() >= sequence {
        return Err(LinkError::NotBackward { sequence, linked: linked.sequence() });
    }
    Ok(())
}

/// Check that `predecessor` is the entry `entry.previous` names.
pub fn check_backlink(entry: &Entry, predecessor: &Entry) -> Result<(), LinkError> {
    check_linked(entry, predecessor, entry.previous(), LinkKind::Previous)?;

    let expected = entry.sequence() - 1;
    if predecessor.sequence() != expected {
        return Err(LinkError::Predecessor { expected, actual: predecessor.sequence() });
    }
    Ok(())
}

/// Check that `linked` is the entry `entry.skip` names.
///
/// Key, author and backward direction are always enforced. With `strict`,
/// the linked entry must also sit exactly at `skip_target(entry.sequence)`.
pub fn check_skip_link(entry: &Entry, linked: &Entry, strict: bool) -> Result<(), LinkError> {
    check_linked(entry, linked, entry.skip(), LinkKind::Skip)?;

    let expected = skip_target(entry.sequence());
    if strict && linked.sequence() != expected {
        return Err(LinkError::SkipTarget { expected, actual: linked.sequence() });
    }
    Ok(())
}

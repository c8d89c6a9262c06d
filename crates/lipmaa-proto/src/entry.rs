//! Log entries and their metadata.

use serde::{Deserialize, Serialize};

use crate::{
    content::Content,
    encoding::{self, EncodeError},
    link::Link,
    text::{AuthorId, ContentProof, EntryKey, Signature},
};

/// Canonical view of the signed fields, without signature and key.
#[derive(Serialize)]
struct SigningView<'a> {
    timestamp: u64,
    content_proof: &'a ContentProof,
    sequence: u64,
    skip: Link,
    previous: Link,
    author_label: &'a str,
    author: &'a AuthorId,
}

/// Metadata before it has been signed.
///
/// The builder fills this in, asks the signer for a signature over
/// [`UnsignedMetadata::signing_bytes`], then seals it with
/// [`UnsignedMetadata::into_signed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedMetadata {
    /// Creation time from the author's monotonic clock.
    pub timestamp: u64,
    /// Hash of the canonical content encoding.
    pub content_proof: ContentProof,
    /// Position in the author's log, starting at 1.
    pub sequence: u64,
    /// Link to the entry at the lipmaa skip target.
    pub skip: Link,
    /// Link to the immediately preceding entry.
    pub previous: Link,
    /// Human-readable author name.
    pub author_label: String,
    /// Author's public identity.
    pub author: AuthorId,
}

impl UnsignedMetadata {
    fn view(&self) -> SigningView<'_> {
        SigningView {
            timestamp: self.timestamp,
            content_proof: &self.content_proof,
            sequence: self.sequence,
            skip: self.skip,
            previous: self.previous,
            author_label: &self.author_label,
            author: &self.author,
        }
    }

    /// Bytes the author signs.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        encoding::to_canonical(&self.view())
    }

    /// Attach a signature.
    pub fn into_signed(self, signature: Signature) -> Metadata {
        Metadata {
            timestamp: self.timestamp,
            content_proof: self.content_proof,
            sequence: self.sequence,
            skip: self.skip,
            previous: self.previous,
            author_label: self.author_label,
            author: self.author,
            signature,
        }
    }
}

/// Signed entry metadata.
///
/// Field order is the canonical record order; changing it changes every key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Creation time from the author's monotonic clock.
    pub timestamp: u64,
    /// Hash of the canonical content encoding.
    pub content_proof: ContentProof,
    /// Position in the author's log, starting at 1.
    pub sequence: u64,
    /// Link to the entry at the lipmaa skip target.
    pub skip: Link,
    /// Link to the immediately preceding entry.
    pub previous: Link,
    /// Human-readable author name.
    pub author_label: String,
    /// Author's public identity.
    pub author: AuthorId,
    /// Signature over [`Metadata::signing_bytes`].
    pub signature: Signature,
}

impl Metadata {
    fn view(&self) -> SigningView<'_> {
        SigningView {
            timestamp: self.timestamp,
            content_proof: &self.content_proof,
            sequence: self.sequence,
            skip: self.skip,
            previous: self.previous,
            author_label: &self.author_label,
            author: &self.author,
        }
    }

    /// Bytes covered by the signature (everything except the signature).
    pub fn signing_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        encoding::to_canonical(&self.view())
    }

    /// Bytes covered by the entry key (everything including the signature).
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        encoding::to_canonical(self)
    }
}

/// One immutable record of an author's log.
///
/// `key` is derived from `metadata` and is never chosen independently; any
/// change to the metadata or content makes the entry fail verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Signed metadata.
    pub metadata: Metadata,
    /// Hash of the canonical metadata encoding.
    pub key: EntryKey,
    /// Author-supplied payload.
    pub content: Content,
}

impl Entry {
    /// Position in the author's log.
    pub const fn sequence(&self) -> u64 {
        self.metadata.sequence
    }

    /// Author's public identity.
    pub const fn author(&self) -> &AuthorId {
        &self.metadata.author
    }

    /// Link to the preceding entry.
    pub const fn previous(&self) -> Link {
        self.metadata.previous
    }

    /// Link to the skip target entry.
    pub const fn skip(&self) -> Link {
        self.metadata.skip
    }

    /// Encode the whole entry for transport.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        encoding::to_canonical(self)
    }

    /// Decode an entry. The result is not verified.
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodeError> {
        encoding::from_slice(bytes)
    }
}

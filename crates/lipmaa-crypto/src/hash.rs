//! BLAKE3 hashing of canonical encodings.

use lipmaa_proto::{Content, ContentProof, EncodeError, EntryKey, Metadata, encoding};

/// Output length of [`hash`] in bytes.
pub const HASH_LEN: usize = 32;

/// Hash arbitrary bytes.
pub fn hash(bytes: &[u8]) -> [u8; HASH_LEN] {
    blake3::hash(bytes).into()
}

/// Proof committing to an entry's content.
pub fn content_proof(content: &Content) -> Result<ContentProof, EncodeError> {
    let bytes = encoding::to_canonical(content)?;
    Ok(ContentProof::from_bytes(hash(&bytes)))
}

/// Key of an entry with the given signed metadata.
pub fn entry_key(metadata: &Metadata) -> Result<EntryKey, EncodeError> {
    let bytes = metadata.canonical_bytes()?;
    Ok(EntryKey::from_bytes(hash(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_blake3() {
        // Published BLAKE3 digest of the empty input.
        let empty = hash(b"");
        assert_eq!(empty[..4], [0xaf, 0x13, 0x49, 0xb9]);
    }

    #[test]
    fn content_proof_tracks_every_field() {
        let base = content_proof(&Content::text("hello")).unwrap();
        let other_text = content_proof(&Content::text("hellO")).unwrap();
        let mentioned = content_proof(&Content::text("hello").with_mention("@a", "a")).unwrap();

        assert_ne!(base, other_text);
        assert_ne!(base, mentioned);
        assert_eq!(base, content_proof(&Content::text("hello")).unwrap());
    }
}

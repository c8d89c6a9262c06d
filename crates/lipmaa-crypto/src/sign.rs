//! Signing and verification capabilities.

use async_trait::async_trait;
use lipmaa_proto::{AuthorId, Signature};

/// Signing failure reported by a [`Signer`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignError {
    /// The key material could not be reached (locked keystore, gone device).
    #[error("signer unavailable: {0}")]
    Unavailable(String),

    /// The signer refused to sign this message.
    #[error("signer refused: {0}")]
    Refused(String),
}

/// Capability to sign entry metadata on behalf of one author.
///
/// Implementations own their key material. The core borrows a signer for the
/// duration of a single build call and never stores it.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Public identity that verifies this signer's signatures.
    fn author_id(&self) -> AuthorId;

    /// Sign a message.
    async fn sign(&self, message: &[u8]) -> Result<Signature, SignError>;
}

/// Capability to check signatures against an author's public identity.
pub trait Verifier: Send + Sync {
    /// Whether `signature` is valid for `message` under `author`.
    ///
    /// Returns `false` for malformed identities instead of failing.
    fn verify(&self, message: &[u8], signature: &Signature, author: &AuthorId) -> bool;
}

//! Ed25519 signer and verifier.
//!
//! The author id is the 32-byte verifying key, so relying parties need
//! nothing beyond the entry itself to check a signature.

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use lipmaa_proto::{AuthorId, Signature};

use crate::sign::{SignError, Signer, Verifier};

/// In-process Ed25519 signer.
///
/// # Security
///
/// - **Debug Redaction**: the `Debug` impl prints only the public author id.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Derive a signer from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { key: SigningKey::from_bytes(&seed) }
    }

    /// Wrap an existing signing key.
    pub fn from_signing_key(key: SigningKey) -> Self {
        Self { key }
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("author", &self.author_id())
            .field("key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Signer for Ed25519Signer {
    fn author_id(&self) -> AuthorId {
        AuthorId::from_bytes(self.key.verifying_key().to_bytes())
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SignError> {
        Ok(Signature::from_bytes(self.key.sign(message).to_bytes()))
    }
}

/// Ed25519 verification against [`AuthorId`] verifying keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl Verifier for Ed25519Verifier {
    fn verify(&self, message: &[u8], signature: &Signature, author: &AuthorId) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(author.as_bytes()) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        key.verify_strict(message, &signature).is_ok()
    }
}

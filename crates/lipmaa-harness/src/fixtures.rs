//! Deterministic authors and logs for tests.

use lipmaa_core::{Author, BatchOnly, BuildError, ManualClock, PendingEntry, build_chain};
use lipmaa_crypto::{Ed25519Signer, Signer};
use lipmaa_proto::{Content, Entry};

/// Author identity with its signer, derived from a one-byte seed.
#[derive(Debug)]
pub struct TestAuthor {
    /// Published identity.
    pub author: Author,
    /// Matching signer.
    pub signer: Ed25519Signer,
}

impl TestAuthor {
    /// Author whose signing seed is `[seed; 32]`.
    pub fn new(seed: u8, label: &str) -> Self {
        let signer = Ed25519Signer::from_seed([seed; 32]);
        Self { author: Author::new(signer.author_id(), label), signer }
    }
}

/// Build a `count`-entry log for the author derived from `seed`.
pub async fn build_log(seed: u8, count: u64) -> Result<Vec<Entry>, BuildError> {
    let author = TestAuthor::new(seed, &format!("author-{seed}"));
    let clock = ManualClock::new(u64::from(seed) << 32);
    let pending: Vec<PendingEntry> = (1..=count)
        .map(|n| PendingEntry::new(Content::text(format!("{seed}:{n}"))))
        .collect();

    build_chain(&author.author, &author.signer, &clock, &BatchOnly, None, &pending).await
}

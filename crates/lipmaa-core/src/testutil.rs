//! Shared fixtures for unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use lipmaa_crypto::{Ed25519Signer, Signer};
use lipmaa_proto::{Content, Entry, EntryKey};

use crate::{
    builder::{Author, PendingEntry, build_chain},
    env::ManualClock,
    resolve::{BatchOnly, KeyResolver, ResolveError},
};

pub fn alice() -> (Author, Ed25519Signer) {
    let signer = Ed25519Signer::from_seed([0xa1; 32]);
    (Author::new(signer.author_id(), "alice"), signer)
}

pub fn bob() -> (Author, Ed25519Signer) {
    let signer = Ed25519Signer::from_seed([0xb0; 32]);
    (Author::new(signer.author_id(), "bob"), signer)
}

pub fn pending(count: u64) -> Vec<PendingEntry> {
    (1..=count).map(|n| PendingEntry::new(Content::text(format!("entry {n}")))).collect()
}

async fn log_for(author: &Author, signer: &Ed25519Signer, count: u64) -> Vec<Entry> {
    let clock = ManualClock::new(1_000);
    build_chain(author, signer, &clock, &BatchOnly, None, &pending(count)).await.unwrap()
}

pub async fn alice_log(count: u64) -> Vec<Entry> {
    let (author, signer) = alice();
    log_for(&author, &signer, count).await
}

pub async fn bob_log(count: u64) -> Vec<Entry> {
    let (author, signer) = bob();
    log_for(&author, &signer, count).await
}

/// Key resolver over a fixed set of entries.
pub struct KeyMap {
    entries: HashMap<EntryKey, Entry>,
}

impl KeyMap {
    pub fn new(entries: &[Entry]) -> Self {
        Self { entries: entries.iter().map(|e| (e.key, e.clone())).collect() }
    }

    /// Answers `key` with `entry` regardless of the entry's own key.
    pub fn substituted(key: EntryKey, entry: Entry) -> Self {
        Self { entries: HashMap::from([(key, entry)]) }
    }
}

#[async_trait]
impl KeyResolver for KeyMap {
    async fn resolve_key(&self, key: &EntryKey) -> Result<Option<Entry>, ResolveError> {
        Ok(self.entries.get(key).cloned())
    }
}

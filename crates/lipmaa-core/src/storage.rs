//! In-memory log storage.
//!
//! [`MemoryLog`] holds one author's entries in sequence order and indexes
//! them by key. It implements both resolver traits, so it can back entry
//! construction and chain verification directly.
//!
//! # Invariants
//!
//! - Entries are stored at index `sequence - 1`; there are no gaps
//! - Every entry after the first links to its stored predecessor by key
//! - All entries share the first entry's author
//! - No two entries state the same key

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use lipmaa_proto::{AuthorId, Entry, EntryKey, Link};

use crate::resolve::{KeyResolver, ResolveError, SequenceResolver};

/// Entry rejected by a log store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Entry belongs to another author's log.
    #[error("log belongs to {expected}, entry authored by {actual}")]
    ForeignAuthor {
        /// Author of the stored log.
        expected: AuthorId,
        /// Author of the rejected entry.
        actual: AuthorId,
    },

    /// Entry is not the next in sequence.
    #[error("expected sequence {expected}, got {actual}")]
    OutOfOrder {
        /// Next free sequence.
        expected: u64,
        /// Sequence of the rejected entry.
        actual: u64,
    },

    /// Entry's previous link does not name the current head.
    #[error("entry {sequence} does not link to the current head")]
    BrokenBacklink {
        /// Sequence of the rejected entry.
        sequence: u64,
    },

    /// Entry states a key already held by an earlier entry.
    #[error("entry {sequence} reuses the key of entry {existing}")]
    DuplicateKey {
        /// Sequence of the rejected entry.
        sequence: u64,
        /// Sequence of the entry already holding the key.
        existing: u64,
    },
}

#[derive(Debug, Default)]
struct LogState {
    entries: Vec<Entry>,
    by_key: HashMap<EntryKey, usize>,
}

/// Thread-safe in-memory store for a single author's log.
#[derive(Debug, Default)]
pub struct MemoryLog {
    state: RwLock<LogState>,
}

impl MemoryLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log holding `entries`, appended in order.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Result<Self, StorageError> {
        let log = Self::new();
        for entry in entries {
            log.append(entry)?;
        }
        Ok(log)
    }

    fn read(&self) -> RwLockReadGuard<'_, LogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `entry` as the new head.
    ///
    /// Only continuity is checked here; signatures and skip links are the
    /// verifier's concern.
    pub fn append(&self, entry: Entry) -> Result<(), StorageError> {
        let mut state = self.write();

        match state.entries.last() {
            None => {
                if entry.sequence() != 1 {
                    return Err(StorageError::OutOfOrder { expected: 1, actual: entry.sequence() });
                }
            },
            Some(head) => {
                if entry.author() != head.author() {
                    return Err(StorageError::ForeignAuthor {
                        expected: *head.author(),
                        actual: *entry.author(),
                    });
                }
                let expected = head.sequence().saturating_add(1);
                if entry.sequence() != expected {
                    return Err(StorageError::OutOfOrder { expected, actual: entry.sequence() });
                }
                if entry.previous() != Link::Linked(head.key) {
                    return Err(StorageError::BrokenBacklink { sequence: entry.sequence() });
                }
            },
        }

        if let Some(&existing) = state.by_key.get(&entry.key) {
            return Err(StorageError::DuplicateKey {
                sequence: entry.sequence(),
                existing: state.entries[existing].sequence(),
            });
        }

        tracing::trace!("Stored entry {} at sequence {}", entry.key, entry.sequence());

        let index = state.entries.len();
        state.by_key.insert(entry.key, index);
        state.entries.push(entry);
        Ok(())
    }

    /// Entry at `sequence`.
    pub fn get(&self, sequence: u64) -> Option<Entry> {
        let index = usize::try_from(sequence.checked_sub(1)?).ok()?;
        self.read().entries.get(index).cloned()
    }

    /// Entry with `key`.
    pub fn get_by_key(&self, key: &EntryKey) -> Option<Entry> {
        let state = self.read();
        let index = *state.by_key.get(key)?;
        state.entries.get(index).cloned()
    }

    /// Newest entry.
    pub fn latest(&self) -> Option<Entry> {
        self.read().entries.last().cloned()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Author of the log, once it has a first entry.
    pub fn author(&self) -> Option<AuthorId> {
        self.read().entries.first().map(|entry| *entry.author())
    }

    /// Snapshot of all entries in sequence order.
    pub fn entries(&self) -> Vec<Entry> {
        self.read().entries.clone()
    }
}

#[async_trait]
impl KeyResolver for MemoryLog {
    async fn resolve_key(&self, key: &EntryKey) -> Result<Option<Entry>, ResolveError> {
        Ok(self.get_by_key(key))
    }
}

#[async_trait]
impl SequenceResolver for MemoryLog {
    async fn resolve_sequence(&self, sequence: u64) -> Result<Option<Entry>, ResolveError> {
        Ok(self.get(sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{alice_log, bob_log};

    #[tokio::test]
    async fn stores_and_indexes_entries() {
        let entries = alice_log(5).await;
        let log = MemoryLog::from_entries(entries.clone()).unwrap();

        assert_eq!(log.len(), 5);
        assert_eq!(log.get(3), Some(entries[2].clone()));
        assert_eq!(log.get_by_key(&entries[4].key), Some(entries[4].clone()));
        assert_eq!(log.latest(), Some(entries[4].clone()));
        assert_eq!(log.author(), Some(*entries[0].author()));
        assert_eq!(log.entries(), entries);
    }

    #[tokio::test]
    async fn out_of_range_lookups_are_none() {
        let log = MemoryLog::from_entries(alice_log(2).await).unwrap();

        assert_eq!(log.get(0), None);
        assert_eq!(log.get(3), None);
        assert_eq!(log.get_by_key(&EntryKey::from_bytes([9; 32])), None);
    }

    #[tokio::test]
    async fn first_entry_must_be_root() {
        let entries = alice_log(2).await;
        let log = MemoryLog::new();

        assert_eq!(
            log.append(entries[1].clone()),
            Err(StorageError::OutOfOrder { expected: 1, actual: 2 })
        );
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn gaps_rejected() {
        let entries = alice_log(3).await;
        let log = MemoryLog::from_entries(entries[..1].to_vec()).unwrap();

        assert_eq!(
            log.append(entries[2].clone()),
            Err(StorageError::OutOfOrder { expected: 2, actual: 3 })
        );
    }

    #[tokio::test]
    async fn foreign_entries_rejected() {
        let alice = alice_log(1).await;
        let bob = bob_log(2).await;
        let log = MemoryLog::from_entries(alice).unwrap();

        assert!(matches!(
            log.append(bob[1].clone()),
            Err(StorageError::ForeignAuthor { .. })
        ));
    }

    #[tokio::test]
    async fn forked_entries_rejected() {
        let entries = alice_log(2).await;
        let log = MemoryLog::from_entries(entries.clone()).unwrap();

        // A second entry 2 forks the log.
        let mut fork = entries[1].clone();
        fork.metadata.sequence = 3;

        assert_eq!(log.append(fork), Err(StorageError::BrokenBacklink { sequence: 3 }));
    }

    #[tokio::test]
    async fn duplicate_key_rejected() {
        let entries = alice_log(3).await;
        let log = MemoryLog::from_entries(entries[..2].to_vec()).unwrap();

        let mut clash = entries[2].clone();
        clash.key = entries[0].key;

        assert_eq!(
            log.append(clash),
            Err(StorageError::DuplicateKey { sequence: 3, existing: 1 })
        );
        assert_eq!(log.len(), 2);
        assert_eq!(log.get_by_key(&entries[0].key), Some(entries[0].clone()));
    }

    #[tokio::test]
    async fn resolvers_answer_from_store() {
        let entries = alice_log(4).await;
        let log = MemoryLog::from_entries(entries.clone()).unwrap();

        assert_eq!(log.resolve_key(&entries[1].key).await.unwrap(), Some(entries[1].clone()));
        assert_eq!(log.resolve_sequence(4).await.unwrap(), Some(entries[3].clone()));
        assert_eq!(log.resolve_sequence(5).await.unwrap(), None);
    }
}

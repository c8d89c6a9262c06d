//! Entry resolution collaborators.
//!
//! The core never stores entries. Whenever it needs an earlier entry (to link
//! to it or to walk a chain) it asks one of these resolvers, which may hit a
//! local index, a cache or the network. Each call is a suspension point.

use async_trait::async_trait;
use lipmaa_proto::{Entry, EntryKey};

/// Failure of a resolver backend.
///
/// "Not found" is not an error; resolvers return `Ok(None)` for that.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Backend could not be reached.
    #[error("resolver unavailable: {0}")]
    Unavailable(String),

    /// Backend failed while answering.
    #[error("resolver failed: {0}")]
    Backend(String),
}

/// Looks up entries by key.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Entry with `key`, or `None` if it is not available.
    async fn resolve_key(&self, key: &EntryKey) -> Result<Option<Entry>, ResolveError>;
}

/// Looks up entries of one log by sequence number.
#[async_trait]
pub trait SequenceResolver: Send + Sync {
    /// Entry at `sequence`, or `None` if it is not available.
    async fn resolve_sequence(&self, sequence: u64) -> Result<Option<Entry>, ResolveError>;
}

/// Resolves skip-link targets while a batch of entries is being built.
///
/// `built` holds the entries produced so far in the current batch, in
/// order; implementations may consult it before going to storage. The
/// builder checks the returned entry's position and author before linking
/// to it.
#[async_trait]
pub trait ChainKeyResolver: Send + Sync {
    /// Entry at `sequence`, or `None` if it is not available.
    async fn resolve_key_for_index(
        &self,
        sequence: u64,
        built: &[Entry],
    ) -> Result<Option<Entry>, ResolveError>;
}

fn find_built(sequence: u64, built: &[Entry]) -> Option<Entry> {
    built.iter().rev().find(|entry| entry.sequence() == sequence).cloned()
}

/// Resolves only against the entries of the current batch.
///
/// Suitable for building a log from scratch in one call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOnly;

#[async_trait]
impl ChainKeyResolver for BatchOnly {
    async fn resolve_key_for_index(
        &self,
        sequence: u64,
        built: &[Entry],
    ) -> Result<Option<Entry>, ResolveError> {
        Ok(find_built(sequence, built))
    }
}

/// Resolves against the current batch, then falls back to a log store.
///
/// Used to extend an existing log with a batch of new entries.
#[derive(Debug)]
pub struct BatchResolver<'a, R: ?Sized> {
    store: &'a R,
}

impl<'a, R: ?Sized> BatchResolver<'a, R> {
    /// Fall back to `store` for entries outside the batch.
    pub const fn new(store: &'a R) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<R> ChainKeyResolver for BatchResolver<'_, R>
where
    R: SequenceResolver + ?Sized,
{
    async fn resolve_key_for_index(
        &self,
        sequence: u64,
        built: &[Entry],
    ) -> Result<Option<Entry>, ResolveError> {
        if let Some(entry) = find_built(sequence, built) {
            return Ok(Some(entry));
        }
        self.store.resolve_sequence(sequence).await
    }
}

//! Chain verification along skip links.
//!
//! [`verify_chain`] walks from an entry back to the first entry of its log,
//! following only skip links. Every visited entry is checked for integrity,
//! authenticity and link shape, and every hop for key, author and position.
//! The walk stops at the first failure.
//!
//! [`verify_between`] walks to an arbitrary earlier entry, mixing skip links
//! and backlinks along [`path_between`].
//!
//! Both return a [`ChainReport`] rather than an error: the visited sequences
//! are useful to the caller whether or not the chain holds.

use std::borrow::Cow;

use lipmaa_crypto::Verifier;
use lipmaa_proto::{EncodeError, Entry, EntryKey, Link};

use crate::{
    address::{path_between, skip_target},
    resolve::{KeyResolver, ResolveError},
    verify::{
        LinkError, LinkKind, VerifyError, check_backlink, check_entry, check_links,
        check_skip_link,
    },
};

/// Chain verification policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyConfig {
    /// Require every skip link to land exactly on `skip_target(sequence)`.
    ///
    /// When disabled, a skip link only has to point at an older entry of the
    /// same author.
    pub strict_skip_target: bool,
}

impl VerifyConfig {
    /// Enforce exact skip targets.
    pub const fn strict() -> Self {
        Self { strict_skip_target: true }
    }

    /// Accept any backward skip link.
    pub const fn relaxed() -> Self {
        Self { strict_skip_target: false }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self::strict()
    }
}

/// First failure encountered while walking a chain.
///
/// `sequence` is always the entry being examined when the walk stopped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainFailure {
    /// Stated key differs from the recomputed key.
    #[error("entry {sequence}: key does not match metadata")]
    HashMismatch {
        /// Failing entry.
        sequence: u64,
    },

    /// Content does not match its committed proof.
    #[error("entry {sequence}: content does not match its proof")]
    ContentMismatch {
        /// Failing entry.
        sequence: u64,
    },

    /// Signature does not verify.
    #[error("entry {sequence}: invalid signature")]
    InvalidSignature {
        /// Failing entry.
        sequence: u64,
    },

    /// Entry could not be re-encoded.
    #[error("entry {sequence}: {source}")]
    Encoding {
        /// Failing entry.
        sequence: u64,
        /// Underlying encoder error.
        source: EncodeError,
    },

    /// Linked entry is unknown to the resolver.
    #[error("entry {sequence}: linked entry {key} not found")]
    UnresolvedLink {
        /// Entry whose link could not be followed.
        sequence: u64,
        /// Key that was looked up.
        key: EntryKey,
    },

    /// Sequence or link rules violated.
    #[error("entry {sequence}: {source}")]
    SequenceViolation {
        /// Entry whose links are wrong.
        sequence: u64,
        /// Rule that was broken.
        source: LinkError,
    },

    /// Resolver backend failed.
    #[error("entry {sequence}: {source}")]
    Resolver {
        /// Entry whose link was being followed.
        sequence: u64,
        /// Backend error.
        source: ResolveError,
    },
}

impl ChainFailure {
    /// Sequence of the entry being examined when the walk stopped.
    pub const fn sequence(&self) -> u64 {
        match self {
            Self::HashMismatch { sequence }
            | Self::ContentMismatch { sequence }
            | Self::InvalidSignature { sequence }
            | Self::Encoding { sequence, .. }
            | Self::UnresolvedLink { sequence, .. }
            | Self::SequenceViolation { sequence, .. }
            | Self::Resolver { sequence, .. } => *sequence,
        }
    }

    fn from_verify(sequence: u64, err: VerifyError) -> Self {
        match err {
            VerifyError::HashMismatch { .. } => Self::HashMismatch { sequence },
            VerifyError::ContentMismatch => Self::ContentMismatch { sequence },
            VerifyError::InvalidSignature { .. } => Self::InvalidSignature { sequence },
            VerifyError::Encoding(source) => Self::Encoding { sequence, source },
        }
    }
}

/// Outcome of a chain walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Sequences examined, newest first, including the failing one.
    pub visited: Vec<u64>,
    /// First failure, if any.
    pub failure: Option<ChainFailure>,
}

impl ChainReport {
    /// Whether every visited entry and hop checked out.
    pub const fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    fn valid(visited: Vec<u64>) -> Self {
        Self { visited, failure: None }
    }

    fn failed(visited: Vec<u64>, failure: ChainFailure) -> Self {
        tracing::warn!("Chain verification failed after {} hops: {}", visited.len(), failure);
        Self { visited, failure: Some(failure) }
    }
}

fn check_hop<V>(entry: &Entry, verifier: &V) -> Result<(), ChainFailure>
where
    V: Verifier + ?Sized,
{
    let sequence = entry.sequence();
    check_entry(entry, verifier).map_err(|err| ChainFailure::from_verify(sequence, err))?;
    check_links(entry).map_err(|source| ChainFailure::SequenceViolation { sequence, source })
}

/// Resolve and check the entry `current` links to through `kind`.
async fn follow<R>(
    current: &Entry,
    kind: LinkKind,
    resolver: &R,
    strict: bool,
) -> Result<Entry, ChainFailure>
where
    R: KeyResolver + ?Sized,
{
    let sequence = current.sequence();
    let link = match kind {
        LinkKind::Skip => current.skip(),
        LinkKind::Previous => current.previous(),
    };
    let Link::Linked(key) = link else {
        let source = LinkError::MissingLink { sequence, link: kind };
        return Err(ChainFailure::SequenceViolation { sequence, source });
    };

    let linked = match resolver.resolve_key(&key).await {
        Ok(Some(linked)) => linked,
        Ok(None) => return Err(ChainFailure::UnresolvedLink { sequence, key }),
        Err(source) => return Err(ChainFailure::Resolver { sequence, source }),
    };

    let checked = match kind {
        LinkKind::Skip => check_skip_link(current, &linked, strict),
        LinkKind::Previous => check_backlink(current, &linked),
    };
    checked.map_err(|source| ChainFailure::SequenceViolation { sequence, source })?;

    Ok(linked)
}

/// Verify `entry` and its skip path back to the first entry.
///
/// On success `visited` is `entry.sequence` followed by the skip path in
/// descending order.
pub async fn verify_chain<R, V>(
    entry: &Entry,
    resolver: &R,
    verifier: &V,
    config: VerifyConfig,
) -> ChainReport
where
    R: KeyResolver + ?Sized,
    V: Verifier + ?Sized,
{
    let mut visited = Vec::new();
    let mut current = Cow::Borrowed(entry);

    loop {
        visited.push(current.sequence());
        tracing::trace!("Verifying entry {} at sequence {}", current.key, current.sequence());

        if let Err(failure) = check_hop(&current, verifier) {
            return ChainReport::failed(visited, failure);
        }
        // Link shape already guarantees this is sequence 1.
        if current.skip().is_root() {
            return ChainReport::valid(visited);
        }

        match follow(&current, LinkKind::Skip, resolver, config.strict_skip_target).await {
            Ok(next) => current = Cow::Owned(next),
            Err(failure) => return ChainReport::failed(visited, failure),
        }
    }
}

/// Verify `entry` and the path back to the entry at sequence `to`.
///
/// Hops follow [`path_between`]: skip links where they do not overshoot `to`,
/// backlinks otherwise. Skip targets are always checked strictly since the
/// path is computed from them.
pub async fn verify_between<R, V>(entry: &Entry, to: u64, resolver: &R, verifier: &V) -> ChainReport
where
    R: KeyResolver + ?Sized,
    V: Verifier + ?Sized,
{
    let sequence = entry.sequence();
    let Some(hops) = path_between(sequence, to) else {
        let source = LinkError::NotBackward { sequence, linked: to };
        return ChainReport::failed(
            vec![sequence],
            ChainFailure::SequenceViolation { sequence, source },
        );
    };

    let mut visited = Vec::with_capacity(hops.len() + 1);
    let mut current = Cow::Borrowed(entry);

    for hop in hops.into_iter().rev() {
        visited.push(current.sequence());
        tracing::trace!("Verifying entry {} at sequence {}", current.key, current.sequence());

        if let Err(failure) = check_hop(&current, verifier) {
            return ChainReport::failed(visited, failure);
        }

        let kind = if skip_target(current.sequence()) == hop {
            LinkKind::Skip
        } else {
            LinkKind::Previous
        };
        match follow(&current, kind, resolver, true).await {
            Ok(next) => current = Cow::Owned(next),
            Err(failure) => return ChainReport::failed(visited, failure),
        }
    }

    visited.push(current.sequence());
    match check_hop(&current, verifier) {
        Ok(()) => ChainReport::valid(visited),
        Err(failure) => ChainReport::failed(visited, failure),
    }
}

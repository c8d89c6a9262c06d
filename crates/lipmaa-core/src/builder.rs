//! Entry construction.
//!
//! [`create`] turns content plus fully specified links into a signed entry.
//! [`append`] and [`build_chain`] compute the links themselves: the previous
//! link from the supplied predecessor and the skip link by resolving the entry
//! at [`skip_target`].
//!
//! Every structural precondition is checked before the signer is invoked, so
//! a rejected entry never costs a signature.

use lipmaa_crypto::{SignError, Signer, content_proof, entry_key};
use lipmaa_proto::{AuthorId, Content, ContentError, EncodeError, Entry, Link, UnsignedMetadata};

use crate::{
    address::skip_target,
    env::Clock,
    resolve::{ChainKeyResolver, ResolveError, SequenceResolver},
    verify::{LinkError, LinkKind},
};

/// Identity an entry is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Public identity; must match the signer's.
    pub id: AuthorId,
    /// Human-readable name committed into every entry.
    pub label: String,
}

impl Author {
    /// Author with the given identity and label.
    pub fn new(id: AuthorId, label: impl Into<String>) -> Self {
        Self { id, label: label.into() }
    }
}

/// Inputs to [`create`] with explicit links.
#[derive(Debug, Clone)]
pub struct NewEntry<'a> {
    /// Payload to commit to.
    pub content: Content,
    /// Position in the log, starting at 1.
    pub sequence: u64,
    /// Entry at `sequence - 1`; `None` for the first entry.
    pub previous: Option<&'a Entry>,
    /// Skip link; [`Link::Root`] for the first entry.
    pub skip: Link,
}

/// One entry of a [`build_chain`] batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    /// Payload to commit to.
    pub content: Content,
    /// Expected position. `None` takes the next free sequence.
    pub sequence: Option<u64>,
}

impl PendingEntry {
    /// Entry at the next free sequence.
    pub fn new(content: Content) -> Self {
        Self { content, sequence: None }
    }

    /// Entry that must land at `sequence`.
    pub fn at(content: Content, sequence: u64) -> Self {
        Self { content, sequence: Some(sequence) }
    }
}

/// Why an entry could not be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Sequence or links are inconsistent with the log.
    #[error("sequence violation: {0}")]
    SequenceViolation(#[from] LinkError),

    /// Content annotations are malformed.
    #[error("invalid content: {0}")]
    Content(#[from] ContentError),

    /// Signer's identity is not the author's.
    #[error("signer {signer} cannot sign for author {author}")]
    SignerMismatch {
        /// Author the entry is published under.
        author: AuthorId,
        /// Identity of the supplied signer.
        signer: AuthorId,
    },

    /// Skip target could not be found.
    #[error("no entry at sequence {sequence} to link to")]
    UnresolvedLink {
        /// Sequence that was looked up.
        sequence: u64,
    },

    /// Resolver backend failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Signer failed.
    #[error(transparent)]
    Signing(#[from] SignError),

    /// Metadata or content could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

/// Check that `previous` may precede an entry at `sequence` by `author`.
fn check_position(
    author: &Author,
    sequence: u64,
    previous: Option<&Entry>,
) -> Result<(), LinkError> {
    if sequence == 0 {
        return Err(LinkError::Zero);
    }
    match previous {
        None if sequence == 1 => Ok(()),
        None => Err(LinkError::MissingLink { sequence, link: LinkKind::Previous }),
        Some(prev) => {
            if prev.author() != &author.id {
                return Err(LinkError::ForeignAuthor { sequence: prev.sequence() });
            }
            if prev.sequence().checked_add(1) != Some(sequence) {
                return Err(LinkError::Predecessor {
                    expected: sequence - 1,
                    actual: prev.sequence(),
                });
            }
            Ok(())
        },
    }
}

/// Check that `linked` is `author`'s entry at `target` and link to it.
fn link_skip_target(author: &Author, target: u64, linked: &Entry) -> Result<Link, LinkError> {
    if linked.sequence() != target {
        return Err(LinkError::SkipTarget { expected: target, actual: linked.sequence() });
    }
    if linked.author() != &author.id {
        return Err(LinkError::ForeignAuthor { sequence: linked.sequence() });
    }
    Ok(Link::Linked(linked.key))
}

fn check_skip_shape(sequence: u64, skip: Link) -> Result<(), LinkError> {
    match (sequence, skip) {
        (1, Link::Linked(_)) => Err(LinkError::RootWithLink(LinkKind::Skip)),
        (2.., Link::Root) => Err(LinkError::MissingLink { sequence, link: LinkKind::Skip }),
        _ => Ok(()),
    }
}

/// Build and sign one entry with explicit links.
///
/// The previous link is derived from `new.previous`. The skip link is taken
/// as given; [`append`] and [`build_chain`] compute it for you.
pub async fn create<S, C>(
    author: &Author,
    signer: &S,
    clock: &C,
    new: NewEntry<'_>,
) -> Result<Entry, BuildError>
where
    S: Signer + ?Sized,
    C: Clock + ?Sized,
{
    check_position(author, new.sequence, new.previous)?;
    check_skip_shape(new.sequence, new.skip)?;
    new.content.validate()?;

    let signer_id = signer.author_id();
    if signer_id != author.id {
        return Err(BuildError::SignerMismatch { author: author.id, signer: signer_id });
    }

    let unsigned = UnsignedMetadata {
        timestamp: clock.timestamp(),
        content_proof: content_proof(&new.content)?,
        sequence: new.sequence,
        skip: new.skip,
        previous: new.previous.map_or(Link::Root, |prev| Link::Linked(prev.key)),
        author_label: author.label.clone(),
        author: author.id,
    };

    let signature = signer.sign(&unsigned.signing_bytes()?).await?;
    let metadata = unsigned.into_signed(signature);
    let key = entry_key(&metadata)?;

    tracing::debug!("Created entry {} at sequence {}", key, metadata.sequence);

    Ok(Entry { metadata, key, content: new.content })
}

/// Append one entry after `previous`, resolving the skip target by sequence.
pub async fn append<S, C, R>(
    author: &Author,
    signer: &S,
    clock: &C,
    content: Content,
    previous: &Entry,
    resolver: &R,
) -> Result<Entry, BuildError>
where
    S: Signer + ?Sized,
    C: Clock + ?Sized,
    R: SequenceResolver + ?Sized,
{
    let sequence = previous.sequence().saturating_add(1);
    check_position(author, sequence, Some(previous))?;

    let target = skip_target(sequence);
    let linked = resolver
        .resolve_sequence(target)
        .await?
        .ok_or(BuildError::UnresolvedLink { sequence: target })?;

    let skip = link_skip_target(author, target, &linked)?;

    let new = NewEntry { content, sequence, previous: Some(previous), skip };
    create(author, signer, clock, new).await
}

/// Build a batch of consecutive entries after `previous`.
///
/// Skip keys are resolved through `resolver`, which sees the entries built so
/// far in this batch. Each position is validated before anything is resolved
/// or signed; the first failure aborts the batch.
pub async fn build_chain<S, C, R>(
    author: &Author,
    signer: &S,
    clock: &C,
    resolver: &R,
    previous: Option<&Entry>,
    pending: &[PendingEntry],
) -> Result<Vec<Entry>, BuildError>
where
    S: Signer + ?Sized,
    C: Clock + ?Sized,
    R: ChainKeyResolver + ?Sized,
{
    let mut built: Vec<Entry> = Vec::with_capacity(pending.len());

    for item in pending {
        let predecessor = built.last().or(previous);
        let next = predecessor.map_or(1, |prev| prev.sequence().saturating_add(1));
        let sequence = item.sequence.unwrap_or(next);
        check_position(author, sequence, predecessor)?;

        let skip = if sequence == 1 {
            Link::Root
        } else {
            let target = skip_target(sequence);
            let linked = resolver
                .resolve_key_for_index(target, &built)
                .await?
                .ok_or(BuildError::UnresolvedLink { sequence: target })?;
            link_skip_target(author, target, &linked)?
        };

        let new = NewEntry { content: item.content.clone(), sequence, previous: predecessor, skip };
        let entry = create(author, signer, clock, new).await?;
        built.push(entry);
    }

    if let Some(last) = built.last() {
        tracing::debug!("Built {} entries up to sequence {}", built.len(), last.sequence());
    }

    Ok(built)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use lipmaa_crypto::Ed25519Verifier;

    use super::*;
    use crate::{
        env::ManualClock,
        resolve::{BatchOnly, BatchResolver},
        storage::MemoryLog,
        testutil::{alice, alice_log, bob, bob_log, pending},
        verify::is_valid,
    };

    #[tokio::test]
    async fn first_entry_has_no_links() {
        let (author, signer) = alice();
        let clock = ManualClock::new(1);
        let new = NewEntry {
            content: Content::text("hello"),
            sequence: 1,
            previous: None,
            skip: Link::Root,
        };

        let entry = create(&author, &signer, &clock, new).await.unwrap();

        assert_eq!(entry.sequence(), 1);
        assert!(entry.previous().is_root());
        assert!(entry.skip().is_root());
        assert_eq!(entry.metadata.author_label, "alice");
        assert!(is_valid(&entry, &Ed25519Verifier));
    }

    #[tokio::test]
    async fn chain_links_follow_lipmaa() {
        let log = alice_log(40).await;

        for entry in &log[1..] {
            let n = entry.sequence();
            let target = &log[usize::try_from(skip_target(n)).unwrap() - 1];
            let prev = &log[usize::try_from(n).unwrap() - 2];
            assert_eq!(entry.skip(), Link::Linked(target.key), "skip of {n}");
            assert_eq!(entry.previous(), Link::Linked(prev.key), "previous of {n}");
        }
    }

    #[tokio::test]
    async fn distinct_timestamps_give_distinct_keys() {
        let (author, signer) = alice();
        let clock = ManualClock::new(1);
        let new = || NewEntry {
            content: Content::text("same"),
            sequence: 1,
            previous: None,
            skip: Link::Root,
        };

        let a = create(&author, &signer, &clock, new()).await.unwrap();
        let b = create(&author, &signer, &clock, new()).await.unwrap();

        assert_ne!(a.key, b.key);
    }

    #[tokio::test]
    async fn identical_inputs_give_identical_keys() {
        let (author, signer) = alice();
        let new = || NewEntry {
            content: Content::text("same"),
            sequence: 1,
            previous: None,
            skip: Link::Root,
        };

        let a = create(&author, &signer, &ManualClock::new(7), new()).await.unwrap();
        let b = create(&author, &signer, &ManualClock::new(7), new()).await.unwrap();

        assert_eq!(a.key, b.key);
    }

    #[tokio::test]
    async fn sequence_zero_rejected() {
        let (author, signer) = alice();
        let new = NewEntry {
            content: Content::text("zero"),
            sequence: 0,
            previous: None,
            skip: Link::Root,
        };

        let err = create(&author, &signer, &ManualClock::new(1), new).await.unwrap_err();
        assert_eq!(err, BuildError::SequenceViolation(LinkError::Zero));
    }

    #[tokio::test]
    async fn later_entry_needs_predecessor() {
        let (author, signer) = alice();
        let log = alice_log(1).await;
        let new = NewEntry {
            content: Content::text("orphan"),
            sequence: 2,
            previous: None,
            skip: Link::Linked(log[0].key),
        };

        let err = create(&author, &signer, &ManualClock::new(1), new).await.unwrap_err();
        assert_eq!(
            err,
            BuildError::SequenceViolation(LinkError::MissingLink {
                sequence: 2,
                link: LinkKind::Previous
            })
        );
    }

    #[tokio::test]
    async fn predecessor_must_be_adjacent() {
        let (author, signer) = alice();
        let log = alice_log(3).await;
        let new = NewEntry {
            content: Content::text("gap"),
            sequence: 5,
            previous: Some(&log[2]),
            skip: Link::Linked(log[0].key),
        };

        let err = create(&author, &signer, &ManualClock::new(1), new).await.unwrap_err();
        assert_eq!(
            err,
            BuildError::SequenceViolation(LinkError::Predecessor { expected: 4, actual: 3 })
        );
    }

    #[tokio::test]
    async fn root_with_skip_rejected() {
        let (author, signer) = alice();
        let log = alice_log(1).await;
        let new = NewEntry {
            content: Content::text("bad root"),
            sequence: 1,
            previous: None,
            skip: Link::Linked(log[0].key),
        };

        let err = create(&author, &signer, &ManualClock::new(1), new).await.unwrap_err();
        assert_eq!(err, BuildError::SequenceViolation(LinkError::RootWithLink(LinkKind::Skip)));
    }

    #[tokio::test]
    async fn foreign_predecessor_rejected() {
        let (author, signer) = alice();
        let bobs = bob_log(1).await;
        let new = NewEntry {
            content: Content::text("hijack"),
            sequence: 2,
            previous: Some(&bobs[0]),
            skip: Link::Linked(bobs[0].key),
        };

        let err = create(&author, &signer, &ManualClock::new(1), new).await.unwrap_err();
        assert_eq!(err, BuildError::SequenceViolation(LinkError::ForeignAuthor { sequence: 1 }));
    }

    #[tokio::test]
    async fn signer_must_match_author() {
        let (author, _) = alice();
        let (_, bob_signer) = bob();
        let new = NewEntry {
            content: Content::text("impostor"),
            sequence: 1,
            previous: None,
            skip: Link::Root,
        };

        let err = create(&author, &bob_signer, &ManualClock::new(1), new).await.unwrap_err();
        assert!(matches!(err, BuildError::SignerMismatch { .. }));
    }

    #[tokio::test]
    async fn malformed_content_rejected() {
        let (author, signer) = alice();
        let content = Content { alt: vec!["orphan alt".into()], ..Content::text("x") };
        let new = NewEntry { content, sequence: 1, previous: None, skip: Link::Root };

        let err = create(&author, &signer, &ManualClock::new(1), new).await.unwrap_err();
        assert!(matches!(err, BuildError::Content(_)));
    }

    #[tokio::test]
    async fn append_resolves_skip_target() {
        let (author, signer) = alice();
        let clock = ManualClock::new(10_000);
        let log = MemoryLog::from_entries(alice_log(12).await).unwrap();
        let head = log.latest().unwrap();

        let entry =
            append(&author, &signer, &clock, Content::text("13"), &head, &log).await.unwrap();

        assert_eq!(entry.sequence(), 13);
        assert_eq!(entry.skip(), Link::Linked(log.get(4).unwrap().key));
        assert_eq!(entry.previous(), Link::Linked(head.key));
    }

    #[tokio::test]
    async fn append_reports_missing_target() {
        let (author, signer) = alice();
        let log = alice_log(12).await;
        let empty = MemoryLog::new();
        let clock = ManualClock::new(1);

        let err = append(&author, &signer, &clock, Content::text("13"), &log[11], &empty)
            .await
            .unwrap_err();

        assert_eq!(err, BuildError::UnresolvedLink { sequence: 4 });
    }

    /// Answers every sequence lookup with the same entry.
    struct Answering(Entry);

    #[async_trait]
    impl SequenceResolver for Answering {
        async fn resolve_sequence(&self, _: u64) -> Result<Option<Entry>, ResolveError> {
            Ok(Some(self.0.clone()))
        }
    }

    #[tokio::test]
    async fn append_rejects_misplaced_target() {
        let (author, signer) = alice();
        let log = alice_log(12).await;
        let resolver = Answering(log[4].clone());
        let clock = ManualClock::new(1);

        let err = append(&author, &signer, &clock, Content::text("13"), &log[11], &resolver)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BuildError::SequenceViolation(LinkError::SkipTarget { expected: 4, actual: 5 })
        );
    }

    #[tokio::test]
    async fn append_rejects_foreign_target() {
        let (author, signer) = alice();
        let log = alice_log(12).await;
        let bobs = MemoryLog::from_entries(bob_log(4).await).unwrap();
        let clock = ManualClock::new(1);

        let err = append(&author, &signer, &clock, Content::text("13"), &log[11], &bobs)
            .await
            .unwrap_err();

        assert_eq!(err, BuildError::SequenceViolation(LinkError::ForeignAuthor { sequence: 4 }));
    }

    #[tokio::test]
    async fn build_chain_extends_stored_log() {
        let (author, signer) = alice();
        let clock = ManualClock::new(50_000);
        let log = MemoryLog::from_entries(alice_log(10).await).unwrap();
        let head = log.latest().unwrap();

        let resolver = BatchResolver::new(&log);
        let batch = build_chain(&author, &signer, &clock, &resolver, Some(&head), &pending(5))
            .await
            .unwrap();

        assert_eq!(batch.iter().map(Entry::sequence).collect::<Vec<_>>(), vec![11, 12, 13, 14, 15]);
        // 13 reaches back into the stored log; 14 into the batch.
        assert_eq!(batch[2].skip(), Link::Linked(log.get(4).unwrap().key));
        assert_eq!(batch[3].skip(), Link::Linked(batch[2].key));
        for entry in &batch {
            log.append(entry.clone()).unwrap();
        }
    }

    #[tokio::test]
    async fn build_chain_rejects_foreign_store() {
        let (author, signer) = alice();
        let log = alice_log(3).await;
        let bobs = MemoryLog::from_entries(bob_log(3).await).unwrap();

        let resolver = BatchResolver::new(&bobs);
        let err = build_chain(
            &author,
            &signer,
            &ManualClock::new(1),
            &resolver,
            Some(&log[2]),
            &pending(1),
        )
        .await
        .unwrap_err();

        assert_eq!(err, BuildError::SequenceViolation(LinkError::ForeignAuthor { sequence: 1 }));
    }

    #[tokio::test]
    async fn build_chain_rejects_misplaced_target() {
        let (author, signer) = alice();
        let log = alice_log(3).await;
        let resolver = Answering(log[1].clone());

        let err = build_chain(
            &author,
            &signer,
            &ManualClock::new(1),
            &BatchResolver::new(&resolver),
            Some(&log[2]),
            &pending(1),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            BuildError::SequenceViolation(LinkError::SkipTarget { expected: 1, actual: 2 })
        );
    }

    #[tokio::test]
    async fn build_chain_rejects_wrong_sequence() {
        let (author, signer) = alice();
        let items = vec![
            PendingEntry::at(Content::text("one"), 1),
            PendingEntry::at(Content::text("three"), 3),
        ];

        let err = build_chain(&author, &signer, &ManualClock::new(1), &BatchOnly, None, &items)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BuildError::SequenceViolation(LinkError::Predecessor { expected: 2, actual: 1 })
        );
    }

    #[tokio::test]
    async fn build_chain_without_history_cannot_resolve() {
        let (author, signer) = alice();
        let log = alice_log(3).await;

        // BatchOnly only sees the batch, so the skip target 1 is unknown.
        let err = build_chain(
            &author,
            &signer,
            &ManualClock::new(1),
            &BatchOnly,
            Some(&log[2]),
            &pending(2),
        )
        .await
        .unwrap_err();

        assert_eq!(err, BuildError::UnresolvedLink { sequence: 1 });
    }

    #[tokio::test]
    async fn empty_batch_builds_nothing() {
        let (author, signer) = alice();
        let built = build_chain(&author, &signer, &ManualClock::new(1), &BatchOnly, None, &[])
            .await
            .unwrap();
        assert!(built.is_empty());
    }
}

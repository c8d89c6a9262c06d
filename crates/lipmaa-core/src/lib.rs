//! Lipmaa-linked append-only logs.
//!
//! An author's log is a sequence of signed entries. Each entry links to its
//! predecessor and, through a skip link, to an earlier entry chosen by the
//! lipmaa rule. A relying party holding only the newest entry can check its
//! lineage back to the first entry in O(log n) hops.
//!
//! ## Architecture
//!
//! ```text
//! lipmaa-core
//!   ├─ address     (skip targets, paths, certificate pools)
//!   ├─ builder     (create, append, build_chain)
//!   ├─ verify      (single-entry integrity and link checks)
//!   ├─ chain       (skip-path verification with ChainReport)
//!   ├─ resolve     (KeyResolver, SequenceResolver, ChainKeyResolver)
//!   ├─ storage     (MemoryLog)
//!   └─ env         (Clock)
//! ```
//!
//! The core performs no I/O of its own. Signing, lookups and time come in
//! through the [`Signer`](lipmaa_crypto::Signer), resolver and [`Clock`]
//! collaborators.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod builder;
pub mod chain;
pub mod env;
pub mod resolve;
pub mod storage;
pub mod verify;

#[cfg(test)]
mod testutil;

pub use address::{certificate_pool, path_between, path_to_root, skip_target};
pub use builder::{Author, BuildError, NewEntry, PendingEntry, append, build_chain, create};
pub use chain::{ChainFailure, ChainReport, VerifyConfig, verify_between, verify_chain};
pub use env::{Clock, ManualClock};
pub use resolve::{
    BatchOnly, BatchResolver, ChainKeyResolver, KeyResolver, ResolveError, SequenceResolver,
};
pub use storage::{MemoryLog, StorageError};
pub use verify::{
    LinkError, LinkKind, VerifyError, check_backlink, check_entry, check_links, check_skip_link,
    compute_key, is_valid,
};

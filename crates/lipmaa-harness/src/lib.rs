//! Fault injection harness for lipmaa logs.
//!
//! [`ChaoticLog`] is a key resolver that misbehaves on a seeded schedule:
//! it drops entries, corrupts them, answers with the wrong entry or fails
//! outright. Every injected fault is recorded, so tests can check that the
//! chain verifier reports exactly the walks that were interfered with.
//!
//! Given the same seed and the same sequence of lookups, a `ChaoticLog`
//! injects the same faults.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chaos;
pub mod fixtures;

pub use chaos::{ChaoticLog, Fault, FaultConfig};
pub use fixtures::{TestAuthor, build_log};

//! Lipmaa cryptographic capabilities.
//!
//! This crate provides the hash function and the signing/verification
//! capabilities consumed by the log core.
//!
//! # Design
//!
//! Hashing is a pure function. Signing is an injected capability: the core
//! never sees private key material, it only calls [`Signer::sign`], which may
//! suspend (a hardware token, a remote keystore). Verification is synchronous
//! and side-effect free so that entry validation stays a pure predicate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod ed25519;
pub mod hash;
pub mod sign;

pub use ed25519::{Ed25519Signer, Ed25519Verifier};
pub use hash::{HASH_LEN, content_proof, entry_key, hash};
pub use sign::{SignError, Signer, Verifier};

//! Fuzz target for entry decoding and single-entry verification
//!
//! Entries arrive from untrusted peers, so decoding and checking must hold up
//! against arbitrary bytes.
//!
//! # Strategy
//!
//! - Raw bytes: fed straight to `Entry::decode`
//! - Structured mutation: a decoded entry is re-checked after flipping one
//!   byte of its signature
//!
//! # Invariants
//!
//! - NEVER panic on malformed CBOR, bad base64 or wrong identifier lengths
//! - A decoded entry re-encodes to bytes that decode to the same entry
//! - An entry that verifies stops verifying once its signature changes

#![no_main]

use libfuzzer_sys::fuzz_target;
use lipmaa_core::{check_links, is_valid};
use lipmaa_crypto::Ed25519Verifier;
use lipmaa_proto::{Entry, Signature};

fuzz_target!(|data: &[u8]| {
    let Ok(entry) = Entry::decode(data) else {
        return;
    };

    let _ = check_links(&entry);
    let valid = is_valid(&entry, &Ed25519Verifier);

    let encoded = entry.encode().expect("decoded entry must re-encode");
    let decoded = Entry::decode(&encoded).expect("re-encoded entry must decode");
    assert_eq!(decoded, entry);

    if valid {
        let mut tampered = entry.clone();
        let mut bytes = *tampered.metadata.signature.as_bytes();
        bytes[data.len() % Signature::LEN] ^= 0x01;
        tampered.metadata.signature = Signature::from_bytes(bytes);
        assert!(!is_valid(&tampered, &Ed25519Verifier));
    }
});

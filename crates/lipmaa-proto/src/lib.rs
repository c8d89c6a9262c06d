//! Lipmaa log wire types.
//!
//! This crate defines the data that travels between authors and relying
//! parties: entries, their metadata, the backward links between them, and the
//! deterministic encodings used for hashing and signing.
//!
//! # Canonical encoding
//!
//! Hashes and signatures are computed over CBOR encodings of fixed-order
//! structs (see [`encoding`]). Two structurally equal values always encode to
//! the same bytes, which is what makes keys reproducible across
//! implementations.
//!
//! # Text encoding
//!
//! Every binary identifier ([`EntryKey`], [`ContentProof`], [`AuthorId`],
//! [`Signature`]) serializes as unpadded URL-safe base64, including inside the
//! canonical record.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod content;
pub mod encoding;
pub mod entry;
pub mod link;
pub mod text;

pub use content::{Content, ContentError};
pub use encoding::EncodeError;
pub use entry::{Entry, Metadata, UnsignedMetadata};
pub use link::Link;
pub use text::{AuthorId, ContentProof, EntryKey, Signature, TextError};

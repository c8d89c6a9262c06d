//! Fixed-size binary identifiers and their text form.
//!
//! All identifiers use unpadded URL-safe base64. The same text appears in
//! JSON-ish debug output, in CBOR records and on the command line, so a key
//! printed by one tool can be pasted into another.

use std::{fmt, str::FromStr};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Errors from parsing an identifier's text form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// Input is not valid unpadded URL-safe base64.
    #[error("invalid base64: {0}")]
    Base64(String),

    /// Input decoded to the wrong number of bytes.
    #[error("expected {expected} bytes, got {actual}")]
    Length {
        /// Byte length of the identifier type.
        expected: usize,
        /// Byte length that was decoded.
        actual: usize,
    },
}

/// Encode bytes as unpadded URL-safe base64.
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded URL-safe base64 into exactly `N` bytes.
pub fn decode<const N: usize>(text: &str) -> Result<[u8; N], TextError> {
    let bytes = URL_SAFE_NO_PAD.decode(text).map_err(|e| TextError::Base64(e.to_string()))?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| TextError::Length { expected: N, actual })
}

macro_rules! text_encoded {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Length of the identifier in bytes.
            pub const LEN: usize = $len;

            /// Wrap raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Borrow the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Unpadded URL-safe base64 form.
            pub fn to_text(&self) -> String {
                encode(&self.0)
            }

            /// Parse the unpadded URL-safe base64 form.
            pub fn from_text(text: &str) -> Result<Self, TextError> {
                decode::<$len>(text).map(Self)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_text())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_text())
            }
        }

        impl FromStr for $name {
            type Err = TextError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_text(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_text())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                Self::from_text(&text).map_err(de::Error::custom)
            }
        }
    };
}

text_encoded!(
    /// Hash of an entry's signed metadata. Identifies the entry.
    EntryKey,
    32
);

text_encoded!(
    /// Hash of an entry's canonical content encoding.
    ContentProof,
    32
);

text_encoded!(
    /// Public identity of a log author (an Ed25519 verifying key).
    AuthorId,
    32
);

text_encoded!(
    /// Detached signature over an entry's unsigned metadata.
    Signature,
    64
);

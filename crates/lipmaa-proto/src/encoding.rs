//! Canonical CBOR encoding.
//!
//! Structs serialize as CBOR maps with their fields in declaration order, so
//! the byte output depends only on field values. Every hash and signature in
//! the log is computed over bytes produced here.

use serde::{Serialize, de::DeserializeOwned};

/// Encoding or decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// Value could not be serialized.
    #[error("CBOR encoding failed: {0}")]
    Encode(String),

    /// Bytes could not be deserialized into the requested type.
    #[error("CBOR decoding failed: {0}")]
    Decode(String),
}

/// Encode a value to its canonical bytes.
pub fn to_canonical<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| EncodeError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Decode a value from CBOR bytes.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, EncodeError> {
    ciborium::from_reader(bytes).map_err(|e| EncodeError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn truncated_input_fails_to_decode() {
        let bytes = to_canonical(&"hello world").unwrap();
        let result: Result<String, _> = from_slice(&bytes[..bytes.len() - 3]);
        assert!(matches!(result, Err(EncodeError::Decode(_))));
    }

    #[test]
    fn map_order_does_not_depend_on_insertion_order() {
        let mut a = BTreeMap::new();
        a.insert("z", 1);
        a.insert("a", 2);

        let mut b = BTreeMap::new();
        b.insert("a", 2);
        b.insert("z", 1);

        assert_eq!(to_canonical(&a).unwrap(), to_canonical(&b).unwrap());
    }

    proptest! {
        #[test]
        fn equal_values_encode_equally(text in ".*", n in any::<u64>()) {
            let first = to_canonical(&(text.clone(), n)).unwrap();
            let second = to_canonical(&(text, n)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}

//! Binary value codec for store entries.
//!
//! All module state is encoded with bincode's default (fixed-int,
//! little-endian) configuration so encodings are identical on every replica.

use super::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Codec(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_input_is_codec_error() {
        let bytes = encode(&(7u64, String::from("stake"))).unwrap();
        let err = decode::<(u64, String)>(&bytes[..4]).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }
}

//! Compact binary payloads using bincode

use super::{CacheEntry, CodecError, CodecKind, EntryCodec, ExpirationOnly};
use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};

/// Compact codec: bincode with varint integers
///
/// The format is not self-describing. Types whose `Deserialize` relies on
/// `deserialize_any` (`serde_json::Value`, untagged or internally tagged
/// enums, `#[serde(flatten)]`, skipped fields) encode fine but never decode,
/// so they read back as a miss. Use it only for plain structs and
/// externally tagged enums.
///
/// Decoding is bounded by the payload length, so a damaged length prefix
/// inside the payload cannot trigger an oversized allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl EntryCodec for BincodeCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Bincode
    }

    fn encode_payload<T: Serialize>(&self, entry: &CacheEntry<T>) -> Result<Vec<u8>, CodecError> {
        bincode::DefaultOptions::new()
            .serialize(entry)
            .map_err(|e| CodecError::NonExportable(e.to_string()))
    }

    fn decode_payload<T: DeserializeOwned>(
        &self,
        payload: &[u8],
    ) -> Result<CacheEntry<T>, CodecError> {
        bincode::DefaultOptions::new()
            .with_limit(payload.len() as u64)
            .deserialize(payload)
            .map_err(|e| CodecError::Corrupt(e.to_string()))
    }

    fn expiration_payload(&self, payload: &[u8]) -> Result<Option<f64>, CodecError> {
        bincode::DefaultOptions::new()
            .with_limit(payload.len() as u64)
            .allow_trailing_bytes()
            .deserialize::<ExpirationOnly>(payload)
            .map(|head| head.expiration)
            .map_err(|e| CodecError::Corrupt(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::test_support::Unexportable;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Dto {
        string_data: String,
        tags: Vec<String>,
    }

    #[test]
    fn test_struct_value_survives_encoding() {
        let codec = BincodeCodec;
        let dto = Dto {
            string_data: "abc".into(),
            tags: vec!["x".into(), "y".into()],
        };
        let unit = codec.encode(&CacheEntry::new(&dto, Some(1.25))).unwrap();
        let decoded: CacheEntry<Dto> = codec.decode(&unit).unwrap();
        assert_eq!(decoded.value, dto);
        assert_eq!(decoded.expiration, Some(1.25));
    }

    #[test]
    fn test_unexportable_value_fails_encoding() {
        let err = BincodeCodec
            .encode(&CacheEntry::new(Unexportable, None))
            .unwrap_err();
        assert!(matches!(err, CodecError::NonExportable(_)));
    }

    #[test]
    fn test_decoding_as_wrong_shape_is_corrupt() {
        let codec = BincodeCodec;
        let unit = codec.encode(&CacheEntry::new(true, None)).unwrap();
        let result: Result<CacheEntry<BTreeMap<String, Dto>>, _> = codec.decode(&unit);
        assert!(matches!(result, Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn test_empty_unit_is_corrupt() {
        let result: Result<CacheEntry<String>, _> = BincodeCodec.decode(&[]);
        assert!(matches!(result, Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn test_expiration_is_read_without_the_value() {
        let codec = BincodeCodec;
        let dto = Dto {
            string_data: "abc".into(),
            tags: vec!["hello world".into(); 1000],
        };
        let unit = codec.encode(&CacheEntry::new(&dto, Some(42.5))).unwrap();
        assert_eq!(codec.decode_expiration(&unit).unwrap(), Some(42.5));

        let unit = codec.encode(&CacheEntry::new(7u8, None)).unwrap();
        assert_eq!(codec.decode_expiration(&unit).unwrap(), None);
    }

    #[test]
    fn test_json_value_does_not_decode() {
        let codec = BincodeCodec;
        let unit = codec
            .encode(&CacheEntry::new(serde_json::json!({"a": 1}), None))
            .unwrap();
        let result: Result<CacheEntry<serde_json::Value>, _> = codec.decode(&unit);
        assert!(matches!(result, Err(CodecError::Corrupt(_))));
    }
}

//! Self-describing binary payloads using MessagePack

use super::{CacheEntry, CodecError, CodecKind, EntryCodec, ExpirationOnly};
use serde::{de::DeserializeOwned, Serialize};

/// Default codec: MessagePack with named struct fields
///
/// Every value is written with its type markers, so anything serde can
/// serialize reads back, including `serde_json::Value`, untagged enums and
/// flattened structs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackCodec;

impl EntryCodec for MessagePackCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::MessagePack
    }

    fn encode_payload<T: Serialize>(&self, entry: &CacheEntry<T>) -> Result<Vec<u8>, CodecError> {
        rmp_serde::to_vec_named(entry).map_err(|e| CodecError::NonExportable(e.to_string()))
    }

    fn decode_payload<T: DeserializeOwned>(
        &self,
        payload: &[u8],
    ) -> Result<CacheEntry<T>, CodecError> {
        rmp_serde::from_slice(payload).map_err(|e| CodecError::Corrupt(e.to_string()))
    }

    fn expiration_payload(&self, payload: &[u8]) -> Result<Option<f64>, CodecError> {
        rmp_serde::from_slice::<ExpirationOnly>(payload)
            .map(|head| head.expiration)
            .map_err(|e| CodecError::Corrupt(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::test_support::Unexportable;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    enum Setting {
        Flag(bool),
        Count(u32),
        Named { name: String, weight: f64 },
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Extended {
        id: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(flatten)]
        extra: BTreeMap<String, String>,
    }

    fn round_trip<T>(value: &T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        let codec = MessagePackCodec;
        let unit = codec.encode(&CacheEntry::new(value, Some(9.5))).unwrap();
        let entry: CacheEntry<T> = codec.decode(&unit).unwrap();
        assert_eq!(entry.expiration, Some(9.5));
        entry.value
    }

    #[test]
    fn test_json_value_reads_back() {
        let value = json!({"a": 1, "b": [true, "x", null], "c": {"d": -2.5}});
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_untagged_enum_reads_back() {
        for setting in [
            Setting::Flag(true),
            Setting::Count(300),
            Setting::Named {
                name: "w".into(),
                weight: 0.25,
            },
        ] {
            assert_eq!(round_trip(&setting), setting);
        }
    }

    #[test]
    fn test_flattened_struct_with_skipped_field_reads_back() {
        let value = Extended {
            id: 7,
            label: None,
            extra: BTreeMap::from([("k".to_string(), "v".to_string())]),
        };
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_unexportable_value_fails_encoding() {
        let err = MessagePackCodec
            .encode(&CacheEntry::new(Unexportable, None))
            .unwrap_err();
        assert!(matches!(err, CodecError::NonExportable(_)));
    }

    #[test]
    fn test_decoding_as_wrong_shape_is_corrupt() {
        let codec = MessagePackCodec;
        let unit = codec.encode(&CacheEntry::new("text", None)).unwrap();
        let result: Result<CacheEntry<Vec<u64>>, _> = codec.decode(&unit);
        assert!(matches!(result, Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn test_expiration_is_read_without_the_value() {
        let codec = MessagePackCodec;
        let unit = codec
            .encode(&CacheEntry::new(json!({"nested": [1, 2, 3]}), Some(42.5)))
            .unwrap();
        assert_eq!(codec.decode_expiration(&unit).unwrap(), Some(42.5));

        let unit = codec.encode(&CacheEntry::new((), None)).unwrap();
        assert_eq!(codec.decode_expiration(&unit).unwrap(), None);
    }
}

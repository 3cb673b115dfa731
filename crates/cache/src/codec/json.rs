//! Human-readable payloads using serde_json

use super::{CacheEntry, CodecError, CodecKind, EntryCodec, ExpirationOnly};
use serde::{de::DeserializeOwned, Serialize};

/// JSON payload codec
///
/// Slower and larger than [`MessagePackCodec`](super::MessagePackCodec), but the
/// payload of an entry file can be inspected with ordinary tools. Values that
/// JSON cannot represent, such as maps with non-string keys, are rejected as
/// non-exportable.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl EntryCodec for JsonCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Json
    }

    fn encode_payload<T: Serialize>(&self, entry: &CacheEntry<T>) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(entry).map_err(|e| CodecError::NonExportable(e.to_string()))
    }

    fn decode_payload<T: DeserializeOwned>(
        &self,
        payload: &[u8],
    ) -> Result<CacheEntry<T>, CodecError> {
        serde_json::from_slice(payload).map_err(|e| CodecError::Corrupt(e.to_string()))
    }

    fn expiration_payload(&self, payload: &[u8]) -> Result<Option<f64>, CodecError> {
        serde_json::from_slice::<ExpirationOnly>(payload)
            .map(|head| head.expiration)
            .map_err(|e| CodecError::Corrupt(e.to_string()))
    }
}

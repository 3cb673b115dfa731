//! Storable unit encoding
//!
//! A [`CacheEntry`] couples a value with its absolute expiration timestamp.
//! [`EntryCodec`] implementations turn the entry into a payload; the
//! [`envelope`] module frames the payload with a checksummed header so that a
//! truncated or foreign file is detected as corrupt instead of being decoded
//! into partial data.

mod binary;
pub mod envelope;
mod json;
mod msgpack;

pub use binary::BincodeCodec;
pub use json::JsonCodec;
pub use msgpack::MessagePackCodec;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// The decoded shape of every stored unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Absolute Unix timestamp in fractional seconds, `None` never expires
    pub expiration: Option<f64>,
    pub value: T,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, expiration: Option<f64>) -> Self {
        Self { expiration, value }
    }
}

/// The leading field of every payload, used when only freshness matters
#[derive(Debug, Deserialize)]
pub struct ExpirationOnly {
    pub expiration: Option<f64>,
}

/// Codec failures
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value cannot be represented in the storage format
    #[error("value is not exportable: {0}")]
    NonExportable(String),

    /// The stored unit cannot be loaded
    #[error("corrupt entry: {0}")]
    Corrupt(String),
}

/// Payload formats, recorded in the envelope header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CodecKind {
    Bincode = 1,
    Json = 2,
    MessagePack = 3,
}

impl CodecKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Bincode),
            2 => Some(Self::Json),
            3 => Some(Self::MessagePack),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Pluggable payload encoding
///
/// Implementors only deal with the payload; framing and integrity checks are
/// provided by [`EntryCodec::encode`] and [`EntryCodec::decode`].
pub trait EntryCodec: Send + Sync {
    fn kind(&self) -> CodecKind;

    fn encode_payload<T: Serialize>(&self, entry: &CacheEntry<T>) -> Result<Vec<u8>, CodecError>;

    fn decode_payload<T: DeserializeOwned>(&self, payload: &[u8])
        -> Result<CacheEntry<T>, CodecError>;

    /// Read the expiration without materializing the value
    fn expiration_payload(&self, payload: &[u8]) -> Result<Option<f64>, CodecError>;

    /// Produce a complete storable unit
    fn encode<T: Serialize>(&self, entry: &CacheEntry<T>) -> Result<Vec<u8>, CodecError> {
        let payload = self.encode_payload(entry)?;
        Ok(envelope::seal(self.kind(), &payload))
    }

    /// Load a complete storable unit
    fn decode<T: DeserializeOwned>(&self, unit: &[u8]) -> Result<CacheEntry<T>, CodecError> {
        let payload = envelope::open(self.kind(), unit)?;
        self.decode_payload(payload)
    }

    /// Load only the expiration of a complete storable unit
    fn decode_expiration(&self, unit: &[u8]) -> Result<Option<f64>, CodecError> {
        let payload = envelope::open(self.kind(), unit)?;
        self.expiration_payload(payload)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_kind_tags() {
        for kind in [CodecKind::Bincode, CodecKind::Json, CodecKind::MessagePack] {
            assert_eq!(CodecKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(CodecKind::from_tag(0), None);
        assert_eq!(CodecKind::from_tag(9), None);
    }
}

//! Storable unit framing
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! magic    u32   "FSC1"
//! version  u16
//! codec    u8    payload format tag
//! flags    u8    reserved, zero
//! length   u64   payload length in bytes
//! crc      u32   CRC32C of the payload
//! payload  [u8; length]
//! ```

use super::{CodecError, CodecKind};
use crc32c::crc32c;

/// Magic number for entry files: "FSC1"
pub const ENTRY_MAGIC: u32 = 0x4653_4331;

/// Current envelope version
pub const ENVELOPE_VERSION: u16 = 1;

/// Size of the fixed header
pub const HEADER_LEN: usize = 4 + 2 + 1 + 1 + 8 + 4;

/// Fixed-size header preceding every payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader {
    magic: u32,
    version: u16,
    codec: u8,
    flags: u8,
    length: u64,
    crc: u32,
}

impl EnvelopeHeader {
    pub fn new(kind: CodecKind, payload: &[u8]) -> Self {
        Self {
            magic: ENTRY_MAGIC,
            version: ENVELOPE_VERSION,
            codec: kind.tag(),
            flags: 0,
            length: payload.len() as u64,
            crc: crc32c(payload),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6] = self.codec;
        bytes[7] = self.flags;
        bytes[8..16].copy_from_slice(&self.length.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.crc.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::Corrupt(format!(
                "truncated header: {} of {HEADER_LEN} bytes",
                bytes.len()
            )));
        }

        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let mut length = [0u8; 8];
        length.copy_from_slice(&bytes[8..16]);

        Ok(Self {
            magic: u32_at(0),
            version: u16::from_le_bytes([bytes[4], bytes[5]]),
            codec: bytes[6],
            flags: bytes[7],
            length: u64::from_le_bytes(length),
            crc: u32_at(16),
        })
    }

    pub fn validate(&self, expected: CodecKind) -> Result<(), CodecError> {
        if self.magic != ENTRY_MAGIC {
            return Err(CodecError::Corrupt(format!(
                "invalid magic number: expected {ENTRY_MAGIC:08x}, got {:08x}",
                self.magic
            )));
        }

        if self.version == 0 || self.version > ENVELOPE_VERSION {
            return Err(CodecError::Corrupt(format!(
                "unsupported envelope version: {}",
                self.version
            )));
        }

        match CodecKind::from_tag(self.codec) {
            Some(kind) if kind == expected => Ok(()),
            Some(kind) => Err(CodecError::Corrupt(format!(
                "entry was written by the {kind:?} codec, expected {expected:?}"
            ))),
            None => Err(CodecError::Corrupt(format!(
                "unknown codec tag {}",
                self.codec
            ))),
        }
    }

    pub fn payload_len(&self) -> u64 {
        self.length
    }
}

/// Frame a payload into a storable unit
pub fn seal(kind: CodecKind, payload: &[u8]) -> Vec<u8> {
    let header = EnvelopeHeader::new(kind, payload);
    let mut unit = Vec::with_capacity(HEADER_LEN + payload.len());
    unit.extend_from_slice(&header.to_bytes());
    unit.extend_from_slice(payload);
    unit
}

/// Validate a storable unit and return its payload
pub fn open(kind: CodecKind, unit: &[u8]) -> Result<&[u8], CodecError> {
    let header = EnvelopeHeader::from_bytes(unit)?;
    header.validate(kind)?;

    let payload = &unit[HEADER_LEN..];
    if payload.len() as u64 != header.payload_len() {
        return Err(CodecError::Corrupt(format!(
            "payload length mismatch: header declares {} bytes, found {}",
            header.payload_len(),
            payload.len()
        )));
    }

    let actual = crc32c(payload);
    if actual != header.crc {
        return Err(CodecError::Corrupt(format!(
            "payload CRC mismatch: expected {:08x}, got {actual:08x}",
            header.crc
        )));
    }

    Ok(payload)
}

//! Error conversion utilities

use super::types::{CacheError, RecoveryHint};
use crate::codec::CodecError;
use std::path::PathBuf;

impl CacheError {
    /// Map a codec failure during `set` for `key`
    ///
    /// Encoding failures are the caller's problem: the value cannot be exported.
    pub(crate) fn from_encode(key: &str, error: CodecError) -> Self {
        Self::InvalidArgument {
            key: key.to_string(),
            reason: error.to_string(),
            source: Some(Box::new(error)),
            recovery_hint: RecoveryHint::FixInput {
                instructions: "Store a value whose Serialize implementation succeeds".to_string(),
            },
        }
    }

    /// Map a codec failure while loading the entry at `path`
    pub(crate) fn from_decode(path: impl Into<PathBuf>, error: CodecError) -> Self {
        Self::Corruption {
            path: path.into(),
            reason: error.to_string(),
            recovery_hint: RecoveryHint::TreatAsMiss,
        }
    }
}

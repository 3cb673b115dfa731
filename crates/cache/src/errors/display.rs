//! Display implementations for cache errors

use super::types::CacheError;
use std::fmt;

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { key, reason, .. } => {
                write!(f, "Invalid argument for cache key '{key}': {reason}")
            }
            Self::Io {
                path,
                operation,
                source,
                ..
            } => write!(
                f,
                "I/O error during {} on '{}': {}",
                operation,
                path.display(),
                source
            ),
            Self::LockUnavailable { path, mode, .. } => write!(
                f,
                "Unable to acquire {} lock for file '{}'",
                mode,
                path.display()
            ),
            Self::Corruption { path, reason, .. } => write!(
                f,
                "Cache entry '{}' is corrupted: {}",
                path.display(),
                reason
            ),
            Self::Configuration { message, .. } => {
                write!(f, "Cache configuration error: {message}")
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidArgument {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

//! Core error types for the cache engine

use std::path::PathBuf;
use std::time::Duration;

use crate::lock::AccessMode;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Re-export CacheError as Error for convenience
pub use CacheError as Error;

/// Error type for cache operations
#[derive(Debug)]
pub enum CacheError {
    /// The caller supplied something the cache cannot store: a TTL outside the
    /// representable timestamp range or a value the codec cannot export
    InvalidArgument {
        key: String,
        reason: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        recovery_hint: RecoveryHint,
    },

    /// I/O errors during cache operations, including compiled cache failures
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// Another handle holds a conflicting advisory lock on the entry file
    LockUnavailable {
        path: PathBuf,
        mode: AccessMode,
        recovery_hint: RecoveryHint,
    },

    /// A stored unit could not be decoded
    Corruption {
        path: PathBuf,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Configuration error
    Configuration {
        message: String,
        recovery_hint: RecoveryHint,
    },
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryHint {
    /// Retry the operation
    Retry { after: Duration },

    /// Treat the entry as not cached
    TreatAsMiss,

    /// Check file permissions
    CheckPermissions { path: PathBuf },

    /// Check disk space and clean up if needed
    CheckDiskSpace,

    /// Fix the offending input
    FixInput { instructions: String },

    /// Update cache configuration
    UpdateConfiguration,

    /// No recovery possible
    NoRecovery,
}

impl CacheError {
    /// Build an I/O error with a hint derived from the error kind
    pub fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        let path = path.into();
        let recovery_hint = RecoveryHint::for_io(&path, &source);
        Self::Io {
            path,
            operation,
            source,
            recovery_hint,
        }
    }

    /// Build a lock contention error
    pub fn lock_unavailable(path: impl Into<PathBuf>, mode: AccessMode) -> Self {
        Self::LockUnavailable {
            path: path.into(),
            mode,
            recovery_hint: RecoveryHint::Retry {
                after: Duration::from_millis(10),
            },
        }
    }

    /// Build an invalid argument error for a key
    pub fn invalid_argument(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            key: key.to_string(),
            reason: reason.into(),
            source: None,
            recovery_hint: RecoveryHint::FixInput {
                instructions: "Pass a storable value and a TTL within the timestamp range"
                    .to_string(),
            },
        }
    }

    /// Build a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            recovery_hint: RecoveryHint::UpdateConfiguration,
        }
    }
}

impl RecoveryHint {
    pub(crate) fn for_io(path: &std::path::Path, error: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::CheckPermissions {
                path: path.to_path_buf(),
            },
            ErrorKind::WouldBlock | ErrorKind::Interrupted | ErrorKind::TimedOut => Self::Retry {
                after: Duration::from_millis(10),
            },
            ErrorKind::WriteZero | ErrorKind::OutOfMemory => Self::CheckDiskSpace,
            _ => Self::NoRecovery,
        }
    }
}

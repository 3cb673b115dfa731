//! Recovery utilities for cache errors

use super::types::{CacheError, RecoveryHint};

impl CacheError {
    /// Get the recovery hint for this error
    #[must_use]
    pub const fn recovery_hint(&self) -> &RecoveryHint {
        match self {
            Self::InvalidArgument { recovery_hint, .. }
            | Self::Io { recovery_hint, .. }
            | Self::LockUnavailable { recovery_hint, .. }
            | Self::Corruption { recovery_hint, .. }
            | Self::Configuration { recovery_hint, .. } => recovery_hint,
        }
    }

    /// Check if this error is transient and can be retried
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.recovery_hint(), RecoveryHint::Retry { .. })
    }

    /// Check if this error indicates data corruption
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption { .. })
    }

    /// Check if this error was caused by a contended advisory lock
    #[must_use]
    pub const fn is_lock_contention(&self) -> bool {
        matches!(self, Self::LockUnavailable { .. })
    }

    /// Check if this error was caused by caller input
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::AccessMode;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_lock_contention_is_transient() {
        let err = CacheError::lock_unavailable("/tmp/x", AccessMode::Write);
        assert!(err.is_transient());
        assert!(err.is_lock_contention());
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_permission_denied_hint() {
        let err = CacheError::io(
            "/tmp/x",
            "open file",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert_eq!(
            err.recovery_hint(),
            &RecoveryHint::CheckPermissions {
                path: PathBuf::from("/tmp/x")
            }
        );
        assert!(!err.is_transient());
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = CacheError::invalid_argument("k", "bad ttl");
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_string(), "Invalid argument for cache key 'k': bad ttl");
    }

    #[test]
    fn test_io_error_exposes_source() {
        use std::error::Error as _;
        let err = CacheError::io(
            "/tmp/x",
            "write cache entry",
            io::Error::new(io::ErrorKind::WriteZero, "short write"),
        );
        assert!(err.source().is_some());
        assert_eq!(err.recovery_hint(), &RecoveryHint::CheckDiskSpace);
    }
}

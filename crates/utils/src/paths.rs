//! Default locations for cache storage

use std::env;
use std::path::{Path, PathBuf};

/// Directory name used under the platform temp directory
pub const DEFAULT_ROOT_NAME: &str = "fscache";

/// Get the default storage root
///
/// Returns a dedicated directory inside the platform temp directory:
/// - Unix: `$TMPDIR/fscache` (usually `/tmp/fscache`)
/// - Windows: `%TEMP%\fscache`
///
/// A dedicated subdirectory is used so that clearing the cache never walks
/// unrelated files living directly in the temp directory.
pub fn default_storage_root() -> PathBuf {
    env::temp_dir().join(DEFAULT_ROOT_NAME)
}

/// Strip trailing separators from a configured storage path
///
/// `"/var/cache/app/"` and `"/var/cache/app"` must resolve to the same entry
/// paths. The filesystem root itself is returned unchanged.
pub fn normalize_root(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        normalized.push(component.as_os_str());
    }
    if normalized.as_os_str().is_empty() {
        return path.to_path_buf();
    }
    normalized
}

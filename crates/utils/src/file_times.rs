//! Modification time helpers
//!
//! Compiled-source caches commonly decide staleness from a file's mtime with
//! one-second granularity. A file rewritten twice inside the same second keeps
//! the same mtime, so the cache would keep serving the first version. Pinning
//! freshly written files to an instant safely in the past avoids that window.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// How far in the past the pinned mtime is placed
pub const SAFE_MTIME_OFFSET: Duration = Duration::from_secs(10);

/// A fixed modification time strictly in the past, captured once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeMtime(SystemTime);

impl SafeMtime {
    /// Capture `now - SAFE_MTIME_OFFSET`
    pub fn capture() -> Self {
        Self::at(SystemTime::now())
    }

    /// Capture relative to an explicit instant
    pub fn at(now: SystemTime) -> Self {
        Self(now.checked_sub(SAFE_MTIME_OFFSET).unwrap_or(SystemTime::UNIX_EPOCH))
    }

    pub fn instant(&self) -> SystemTime {
        self.0
    }

    /// Set the modification time of an open file to the pinned instant
    pub fn apply(&self, file: &File) -> io::Result<()> {
        file.set_modified(self.0)
    }
}

/// Read the modification time of a path, `None` if it does not exist
pub fn modified_time(path: &Path) -> io::Result<Option<SystemTime>> {
    match std::fs::metadata(path) {
        Ok(metadata) => metadata.modified().map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_safe_mtime_is_in_the_past() {
        let now = SystemTime::now();
        let safe = SafeMtime::at(now);
        assert_eq!(now.duration_since(safe.instant()).unwrap(), SAFE_MTIME_OFFSET);
    }

    #[test]
    fn test_apply_pins_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entry");
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&path)
            .unwrap();
        file.write_all(b"payload").unwrap();

        let safe = SafeMtime::capture();
        safe.apply(&file).unwrap();
        drop(file);

        let mtime = modified_time(&path).unwrap().unwrap();
        let delta = match mtime.duration_since(safe.instant()) {
            Ok(d) => d,
            Err(e) => e.duration(),
        };
        // Some filesystems truncate timestamps to whole seconds
        assert!(delta < Duration::from_secs(1));
        assert!(mtime < SystemTime::now());
    }

    #[test]
    fn test_modified_time_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert_eq!(modified_time(&missing).unwrap(), None);
    }
}

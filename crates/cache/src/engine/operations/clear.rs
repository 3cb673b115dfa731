//! Cache clearing

use crate::codec::EntryCodec;
use std::fs;
use std::io;
use walkdir::WalkDir;

use super::super::types::FileCache;

impl<C: EntryCodec> FileCache<C> {
    /// Remove every entry and shard directory under the storage root
    ///
    /// The tree is walked depth-first with contents before their directory.
    /// Files go through the regular delete path, directories are removed once
    /// empty. Failures are logged and the walk continues; the result is
    /// `false` if anything could not be removed. The root itself is kept.
    pub fn clear(&self) -> bool {
        let root = self.root();
        match fs::metadata(root) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return true,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "cannot inspect cache root");
                return false;
            }
        }

        let mut all_removed = true;
        let mut files = 0usize;

        for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if e.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) {
                        continue;
                    }
                    tracing::warn!(error = %e, "failed to walk cache directory");
                    all_removed = false;
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_dir() {
                match fs::remove_dir(path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "failed to remove cache directory"
                        );
                        all_removed = false;
                    }
                }
                continue;
            }

            match self.remove_entry_file(path) {
                Ok(removed) => {
                    files += 1;
                    all_removed &= removed;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to remove cache file"
                    );
                    all_removed = false;
                }
            }
        }

        tracing::debug!(root = %root.display(), files, all_removed, "cache cleared");
        all_removed
    }
}

//! Cache delete operations

use crate::codec::EntryCodec;
use crate::errors::{CacheError, Result};
use crate::lock::{AccessMode, LockedFile};
use crate::ttl::{is_expired_at, now_timestamp};
use std::fs;
use std::io;
use std::path::Path;

use super::super::types::FileCache;

impl<C: EntryCodec> FileCache<C> {
    /// Remove `key`
    ///
    /// Deleting an absent key succeeds. When a compiled cache is attached it
    /// is invalidated first, and a failure there aborts the delete.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key);
        let removed = self.remove_entry_file(&path)?;
        tracing::debug!(key, "cache entry deleted");
        Ok(removed)
    }

    /// Remove every key, continuing past failures
    pub fn delete_multiple<K>(&self, keys: K) -> bool
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let mut all_deleted = true;

        for key in keys {
            let key = key.as_ref();
            match self.delete(key) {
                Ok(deleted) => all_deleted &= deleted,
                Err(e) => {
                    tracing::warn!(key, error = %e, "failed to delete cache entry");
                    all_deleted = false;
                }
            }
        }

        all_deleted
    }

    /// Delete path shared by `delete` and `clear`
    pub(super) fn remove_entry_file(&self, path: &Path) -> Result<bool> {
        match fs::metadata(path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(CacheError::io(path, "inspect cache file", e)),
        }

        self.bridge.before_delete(path)?;

        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(CacheError::io(path, "remove cache file", e)),
        }
    }

    /// Delete the entry file at `path` if it still holds an expired unit
    ///
    /// The unit is re-read under an exclusive lock, so an entry rewritten
    /// since it was found expired survives. A held lock or an unreadable unit
    /// leaves the file in place. Returns whether the file was removed.
    pub(crate) fn remove_if_expired(&self, path: &Path) -> Result<bool> {
        let mut file = match LockedFile::open_existing(path, AccessMode::Write) {
            Ok(Some(file)) => file,
            Ok(None) => return Ok(false),
            Err(e) if e.is_lock_contention() => {
                tracing::debug!(
                    path = %path.display(),
                    "expired entry is locked, leaving it"
                );
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let unit = file.read_all()?;
        match self.codec.decode_expiration(&unit) {
            Ok(expiration) if is_expired_at(expiration, now_timestamp()) => {}
            Ok(_) | Err(_) => return Ok(false),
        }

        self.bridge.before_delete(path)?;

        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(path, "remove cache file", e)),
        }
    }
}

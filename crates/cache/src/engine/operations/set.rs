//! Cache write operations

use crate::codec::{CacheEntry, EntryCodec};
use crate::errors::{CacheError, Result};
use crate::lock::LockedFile;
use crate::ttl::Ttl;
use serde::Serialize;

use super::super::types::FileCache;

impl<C: EntryCodec> FileCache<C> {
    /// Store `value` under `key`
    ///
    /// The entry file is rewritten in place under an exclusive lock. A TTL
    /// outside the timestamp range or a value the codec cannot export is an
    /// [`CacheError::InvalidArgument`]; nothing is written in that case.
    pub fn set<T>(&self, key: &str, value: &T, ttl: impl Into<Ttl>) -> Result<bool>
    where
        T: Serialize + ?Sized,
    {
        let expiration = match ttl.into().expiration() {
            Ok(expiration) => expiration,
            Err(e) => return Err(CacheError::invalid_argument(key, e.to_string())),
        };

        let unit = match self.codec.encode(&CacheEntry::new(value, expiration)) {
            Ok(unit) => unit,
            Err(e) => return Err(CacheError::from_encode(key, e)),
        };

        let mut file = LockedFile::create(&self.entry_path(key))?;
        file.replace_contents(&unit, self.sync_writes)?;
        self.bridge.after_write(&file)?;
        drop(file);

        tracing::debug!(key, bytes = unit.len(), ?expiration, "cache entry written");
        Ok(true)
    }

    /// Store every pair with the same TTL
    ///
    /// Pairs are written one after another. A failure is logged and does not
    /// stop the remaining writes.
    pub fn set_multiple<I, K, V>(&self, values: I, ttl: impl Into<Ttl>) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let ttl = ttl.into();
        let mut all_stored = true;

        for (key, value) in values {
            let key = key.as_ref();
            match self.set(key, &value, ttl) {
                Ok(stored) => all_stored &= stored,
                Err(e) => {
                    tracing::warn!(key, error = %e, "failed to store cache entry");
                    all_stored = false;
                }
            }
        }

        all_stored
    }
}

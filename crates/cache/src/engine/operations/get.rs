//! Cache read operations

use crate::codec::{CodecError, EntryCodec};
use crate::errors::{CacheError, Result};
use crate::lock::{with_file, AccessMode};
use crate::ttl::{is_expired_at, now_timestamp};
use serde::de::DeserializeOwned;

use super::super::types::FileCache;

/// What a locked read found in an entry file
enum Lookup<R> {
    Missing,
    Corrupt(CodecError),
    Expired,
    Fresh(R),
}

impl<C: EntryCodec> FileCache<C> {
    /// Fetch `key`, or `default` on a miss
    ///
    /// Lock contention and I/O failures are logged and reported as a miss.
    pub fn get<T>(&self, key: &str, default: T) -> T
    where
        T: DeserializeOwned,
    {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                default
            }
        }
    }

    /// Fetch `key`, distinguishing a miss from a read that could not happen
    ///
    /// Absent, corrupt and expired entries are `Ok(None)`. A contended lock is
    /// [`CacheError::LockUnavailable`].
    pub fn try_get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let value = self.read_entry(key, |codec, unit| {
            codec
                .decode::<T>(unit)
                .map(|entry| (entry.expiration, entry.value))
        })?;

        if value.is_some() {
            tracing::debug!(key, "cache hit");
        } else {
            tracing::debug!(key, "cache miss");
        }
        Ok(value)
    }

    /// Whether `key` holds a fresh entry
    ///
    /// Only the expiration is decoded, so the stored type does not need to be
    /// known.
    pub fn has(&self, key: &str) -> bool {
        let found = self.read_entry(key, |codec, unit| {
            codec.decode_expiration(unit).map(|expiration| (expiration, ()))
        });

        match found {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::warn!(key, error = %e, "cache presence check failed, treating as miss");
                false
            }
        }
    }

    /// Fetch several keys lazily
    ///
    /// Each key is read when the iterator reaches it. Every call returns a
    /// fresh iterator.
    pub fn get_multiple<'a, K, T>(
        &'a self,
        keys: K,
        default: T,
    ) -> GetMultiple<'a, C, K::IntoIter, T>
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        T: DeserializeOwned + Clone,
    {
        GetMultiple {
            cache: self,
            keys: keys.into_iter(),
            default,
        }
    }

    /// Read and decode the entry for `key` under a shared lock
    ///
    /// An expired entry is deleted afterwards, once it is confirmed still
    /// expired under an exclusive lock.
    fn read_entry<R, F>(&self, key: &str, decode: F) -> Result<Option<R>>
    where
        F: FnOnce(&C, &[u8]) -> std::result::Result<(Option<f64>, R), CodecError>,
    {
        let path = self.entry_path(key);

        let lookup = with_file(&path, AccessMode::Read, |file| {
            let Some(file) = file else {
                return Ok(Lookup::Missing);
            };

            let unit = file.read_all()?;
            match decode(&self.codec, &unit) {
                Ok((expiration, _)) if is_expired_at(expiration, now_timestamp()) => {
                    Ok(Lookup::Expired)
                }
                Ok((_, value)) => Ok(Lookup::Fresh(value)),
                Err(e) => Ok(Lookup::Corrupt(e)),
            }
        })?;

        match lookup {
            Lookup::Fresh(value) => Ok(Some(value)),
            Lookup::Missing => Ok(None),
            Lookup::Corrupt(e) => {
                let error = CacheError::from_decode(&path, e);
                tracing::warn!(key, error = %error, "ignoring unreadable cache entry");
                Ok(None)
            }
            Lookup::Expired => {
                tracing::debug!(key, "cache entry expired");
                if let Err(e) = self.remove_if_expired(&path) {
                    tracing::warn!(key, error = %e, "failed to delete expired cache entry");
                }
                Ok(None)
            }
        }
    }
}

/// Lazy iterator returned by [`FileCache::get_multiple`]
pub struct GetMultiple<'a, C, I, T> {
    cache: &'a FileCache<C>,
    keys: I,
    default: T,
}

impl<C, I, T> Iterator for GetMultiple<'_, C, I, T>
where
    C: EntryCodec,
    I: Iterator,
    I::Item: AsRef<str>,
    T: DeserializeOwned + Clone,
{
    type Item = (String, T);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        let key = key.as_ref().to_string();
        let value = self.cache.get(&key, self.default.clone());
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

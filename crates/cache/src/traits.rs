//! The simple cache contract

use crate::errors::Result;
use crate::ttl::Ttl;
use serde::{de::DeserializeOwned, Serialize};

/// Key/value cache with per-entry time-to-live
///
/// Reads never fail: anything that prevents a value from being returned is a
/// miss and yields the caller's default. Writes and deletes report failures.
pub trait SimpleCache {
    /// Fetch `key`, or `default` when it is absent, expired or unreadable
    fn get<T>(&self, key: &str, default: T) -> T
    where
        T: DeserializeOwned;

    /// Fetch several keys lazily, yielding pairs in input order
    fn get_multiple<'a, K, T>(
        &'a self,
        keys: K,
        default: T,
    ) -> impl Iterator<Item = (String, T)> + 'a
    where
        K: IntoIterator + 'a,
        K::Item: AsRef<str>,
        T: DeserializeOwned + Clone + 'a;

    /// Store `value` under `key`
    fn set<T>(&self, key: &str, value: &T, ttl: impl Into<Ttl>) -> Result<bool>
    where
        T: Serialize + ?Sized;

    /// Store every pair, returning whether all succeeded
    fn set_multiple<I, K, V>(&self, values: I, ttl: impl Into<Ttl>) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize;

    /// Whether `key` holds a fresh entry
    fn has(&self, key: &str) -> bool;

    /// Remove `key`; removing an absent key succeeds
    fn delete(&self, key: &str) -> Result<bool>;

    /// Remove every key, returning whether all removals succeeded
    fn delete_multiple<K>(&self, keys: K) -> bool
    where
        K: IntoIterator,
        K::Item: AsRef<str>;

    /// Remove every entry under the storage root
    fn clear(&self) -> bool;
}

//! SimpleCache implementation for FileCache

use crate::codec::EntryCodec;
use crate::errors::Result;
use crate::traits::SimpleCache;
use crate::ttl::Ttl;
use serde::{de::DeserializeOwned, Serialize};

use super::types::FileCache;

impl<C: EntryCodec> SimpleCache for FileCache<C> {
    fn get<T>(&self, key: &str, default: T) -> T
    where
        T: DeserializeOwned,
    {
        self.get(key, default)
    }

    fn get_multiple<'a, K, T>(
        &'a self,
        keys: K,
        default: T,
    ) -> impl Iterator<Item = (String, T)> + 'a
    where
        K: IntoIterator + 'a,
        K::Item: AsRef<str>,
        T: DeserializeOwned + Clone + 'a,
    {
        self.get_multiple(keys, default)
    }

    fn set<T>(&self, key: &str, value: &T, ttl: impl Into<Ttl>) -> Result<bool>
    where
        T: Serialize + ?Sized,
    {
        self.set(key, value, ttl)
    }

    fn set_multiple<I, K, V>(&self, values: I, ttl: impl Into<Ttl>) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        self.set_multiple(values, ttl)
    }

    fn has(&self, key: &str) -> bool {
        self.has(key)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.delete(key)
    }

    fn delete_multiple<K>(&self, keys: K) -> bool
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        self.delete_multiple(keys)
    }

    fn clear(&self) -> bool {
        self.clear()
    }
}

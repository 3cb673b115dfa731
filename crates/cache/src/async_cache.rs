//! Async adapter for the file cache
//!
//! Every operation touches the file system, so each call is moved onto the
//! tokio blocking pool with `spawn_blocking` instead of stalling a runtime
//! worker thread.

use crate::codec::{EntryCodec, MessagePackCodec};
use crate::engine::FileCache;
use crate::errors::{CacheError, Result};
use crate::ttl::Ttl;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Async wrapper around a shared [`FileCache`]
pub struct AsyncFileCache<C = MessagePackCodec> {
    cache: Arc<FileCache<C>>,
}

impl<C> Clone for AsyncFileCache<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<C> From<FileCache<C>> for AsyncFileCache<C> {
    fn from(cache: FileCache<C>) -> Self {
        Self::new(Arc::new(cache))
    }
}

impl<C> AsyncFileCache<C> {
    pub fn new(cache: Arc<FileCache<C>>) -> Self {
        Self { cache }
    }

    /// The synchronous cache this adapter drives
    pub fn inner(&self) -> &Arc<FileCache<C>> {
        &self.cache
    }
}

impl<C: EntryCodec + 'static> AsyncFileCache<C> {
    /// Run `operation` against the cache on the blocking pool
    async fn run<F, R>(&self, operation: F) -> Result<R>
    where
        F: FnOnce(&FileCache<C>) -> R + Send + 'static,
        R: Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || operation(&cache))
            .await
            .map_err(|e| CacheError::configuration(format!("cache task panicked: {e}")))
    }

    /// Fetch `key`, or `default` on a miss
    pub async fn get<T>(&self, key: impl Into<String>, default: T) -> T
    where
        T: DeserializeOwned + Send + 'static,
    {
        match self.try_get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(error = %e, "cache read failed, treating as miss");
                default
            }
        }
    }

    pub async fn try_get<T>(&self, key: impl Into<String>) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let key = key.into();
        self.run(move |cache| cache.try_get(&key)).await?
    }

    pub async fn has(&self, key: impl Into<String>) -> bool {
        let key = key.into();
        self.run(move |cache| cache.has(&key)).await.unwrap_or(false)
    }

    /// Fetch several keys, preserving input order
    pub async fn get_multiple<T>(&self, keys: Vec<String>, default: T) -> Vec<(String, T)>
    where
        T: DeserializeOwned + Clone + Send + 'static,
    {
        let fallback: Vec<(String, T)> = keys
            .iter()
            .map(|key| (key.clone(), default.clone()))
            .collect();

        match self
            .run(move |cache| cache.get_multiple(keys, default).collect::<Vec<_>>())
            .await
        {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(error = %e, "bulk cache read failed, treating as misses");
                fallback
            }
        }
    }

    pub async fn set<T>(
        &self,
        key: impl Into<String>,
        value: T,
        ttl: impl Into<Ttl>,
    ) -> Result<bool>
    where
        T: Serialize + Send + 'static,
    {
        let key = key.into();
        let ttl = ttl.into();
        self.run(move |cache| cache.set(&key, &value, ttl)).await?
    }

    pub async fn set_multiple<T>(&self, values: Vec<(String, T)>, ttl: impl Into<Ttl>) -> bool
    where
        T: Serialize + Send + 'static,
    {
        let ttl = ttl.into();
        self.run(move |cache| cache.set_multiple(values, ttl))
            .await
            .unwrap_or(false)
    }

    pub async fn delete(&self, key: impl Into<String>) -> Result<bool> {
        let key = key.into();
        self.run(move |cache| cache.delete(&key)).await?
    }

    pub async fn delete_multiple(&self, keys: Vec<String>) -> bool {
        self.run(move |cache| cache.delete_multiple(keys))
            .await
            .unwrap_or(false)
    }

    pub async fn clear(&self) -> bool {
        self.run(|cache| cache.clear()).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn async_cache(temp_dir: &TempDir) -> AsyncFileCache {
        AsyncFileCache::from(FileCache::open(temp_dir.path()).unwrap())
    }

    #[tokio::test]
    async fn test_async_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let cache = async_cache(&temp_dir);

        let mut value = BTreeMap::new();
        value.insert("answer".to_string(), 42u32);

        assert!(cache.set("map", value.clone(), Ttl::Never).await.unwrap());
        assert!(cache.has("map").await);
        assert_eq!(cache.get("map", BTreeMap::<String, u32>::new()).await, value);

        assert!(cache.delete("map").await.unwrap());
        assert!(!cache.has("map").await);
    }

    #[tokio::test]
    async fn test_async_bulk_operations() {
        let temp_dir = TempDir::new().unwrap();
        let cache = async_cache(&temp_dir);

        let values = vec![("a".to_string(), 1i64), ("b".to_string(), 2i64)];
        assert!(cache.set_multiple(values, Ttl::Never).await);

        let keys = vec!["b".to_string(), "missing".to_string(), "a".to_string()];
        let found = cache.get_multiple(keys, 0i64).await;
        assert_eq!(
            found,
            vec![
                ("b".to_string(), 2),
                ("missing".to_string(), 0),
                ("a".to_string(), 1)
            ]
        );

        assert!(cache.delete_multiple(vec!["a".into(), "b".into()]).await);
        assert!(cache.clear().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_clones_share_the_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = async_cache(&temp_dir);
        let writer = cache.clone();

        tokio::spawn(async move { writer.set("shared", "value", Ttl::Never).await })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(cache.get("shared", String::new()).await, "value");
    }
}

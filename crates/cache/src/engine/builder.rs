//! Cache construction

use crate::bridge::{CompiledCache, CompiledCacheBridge};
use crate::codec::{EntryCodec, MessagePackCodec};
use crate::config::CacheConfig;
use crate::errors::Result;
use crate::keys::KeyPathResolver;
use std::path::PathBuf;
use std::sync::Arc;

use super::types::FileCache;

impl FileCache<MessagePackCodec> {
    /// Start building a cache from default configuration
    pub fn builder() -> FileCacheBuilder<MessagePackCodec> {
        FileCacheBuilder::new()
    }

    /// Create a cache from `config` without a compiled cache backend
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a cache rooted at `storage_path` with the default namespace
    pub fn open(storage_path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().storage_path(storage_path).build()
    }
}

/// Builder for [`FileCache`]
///
/// Nothing touches the file system until the first write; the storage root is
/// created on demand.
pub struct FileCacheBuilder<C = MessagePackCodec> {
    config: CacheConfig,
    codec: C,
    compiled_cache: Option<Arc<dyn CompiledCache>>,
}

impl FileCacheBuilder<MessagePackCodec> {
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            codec: MessagePackCodec,
            compiled_cache: None,
        }
    }
}

impl Default for FileCacheBuilder<MessagePackCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: EntryCodec> FileCacheBuilder<C> {
    /// Replace the whole configuration
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_path = path.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    pub fn sync_writes(mut self, enabled: bool) -> Self {
        self.config.sync_writes = enabled;
        self
    }

    /// Report writes and deletes to `backend`
    ///
    /// Ignored when `compiled_cache_enabled` is off in the configuration or
    /// the backend reports itself inactive.
    pub fn compiled_cache(mut self, backend: Arc<dyn CompiledCache>) -> Self {
        self.compiled_cache = Some(backend);
        self
    }

    /// Switch the payload codec
    pub fn codec<D: EntryCodec>(self, codec: D) -> FileCacheBuilder<D> {
        FileCacheBuilder {
            config: self.config,
            codec,
            compiled_cache: self.compiled_cache,
        }
    }

    pub fn build(self) -> Result<FileCache<C>> {
        self.config.validate()?;

        let root = self.config.storage_root();
        let bridge =
            CompiledCacheBridge::new(self.compiled_cache, self.config.compiled_cache_enabled);

        tracing::debug!(
            root = %root.display(),
            namespace = %self.config.namespace,
            codec = ?self.codec.kind(),
            compiled_cache = bridge.available(),
            "file cache created"
        );

        Ok(FileCache {
            resolver: KeyPathResolver::new(root, self.config.namespace),
            codec: self.codec,
            bridge,
            sync_writes: self.config.sync_writes,
        })
    }
}

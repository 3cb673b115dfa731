//! Engine types

use crate::bridge::CompiledCacheBridge;
use crate::codec::MessagePackCodec;
use crate::keys::KeyPathResolver;
use std::fmt;
use std::path::{Path, PathBuf};

/// File-system backed cache
///
/// `FileCache` is `Send + Sync`; share it across threads with an `Arc`.
/// Concurrent access from other processes using the same storage root and
/// namespace is coordinated through per-entry file locks.
pub struct FileCache<C = MessagePackCodec> {
    pub(super) resolver: KeyPathResolver,
    pub(super) codec: C,
    pub(super) bridge: CompiledCacheBridge,
    pub(super) sync_writes: bool,
}

impl<C> FileCache<C> {
    /// Location of the file that stores `key`
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.resolver.resolve(key).path
    }

    /// Directory holding the shard tree
    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn namespace(&self) -> &str {
        self.resolver.namespace()
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Whether writes and deletes are reported to a compiled cache
    pub fn compiled_cache_available(&self) -> bool {
        self.bridge.available()
    }
}

impl<C> fmt::Debug for FileCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCache")
            .field("root", &self.resolver.root())
            .field("namespace", &self.resolver.namespace())
            .field("compiled_cache", &self.bridge.available())
            .field("sync_writes", &self.sync_writes)
            .finish()
    }
}

//! Cooperation with a compiled-source cache
//!
//! Some hosts keep a compiled representation of files they load, keyed by
//! path and invalidated by modification time. Entry files rewritten in place
//! would then be served stale. When such a backend is active the engine:
//!
//! - after every write, pins the file mtime to a fixed instant in the past,
//!   then asks the backend to invalidate and recompile the path
//! - before every delete, asks the backend to invalidate the path
//!
//! Availability is decided once, when the bridge is built, and never changes
//! for the lifetime of the engine.

use crate::errors::{CacheError, Result};
use crate::lock::LockedFile;
use fscache_utils::file_times::SafeMtime;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// A host compiled-source cache
pub trait CompiledCache: Send + Sync + fmt::Debug {
    /// Whether the backend is active in this process
    fn is_enabled(&self) -> bool;

    /// Drop the compiled form of `path`
    ///
    /// With `force` the entry is dropped regardless of its recorded mtime.
    fn invalidate(&self, path: &Path, force: bool) -> io::Result<()>;

    /// Compile `path` and keep the result
    fn compile(&self, path: &Path) -> io::Result<()>;
}

/// Engine-side handle on an optional [`CompiledCache`]
#[derive(Clone)]
pub struct CompiledCacheBridge {
    backend: Option<Arc<dyn CompiledCache>>,
    available: bool,
    safe_mtime: SafeMtime,
}

impl CompiledCacheBridge {
    /// Build the bridge, resolving availability once
    pub fn new(backend: Option<Arc<dyn CompiledCache>>, enabled_by_config: bool) -> Self {
        let available =
            enabled_by_config && backend.as_ref().is_some_and(|backend| backend.is_enabled());

        tracing::debug!(available, "compiled cache bridge initialized");

        Self {
            backend,
            available,
            safe_mtime: SafeMtime::capture(),
        }
    }

    /// A bridge that never talks to a backend
    pub fn disabled() -> Self {
        Self::new(None, false)
    }

    pub fn available(&self) -> bool {
        self.available
    }

    /// The instant written entries are pinned to
    pub fn safe_mtime(&self) -> SafeMtime {
        self.safe_mtime
    }

    fn active_backend(&self) -> Option<&dyn CompiledCache> {
        if !self.available {
            return None;
        }
        self.backend.as_deref()
    }

    /// Force-invalidate the compiled form of `path`
    pub fn invalidate(&self, path: &Path) -> Result<()> {
        let Some(backend) = self.active_backend() else {
            return Ok(());
        };
        match backend.invalidate(path, true) {
            Ok(()) => Ok(()),
            Err(e) => Err(CacheError::io(path, "invalidate compiled cache", e)),
        }
    }

    /// Compile `path` into the backend
    pub fn recompile(&self, path: &Path) -> Result<()> {
        let Some(backend) = self.active_backend() else {
            return Ok(());
        };
        match backend.compile(path) {
            Ok(()) => Ok(()),
            Err(e) => Err(CacheError::io(path, "compile cache file", e)),
        }
    }

    /// Run the post-write sequence on a freshly written, still locked file
    pub fn after_write(&self, file: &LockedFile) -> Result<()> {
        if !self.available {
            return Ok(());
        }

        let path = file.path();
        if let Err(e) = self.safe_mtime.apply(file.file()) {
            return Err(CacheError::io(path, "normalize modification time", e));
        }

        self.invalidate(path)?;
        self.recompile(path)
    }

    /// Run the pre-delete sequence
    pub fn before_delete(&self, path: &Path) -> Result<()> {
        self.invalidate(path)
    }
}

impl fmt::Debug for CompiledCacheBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCacheBridge")
            .field("backend", &self.backend)
            .field("available", &self.available)
            .field("safe_mtime", &self.safe_mtime)
            .finish()
    }
}

impl Default for CompiledCacheBridge {
    fn default() -> Self {
        Self::disabled()
    }
}

/// A compiled unit held by [`MemoryCompiledCache`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
    pub contents: Vec<u8>,
    pub mtime: Option<SystemTime>,
}

/// In-process compiled cache
///
/// Keeps a snapshot of each compiled file together with the mtime it had at
/// compile time. Lookups serve the snapshot without touching the file, the
/// way a host cache with timestamp validation disabled would.
#[derive(Debug, Default)]
pub struct MemoryCompiledCache {
    units: RwLock<HashMap<PathBuf, CompiledUnit>>,
    disabled: bool,
}

impl MemoryCompiledCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that reports itself as inactive
    pub fn inactive() -> Self {
        Self {
            units: RwLock::new(HashMap::new()),
            disabled: true,
        }
    }

    /// Serve the compiled snapshot of `path`
    pub fn lookup(&self, path: &Path) -> Option<CompiledUnit> {
        self.units.read().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.units.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.read().is_empty()
    }
}

impl CompiledCache for MemoryCompiledCache {
    fn is_enabled(&self) -> bool {
        !self.disabled
    }

    fn invalidate(&self, path: &Path, force: bool) -> io::Result<()> {
        let mut units = self.units.write();
        if force {
            units.remove(path);
            return Ok(());
        }

        let current = fscache_utils::file_times::modified_time(path)?;
        if units.get(path).is_some_and(|unit| unit.mtime != current) {
            units.remove(path);
        }
        Ok(())
    }

    fn compile(&self, path: &Path) -> io::Result<()> {
        let contents = fs::read(path)?;
        let mtime = fscache_utils::file_times::modified_time(path)?;
        self.units
            .write()
            .insert(path.to_path_buf(), CompiledUnit { contents, mtime });
        Ok(())
    }
}

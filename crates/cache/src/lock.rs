//! Per-entry advisory locking
//!
//! Every engine operation touches exactly one entry file through a
//! [`LockedFile`]: shared for reads, exclusive for writes. Locks are never
//! waited on. A contended lock fails immediately with
//! [`CacheError::LockUnavailable`] and the caller decides whether to retry.
//!
//! The lock and the handle are released when the [`LockedFile`] is dropped,
//! which covers early returns, errors and unwinding out of the body closure.

use crate::errors::{CacheError, Result};
use fs2::FileExt;
use std::fmt;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Reopen attempts when the entry file is replaced while being locked
const RELINK_ATTEMPTS: usize = 3;

/// How an entry file is accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Shared lock, file is never created
    Read,
    /// Exclusive lock, [`LockedFile::open`] creates the file and shard directories
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "shared"),
            Self::Write => write!(f, "exclusive"),
        }
    }
}

/// An open entry file holding an advisory lock
#[derive(Debug)]
pub struct LockedFile {
    file: File,
    path: PathBuf,
    mode: AccessMode,
}

impl LockedFile {
    /// Open `path` and take a non-blocking lock for `mode`
    ///
    /// Returns `Ok(None)` in read mode when the file does not exist.
    pub fn open(path: &Path, mode: AccessMode) -> Result<Option<Self>> {
        match mode {
            AccessMode::Read => Self::open_existing(path, mode),
            AccessMode::Write => Self::create(path).map(Some),
        }
    }

    /// Open or create `path` with its shard directories and lock it exclusively
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            ensure_directory(parent)?;
        }

        for _ in 0..RELINK_ATTEMPTS {
            let file = match OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)
            {
                Ok(file) => file,
                Err(e) => return Err(CacheError::io(path, "open cache file for writing", e)),
            };

            if let Some(locked) = Self::lock_linked(file, path)? {
                return Ok(locked);
            }
        }

        Err(CacheError::lock_unavailable(path, AccessMode::Write))
    }

    /// Open `path` only if it exists, creating nothing
    pub fn open_existing(path: &Path, mode: AccessMode) -> Result<Option<Self>> {
        if mode == AccessMode::Read {
            let file = match File::open(path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(CacheError::io(path, "open cache file for reading", e)),
            };
            return Self::lock(file, path, mode).map(Some);
        }

        for _ in 0..RELINK_ATTEMPTS {
            let file = match OpenOptions::new().read(true).write(true).open(path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(CacheError::io(path, "open cache file for writing", e)),
            };

            if let Some(locked) = Self::lock_linked(file, path)? {
                return Ok(Some(locked));
            }
        }

        Err(CacheError::lock_unavailable(path, AccessMode::Write))
    }

    /// Lock `file` exclusively, or `None` if `path` no longer names it
    ///
    /// A file unlinked between open and lock would swallow the write.
    fn lock_linked(file: File, path: &Path) -> Result<Option<Self>> {
        let locked = Self::lock(file, path, AccessMode::Write)?;
        match locked.is_linked() {
            Ok(true) => Ok(Some(locked)),
            Ok(false) => {
                tracing::debug!(
                    path = %path.display(),
                    "entry file replaced before it was locked, reopening"
                );
                Ok(None)
            }
            Err(e) => Err(CacheError::io(path, "inspect cache file", e)),
        }
    }

    /// Whether `path` still refers to the open file
    fn is_linked(&self) -> io::Result<bool> {
        let on_disk = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        let held = self.file.metadata()?;
        Ok(same_file(&on_disk, &held))
    }

    fn lock(file: File, path: &Path, mode: AccessMode) -> Result<Self> {
        let attempt = match mode {
            AccessMode::Read => FileExt::try_lock_shared(&file),
            AccessMode::Write => FileExt::try_lock_exclusive(&file),
        };

        match attempt {
            Ok(()) => {
                tracing::trace!(path = %path.display(), %mode, "acquired entry lock");
                Ok(Self {
                    file,
                    path: path.to_path_buf(),
                    mode,
                })
            }
            Err(e) if is_contended(&e) => {
                tracing::debug!(path = %path.display(), %mode, "entry lock is contended");
                Err(CacheError::lock_unavailable(path, mode))
            }
            Err(e) => Err(CacheError::io(path, "acquire entry lock", e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    /// Read the whole file from the start
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut contents = Vec::new();
        if let Err(e) = self.file.seek(SeekFrom::Start(0)) {
            return Err(CacheError::io(&self.path, "seek cache file", e));
        }
        match self.file.read_to_end(&mut contents) {
            Ok(_) => Ok(contents),
            Err(e) => Err(CacheError::io(&self.path, "read cache file", e)),
        }
    }

    /// Replace the file contents with `unit` in a single write
    ///
    /// Readers hold a shared lock, so under this exclusive lock they observe
    /// either the previous unit or the new one.
    pub fn replace_contents(&mut self, unit: &[u8], sync: bool) -> Result<()> {
        if let Err(e) = self.file.set_len(0) {
            return Err(CacheError::io(&self.path, "truncate cache file", e));
        }
        if let Err(e) = self.file.seek(SeekFrom::Start(0)) {
            return Err(CacheError::io(&self.path, "seek cache file", e));
        }
        if let Err(e) = self.file.write_all(unit) {
            return Err(CacheError::io(&self.path, "write cache entry", e));
        }
        if let Err(e) = self.file.flush() {
            return Err(CacheError::io(&self.path, "flush cache entry", e));
        }
        if sync {
            if let Err(e) = self.file.sync_data() {
                return Err(CacheError::io(&self.path, "sync cache entry", e));
            }
        }
        Ok(())
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release entry lock");
        }
    }
}

/// Run `body` with the entry file at `path` locked for `mode`
///
/// In read mode a missing file calls `body(None)` and creates nothing. The
/// lock is released when this function returns, whatever `body` did.
pub fn with_file<R, F>(path: &Path, mode: AccessMode, body: F) -> Result<R>
where
    F: FnOnce(Option<&mut LockedFile>) -> Result<R>,
{
    let mut locked = LockedFile::open(path, mode)?;
    body(locked.as_mut())
}

/// Create shard directories, tolerating concurrent creators
pub(crate) fn ensure_directory(directory: &Path) -> Result<()> {
    match fs::create_dir_all(directory) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && directory.is_dir() => Ok(()),
        Err(e) => Err(CacheError::io(directory, "create shard directories", e)),
    }
}

#[cfg(unix)]
fn same_file(a: &Metadata, b: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

// Open files cannot be unlinked on other platforms
#[cfg(not(unix))]
fn same_file(_: &Metadata, _: &Metadata) -> bool {
    true
}

fn is_contended(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

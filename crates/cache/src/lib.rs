//! File-system backed key/value cache
//!
//! Every key maps to its own file under a two-level shard tree inside a
//! storage root. Entries carry an absolute expiration and are checked on
//! read; expired entries are deleted by the read that finds them.
//!
//! Concurrent readers and writers, including other processes sharing the
//! storage root, are coordinated with non-blocking per-file advisory locks.
//! When a compiled cache backend is attached, every write and delete is
//! reported to it so that it never serves a stale compiled entry.
//!
//! ```no_run
//! use fscache::{FileCache, Ttl};
//!
//! let cache = FileCache::open("/tmp/fscache-demo")?;
//! cache.set("greeting", "hello", Ttl::Seconds(60))?;
//! assert_eq!(cache.get("greeting", String::new()), "hello");
//! # Ok::<(), fscache::CacheError>(())
//! ```

pub mod async_cache;
pub mod bridge;
pub mod codec;
pub mod config;
pub mod engine;
pub mod errors;
pub mod keys;
pub mod lock;
pub mod traits;
pub mod ttl;

pub use async_cache::AsyncFileCache;
pub use bridge::{CompiledCache, CompiledCacheBridge, CompiledUnit, MemoryCompiledCache};
pub use codec::{
    BincodeCodec, CacheEntry, CodecError, CodecKind, EntryCodec, JsonCodec, MessagePackCodec,
};
pub use config::{CacheConfig, CacheConfigBuilder};
pub use engine::{FileCache, FileCacheBuilder, GetMultiple};
pub use errors::{CacheError, Error, RecoveryHint, Result};
pub use keys::{KeyPathResolver, ShardPath};
pub use lock::{with_file, AccessMode, LockedFile};
pub use traits::SimpleCache;
pub use ttl::{Ttl, TtlError};

//! Key to path resolution
//!
//! Cache keys are never interpreted. The namespace and key are hashed with
//! XXH3-128 and the digest is rendered in base64 with `/` replaced by `-`, so
//! every character is safe inside a single path component:
//!
//! ```text
//! <root>/<c0>/<c1>/<c2..c22>
//! ```
//!
//! Two levels of single-character shard directories keep directory sizes
//! bounded and let `clear()` walk the tree without an index.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_128;

/// Length of the entry filename taken from the encoded hash
pub const FILENAME_LEN: usize = 20;

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "fscache::FileCache";

/// A resolved location for one cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardPath {
    /// `<root>/<c0>/<c1>`
    pub directory: PathBuf,
    /// Fixed-length slice of the encoded hash
    pub filename: String,
    /// `directory/filename`
    pub path: PathBuf,
}

/// Maps cache keys to sharded file paths under a storage root
#[derive(Debug, Clone)]
pub struct KeyPathResolver {
    root: PathBuf,
    namespace: String,
}

impl KeyPathResolver {
    pub fn new(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            namespace: namespace.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resolve a string key
    #[inline]
    pub fn resolve(&self, key: &str) -> ShardPath {
        self.resolve_bytes(key.as_bytes())
    }

    /// Resolve an arbitrary byte key
    pub fn resolve_bytes(&self, key: &[u8]) -> ShardPath {
        let encoded = encode_hash(&self.namespace, key);
        let bytes = encoded.as_bytes();

        // Base64 output is ASCII, so byte slicing never splits a character
        let first = char::from(bytes[0]);
        let second = char::from(bytes[1]);
        let filename = encoded[2..2 + FILENAME_LEN].to_string();

        let directory = self
            .root
            .join(first.to_string())
            .join(second.to_string());
        let path = directory.join(&filename);

        ShardPath {
            directory,
            filename,
            path,
        }
    }
}

/// Hash `namespace || key` and render it as path-safe base64
pub fn encode_hash(namespace: &str, key: &[u8]) -> String {
    let mut input = Vec::with_capacity(namespace.len() + key.len());
    input.extend_from_slice(namespace.as_bytes());
    input.extend_from_slice(key);
    let digest = xxh3_128(&input).to_be_bytes();

    STANDARD.encode(digest).replace('/', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> KeyPathResolver {
        KeyPathResolver::new("/var/cache/fscache", "ns")
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let r = resolver();
        assert_eq!(r.resolve("foo"), r.resolve("foo"));
        assert_eq!(
            r.resolve("foo"),
            KeyPathResolver::new("/var/cache/fscache", "ns").resolve("foo")
        );
    }

    #[test]
    fn test_different_keys_produce_different_filenames() {
        let r = resolver();
        assert_ne!(r.resolve("foo").filename, r.resolve("bar").filename);
    }

    #[test]
    fn test_namespace_changes_path() {
        let a = KeyPathResolver::new("/root", "one").resolve("key");
        let b = KeyPathResolver::new("/root", "two").resolve("key");
        assert_ne!(a.path, b.path);
    }

    #[test]
    fn test_layout_has_two_shard_levels() {
        let r = resolver();
        let shard = r.resolve("some key");

        assert_eq!(shard.filename.len(), FILENAME_LEN);
        assert_eq!(shard.path, shard.directory.join(&shard.filename));

        let relative = shard.path.strip_prefix(r.root()).unwrap();
        let components: Vec<_> = relative.components().collect();
        assert_eq!(components.len(), 3);
        for level in &components[..2] {
            assert_eq!(level.as_os_str().len(), 1);
        }
    }

    #[test]
    fn test_encoded_hash_has_no_path_separator() {
        for i in 0..500 {
            let encoded = encode_hash("ns", format!("key{i}").as_bytes());
            assert!(!encoded.contains('/'));
            assert_eq!(encoded.len(), 24);
        }
    }

    #[test]
    fn test_resolve_accepts_unusual_keys() {
        let r = resolver();
        for key in ["", " ", "日本語", "{}()/\\@:", "\0\u{1}"] {
            let shard = r.resolve(key);
            assert_eq!(shard.filename.len(), FILENAME_LEN);
        }
        let binary = r.resolve_bytes(&[0xff, 0xfe, 0x00, 0x80]);
        assert_eq!(binary.filename.len(), FILENAME_LEN);
    }

    #[test]
    fn test_namespace_and_key_are_concatenated() {
        // The hash input is the plain concatenation of namespace and key
        let a = KeyPathResolver::new("/root", "ab").resolve("c");
        let b = KeyPathResolver::new("/root", "a").resolve("bc");
        assert_eq!(a, b);
    }
}

//! Property-based tests for key resolution and stored entries

use fscache::keys::FILENAME_LEN;
use fscache::{FileCache, KeyPathResolver, Ttl};
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_-]{1,64}",
        "[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}",
        any::<String>(),
    ]
}

proptest! {
    #[test]
    fn resolution_is_deterministic(namespace in ".{1,32}", key in arb_key()) {
        let first = KeyPathResolver::new("/cache", namespace.clone());
        let second = KeyPathResolver::new("/cache", namespace);

        prop_assert_eq!(first.resolve(&key), second.resolve(&key));
    }

    #[test]
    fn resolved_paths_have_the_shard_shape(key in arb_key()) {
        let resolver = KeyPathResolver::new("/cache", "props");
        let shard = resolver.resolve(&key);

        prop_assert_eq!(shard.filename.len(), FILENAME_LEN);
        prop_assert!(!shard.filename.contains('/'));
        prop_assert_eq!(shard.path.parent(), Some(shard.directory.as_path()));

        let relative = shard.path.strip_prefix("/cache").unwrap();
        prop_assert_eq!(relative.components().count(), 3);
    }

    #[test]
    fn stored_values_read_back(
        key in arb_key(),
        value in prop::collection::vec(any::<String>(), 0..16),
    ) {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::open(temp_dir.path()).unwrap();

        prop_assert!(cache.set(&key, &value, Ttl::Never).unwrap());
        prop_assert_eq!(cache.get(&key, Vec::<String>::new()), value);
        prop_assert!(cache.delete(&key).unwrap());
        prop_assert!(!cache.has(&key));
    }

    #[test]
    fn arbitrary_file_contents_are_a_miss(
        key in arb_key(),
        garbage in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::open(temp_dir.path()).unwrap();
        let path = cache.entry_path(&key);

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, &garbage).unwrap();

        prop_assert_eq!(cache.get(&key, "default".to_string()), "default");
        prop_assert!(!cache.has(&key));
        prop_assert!(cache.try_get::<u64>(&key).unwrap().is_none());
    }
}

//! Cache configuration with environment overrides and validation
use crate::errors::{CacheError, Result};
use crate::keys::DEFAULT_NAMESPACE;
use fscache_utils::paths::{default_storage_root, normalize_root};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the storage root
pub const ENV_STORAGE_PATH: &str = "FSCACHE_STORAGE_PATH";
/// Environment variable overriding the key namespace
pub const ENV_NAMESPACE: &str = "FSCACHE_NAMESPACE";
/// Environment variable toggling `sync_data` after each write
pub const ENV_SYNC_WRITES: &str = "FSCACHE_SYNC_WRITES";
/// Environment variable toggling compiled cache cooperation
pub const ENV_COMPILED_CACHE: &str = "FSCACHE_COMPILED_CACHE";

/// Configuration for a [`FileCache`](crate::FileCache)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the shard tree
    pub storage_path: PathBuf,
    /// Mixed into every key hash so that caches sharing a root stay apart
    pub namespace: String,
    /// Call `sync_data` after each write
    pub sync_writes: bool,
    /// Cooperate with a compiled cache backend when one is supplied
    pub compiled_cache_enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_root(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            sync_writes: false,
            compiled_cache_enabled: true,
        }
    }
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }

    /// Defaults overridden by `FSCACHE_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var(ENV_STORAGE_PATH) {
            config.storage_path = PathBuf::from(path);
        }

        if let Ok(namespace) = std::env::var(ENV_NAMESPACE) {
            config.namespace = namespace;
        }

        if let Ok(value) = std::env::var(ENV_SYNC_WRITES) {
            config.sync_writes = parse_flag(ENV_SYNC_WRITES, &value)?;
        }

        if let Ok(value) = std::env::var(ENV_COMPILED_CACHE) {
            config.compiled_cache_enabled = parse_flag(ENV_COMPILED_CACHE, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.storage_path.as_os_str().is_empty() {
            return Err(CacheError::configuration("storage path must not be empty"));
        }

        if self.namespace.is_empty() {
            return Err(CacheError::configuration("namespace must not be empty"));
        }

        Ok(())
    }

    /// Storage path with trailing separators removed
    pub fn storage_root(&self) -> PathBuf {
        normalize_root(&self.storage_path)
    }
}

fn parse_flag(variable: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => Err(CacheError::configuration(format!(
            "{variable} must be a boolean flag, got '{other}'"
        ))),
    }
}

/// Builder for [`CacheConfig`]
#[derive(Debug, Clone, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage root
    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_path = path.into();
        self
    }

    /// Set the key namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    pub fn sync_writes(mut self, enabled: bool) -> Self {
        self.config.sync_writes = enabled;
        self
    }

    pub fn compiled_cache_enabled(mut self, enabled: bool) -> Self {
        self.config.compiled_cache_enabled = enabled;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<CacheConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        for variable in [
            ENV_STORAGE_PATH,
            ENV_NAMESPACE,
            ENV_SYNC_WRITES,
            ENV_COMPILED_CACHE,
        ] {
            env::remove_var(variable);
        }
    }

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.storage_path, default_storage_root());
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert!(!config.sync_writes);
        assert!(config.compiled_cache_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::builder()
            .storage_path("/var/cache/app/")
            .namespace("app")
            .sync_writes(true)
            .compiled_cache_enabled(false)
            .build()
            .unwrap();

        assert_eq!(config.storage_root(), PathBuf::from("/var/cache/app"));
        assert_eq!(config.namespace, "app");
        assert!(config.sync_writes);
        assert!(!config.compiled_cache_enabled);
    }

    #[test]
    fn test_validation_rejects_empty_values() {
        let err = CacheConfig::builder().namespace("").build().unwrap_err();
        assert!(matches!(err, CacheError::Configuration { .. }));

        let err = CacheConfig::builder().storage_path("").build().unwrap_err();
        assert!(matches!(err, CacheError::Configuration { .. }));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{"namespace": "json"}"#).unwrap();
        assert_eq!(config.namespace, "json");
        assert_eq!(config.storage_path, default_storage_root());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var(ENV_STORAGE_PATH, "/srv/cache");
        env::set_var(ENV_NAMESPACE, "env-space");
        env::set_var(ENV_SYNC_WRITES, "on");
        env::set_var(ENV_COMPILED_CACHE, "0");

        let config = CacheConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.storage_path, PathBuf::from("/srv/cache"));
        assert_eq!(config.namespace, "env-space");
        assert!(config.sync_writes);
        assert!(!config.compiled_cache_enabled);
    }

    #[test]
    #[serial]
    fn test_from_env_without_variables_is_default() {
        clear_env();
        assert_eq!(CacheConfig::from_env().unwrap(), CacheConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_flag() {
        clear_env();
        env::set_var(ENV_SYNC_WRITES, "sometimes");
        let result = CacheConfig::from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(err.to_string().contains(ENV_SYNC_WRITES));
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_empty_namespace() {
        clear_env();
        env::set_var(ENV_NAMESPACE, "");
        let result = CacheConfig::from_env();
        clear_env();

        assert!(matches!(result, Err(CacheError::Configuration { .. })));
    }
}

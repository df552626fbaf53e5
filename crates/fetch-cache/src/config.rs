//! Storage configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the cache root directory.
pub const CACHE_DIR_ENV: &str = "FETCH_CACHE_DIR";

/// Where the cache storage keeps its named caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory; one subdirectory per named cache.
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_root() -> PathBuf {
    std::env::temp_dir().join("fetch-cache")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

impl StorageConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use `FETCH_CACHE_DIR` when set, the default root otherwise.
    pub fn from_env() -> Self {
        match std::env::var_os(CACHE_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::default(),
        }
    }

    /// An explicit directory wins over the environment.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        match explicit {
            Some(root) => Self::new(root),
            None => Self::from_env(),
        }
    }
}

//! Shared helpers for fetch-cache integration tests.

use fetch_cache::{CacheStorage, StorageConfig};
use tempfile::TempDir;

/// Initialize test logging (safe to call from every test).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,fetch_cache=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A storage rooted in a fresh temporary directory.
pub fn temp_storage() -> (TempDir, CacheStorage) {
    init_test_logging();
    let tmp = TempDir::new().expect("create temp dir");
    let storage = CacheStorage::new(StorageConfig::new(tmp.path().join("fetch-cache")));
    (tmp, storage)
}

//! Registry of named caches rooted at one directory.

use crate::cache::NamedCache;
use crate::config::StorageConfig;
use crate::fetch::HttpFetcher;
use crate::keys;
use fetch_cache_core::{CacheQueryOptions, Error, Fetcher, RequestLike, Response, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

/// The collection of named caches under one root directory.
///
/// The file system is the only source of truth: every listing re-reads the
/// root, and no handle to a [`NamedCache`] is retained.
#[derive(Clone)]
pub struct CacheStorage {
    root: PathBuf,
    fetcher: Arc<dyn Fetcher>,
}

impl fmt::Debug for CacheStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStorage")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl CacheStorage {
    /// Storage using the default HTTP transport for `add`/`add_all`.
    pub fn new(config: StorageConfig) -> Self {
        Self::with_fetcher(config, Arc::new(HttpFetcher::new()))
    }

    pub fn with_fetcher(config: StorageConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            root: config.root,
            fetcher,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for `name`. The empty name has none, since it would
    /// encode to the root itself.
    fn cache_dir(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        Some(self.root.join(keys::encode_name(name)))
    }

    /// Open the named cache, creating its directory if needed.
    ///
    /// Opening an existing cache leaves its entries untouched.
    pub async fn open(&self, name: &str) -> Result<NamedCache> {
        let dir = self
            .cache_dir(name)
            .ok_or_else(|| Error::InvalidCacheName(name.to_string()))?;
        fs::create_dir_all(&dir).await.map_err(|e| {
            Error::Storage(format!("Failed to create cache {}: {}", name, e))
        })?;

        debug!(cache = %name, dir = %dir.display(), "Opened cache");
        Ok(NamedCache::new(name, dir, Arc::clone(&self.fetcher)))
    }

    /// Whether a cache with this name exists.
    pub async fn has(&self, name: &str) -> Result<bool> {
        if self.cache_dir(name).is_none() {
            return Ok(false);
        }
        Ok(self.keys().await?.iter().any(|key| key == name))
    }

    /// Remove the named cache and all its entries.
    ///
    /// Resolves `false` when no such cache directory exists.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let Some(dir) = self.cache_dir(name) else {
            return Ok(false);
        };

        match fs::metadata(&dir).await {
            Ok(metadata) if metadata.is_dir() => {}
            _ => return Ok(false),
        }

        fs::remove_dir_all(&dir).await.map_err(|e| {
            Error::Storage(format!("Failed to delete cache {}: {}", name, e))
        })?;

        info!(cache = %name, "Deleted cache");
        Ok(true)
    }

    /// Names of all caches, in directory listing order.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let mut read_dir = match fs::read_dir(&self.root).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to read cache root {}: {}",
                    self.root.display(),
                    e
                )));
            }
        };

        let mut names = vec![];
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Error::Storage(format!("Failed to read entry: {}", e)))?
        {
            // Follow symlinks, like stat
            let is_dir = fs::metadata(entry.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }

            let file_name = entry.file_name();
            match file_name.to_str().and_then(keys::decode_name) {
                Some(name) => names.push(name),
                None => warn!(dir = ?file_name, "Skipping unrecognized cache directory"),
            }
        }

        Ok(names)
    }

    /// Look the request up in every cache, returning the first match.
    pub async fn match_request(
        &self,
        request: impl Into<RequestLike>,
        options: CacheQueryOptions,
    ) -> Result<Option<Response>> {
        let request: RequestLike = request.into();
        let request = request.into_request();

        for name in self.keys().await? {
            let cache = self.open(&name).await?;
            if let Some(response) = cache.match_request(&request, options).await? {
                debug!(cache = %name, url = %request.url(), "Cache hit");
                return Ok(Some(response));
            }
        }

        debug!(url = %request.url(), "Cache miss");
        Ok(None)
    }
}

impl Default for CacheStorage {
    fn default() -> Self {
        Self::new(StorageConfig::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_in(tmp: &TempDir) -> CacheStorage {
        CacheStorage::new(StorageConfig::new(tmp.path().join("caches")))
    }

    #[tokio::test]
    async fn test_keys_on_missing_root() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);
        assert!(storage.keys().await.unwrap().is_empty());
        assert!(!storage.has("v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        let cache = storage.open("v1").await.unwrap();
        cache
            .put("http://example.com/", Response::new("kept"))
            .await
            .unwrap();

        let reopened = storage.open("v1").await.unwrap();
        assert_eq!(reopened.dir(), cache.dir());
        let keys = reopened.keys(None, CacheQueryOptions::default()).await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(storage.keys().await.unwrap(), vec!["v1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_missing_and_existing() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        assert!(!storage.delete("v1").await.unwrap());

        storage.open("v1").await.unwrap();
        assert!(storage.has("v1").await.unwrap());
        assert!(storage.delete("v1").await.unwrap());
        assert!(!storage.has("v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        let err = storage.open("").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCacheName(_)));
        assert!(err.is_validation());
        assert!(!storage.has("").await.unwrap());
        assert!(!storage.root().exists());
    }

    #[tokio::test]
    async fn test_delete_empty_name_keeps_other_caches() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);
        let v1 = storage.open("v1").await.unwrap();
        v1.put("http://example.com/", Response::new("kept"))
            .await
            .unwrap();

        assert!(!storage.delete("").await.unwrap());

        assert_eq!(storage.keys().await.unwrap(), vec!["v1".to_string()]);
        let mut hit = v1
            .match_request("http://example.com/", CacheQueryOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.text().await.unwrap(), "kept");
    }

    #[tokio::test]
    async fn test_plain_files_in_root_are_not_caches() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);
        storage.open("v1").await.unwrap();

        let stray = storage.root().join(keys::encode_name("v2"));
        std::fs::write(&stray, b"not a directory").unwrap();

        assert_eq!(storage.keys().await.unwrap(), vec!["v1".to_string()]);
        assert!(!storage.delete("v2").await.unwrap());
        assert!(stray.exists());
    }
}

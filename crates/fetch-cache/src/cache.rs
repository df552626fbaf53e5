//! A single named cache backed by one directory.

use crate::codec::{self, EntryHead};
use crate::keys;
use fetch_cache_core::http::{strip_search, strip_fragment};
use fetch_cache_core::{
    Body, CacheQueryOptions, Error, Fetcher, Request, RequestLike, Response, Result,
};
use futures::future::join_all;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

/// Handle to one named cache.
///
/// Handles are cheap; two handles for the same directory are equivalent.
/// Nothing is held in memory, every call re-reads the directory.
#[derive(Clone)]
pub struct NamedCache {
    name: String,
    dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
}

impl fmt::Debug for NamedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedCache")
            .field("name", &self.name)
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl NamedCache {
    pub(crate) fn new(name: impl Into<String>, dir: PathBuf, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            name: name.into(),
            dir,
            fetcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(keys::encode_name(key))
    }

    /// Store `response` under the request's fragment-free URL, replacing
    /// any previous entry for that URL.
    ///
    /// The entry is written to a temporary file and renamed into place
    /// once header and body are flushed.
    pub async fn put(&self, request: impl Into<RequestLike>, mut response: Response) -> Result<()> {
        let request = to_request(request);
        validate_request(&request)?;
        validate_response(&response)?;

        let key = request.url_without_fragment().to_string();
        let head = EntryHead::from_response(&response);
        let body = response.take_body()?;

        let path = self.entry_path(&key);
        let temp_path = self.dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));

        let written = match write_temp(&temp_path, &head, body).await {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(Error::Storage(format!(
                "Failed to store cache entry {}: {}",
                key, e
            )));
        }

        debug!(cache = %self.name, url = %key, bytes = written, "Stored cache entry");
        Ok(())
    }

    /// First response whose key matches the request.
    pub async fn match_request(
        &self,
        request: impl Into<RequestLike>,
        options: CacheQueryOptions,
    ) -> Result<Option<Response>> {
        let request = to_request(request);
        let entries = self.matching_entries(&request, &options).await?;

        match entries.into_iter().next() {
            Some((key, path)) => Ok(Some(codec::open_entry(&path, &key).await?)),
            None => Ok(None),
        }
    }

    /// Every response whose key matches the request, in directory order.
    ///
    /// A matching entry that cannot be decoded fails the whole call.
    pub async fn match_all(
        &self,
        request: impl Into<RequestLike>,
        options: CacheQueryOptions,
    ) -> Result<Vec<Response>> {
        let request = to_request(request);
        let entries = self.matching_entries(&request, &options).await?;

        let mut responses = Vec::with_capacity(entries.len());
        for (key, path) in entries {
            responses.push(codec::open_entry(&path, &key).await?);
        }
        Ok(responses)
    }

    /// Stored keys as GET requests. Without a request every key is returned.
    pub async fn keys(
        &self,
        request: Option<RequestLike>,
        options: CacheQueryOptions,
    ) -> Result<Vec<Request>> {
        let entries = match request {
            Some(request) => {
                let request = request.into_request();
                self.matching_entries(&request, &options).await?
            }
            None => self.entries().await?,
        };

        Ok(entries.into_iter().map(|(key, _)| Request::get(key)).collect())
    }

    /// Remove every entry matching the request. Returns whether any existed.
    pub async fn delete(
        &self,
        request: impl Into<RequestLike>,
        options: CacheQueryOptions,
    ) -> Result<bool> {
        let request = to_request(request);
        let entries = self.matching_entries(&request, &options).await?;

        let mut removed = false;
        for (key, path) in entries {
            match fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(cache = %self.name, url = %key, "Deleted cache entry");
                    removed = true;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(Error::Storage(format!(
                        "Failed to delete cache entry {}: {}",
                        key, e
                    )));
                }
            }
        }
        Ok(removed)
    }

    /// Fetch a URL and store the response.
    pub async fn add(&self, request: impl Into<RequestLike>) -> Result<()> {
        self.add_all([request]).await
    }

    /// Fetch every request concurrently and store each successful response.
    ///
    /// All requests are validated before anything is fetched. Responses that
    /// were fetched successfully are stored even when another request fails;
    /// the first failure is returned once every put has settled.
    pub async fn add_all<I, R>(&self, requests: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<RequestLike>,
    {
        let requests: Vec<Request> = requests.into_iter().map(to_request).collect();

        for request in &requests {
            validate_request(request)?;
        }

        let fetched = join_all(requests.iter().map(|request| async move {
            let response = self.fetcher.fetch(request.clone()).await?;
            validate_fetched(&response)?;
            Ok::<_, Error>(response)
        }))
        .await;

        let mut first_error = None;
        let mut puts = Vec::new();
        for (request, result) in requests.into_iter().zip(fetched) {
            match result {
                Ok(response) => puts.push(self.put(request, response)),
                Err(e) => {
                    warn!(cache = %self.name, url = %request.url(), error = %e, "Fetch failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        for result in join_all(puts).await {
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Decodable `(key, path)` pairs in directory listing order.
    async fn entries(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut read_dir = fs::read_dir(&self.dir).await.map_err(|e| {
            Error::Storage(format!("Failed to read cache {}: {}", self.name, e))
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Error::Storage(format!("Failed to read entry: {}", e)))?
        {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                warn!(cache = %self.name, file = ?file_name, "Skipping non UTF-8 file name");
                continue;
            };

            // In-flight writes
            if name.starts_with('.') {
                continue;
            }

            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            match keys::decode_name(name) {
                Some(key) if is_file => entries.push((key, entry.path())),
                _ => warn!(cache = %self.name, file = %name, "Skipping unrecognized file"),
            }
        }

        debug!(cache = %self.name, count = entries.len(), "Listed cache entries");
        Ok(entries)
    }

    async fn matching_entries(
        &self,
        request: &Request,
        options: &CacheQueryOptions,
    ) -> Result<Vec<(String, PathBuf)>> {
        if !request.is_get() && !options.ignore_method {
            return Ok(Vec::new());
        }

        let query = comparable(request.url_without_fragment(), options);
        let entries = self.entries().await?;
        Ok(entries
            .into_iter()
            .filter(|(key, _)| comparable(key, options) == query)
            .collect())
    }
}

/// Write and fsync a complete entry at `path`. The caller owns cleanup.
async fn write_temp(path: &Path, head: &EntryHead, body: Option<Body>) -> Result<u64> {
    let mut file = fs::File::create(path)
        .await
        .map_err(|e| Error::Storage(format!("Failed to create cache entry: {}", e)))?;

    let written = codec::write_entry(&mut file, head, body).await?;
    file.sync_all()
        .await
        .map_err(|e| Error::Storage(format!("Failed to flush cache entry: {}", e)))?;
    Ok(written)
}

fn to_request(request: impl Into<RequestLike>) -> Request {
    let request: RequestLike = request.into();
    request.into_request()
}

fn comparable<'a>(url: &'a str, options: &CacheQueryOptions) -> &'a str {
    let url = strip_fragment(url);
    if options.ignore_search {
        strip_search(url)
    } else {
        url
    }
}

fn validate_request(request: &Request) -> Result<()> {
    if !request.is_http() {
        return Err(Error::InvalidScheme(request.scheme().to_string()));
    }
    if !request.is_get() {
        return Err(Error::UnsupportedMethod(request.method().to_string()));
    }
    Ok(())
}

fn validate_response(response: &Response) -> Result<()> {
    if response.status() == 206 {
        return Err(Error::PartialResponseUnsupported);
    }

    let vary_wildcard = response
        .headers()
        .get_all("vary")
        .iter()
        .flat_map(|value| value.split(','))
        .any(|field| field.trim() == "*");
    if vary_wildcard {
        return Err(Error::VaryWildcard);
    }

    if response.body_used() {
        return Err(Error::BodyAlreadyUsed);
    }
    Ok(())
}

fn validate_fetched(response: &Response) -> Result<()> {
    if response.status() == 206 {
        return Err(Error::PartialResponseUnsupported);
    }
    if !response.ok() {
        return Err(Error::RequestFailed {
            status: response.status(),
        });
    }
    Ok(())
}

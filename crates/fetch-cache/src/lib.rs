//! File-backed HTTP response cache.
//!
//! A [`CacheStorage`] owns a root directory with one subdirectory per
//! named cache. Each [`NamedCache`] stores one file per request URL,
//! holding the response head and body in the [`codec`] format.

pub mod cache;
pub mod codec;
pub mod config;
pub mod fetch;
pub mod keys;
pub mod storage;

pub use cache::NamedCache;
pub use codec::EntryHead;
pub use config::StorageConfig;
pub use fetch::HttpFetcher;
pub use keys::{decode_name, encode_name};
pub use storage::CacheStorage;

pub use fetch_cache_core::{
    Body, CacheQueryOptions, Error, Fetcher, Headers, Request, RequestLike, Response, Result,
};

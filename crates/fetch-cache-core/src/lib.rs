//! fetch-cache Core
//!
//! Error taxonomy, HTTP message types, query options and port traits
//! shared by the cache engine and the command-line interface.

pub mod error;
pub mod http;
pub mod options;
pub mod ports;

pub use error::{Error, Result};
pub use http::{Body, Headers, Request, RequestLike, Response};
pub use options::CacheQueryOptions;
pub use ports::Fetcher;

//! HTTP transport for the fetch-and-store helpers.

use async_trait::async_trait;
use fetch_cache_core::{Body, Error, Fetcher, Headers, Request, Response, Result};
use reqwest::{Client, Method};
use tracing::debug;

/// [`Fetcher`] backed by a reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: Request) -> Result<Response> {
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|_| Error::UnsupportedMethod(request.method().to_string()))?;

        let mut builder = self.client.request(method, request.url());
        for (name, value) in request.headers().iter() {
            builder = builder.header(name, value);
        }

        let res = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to fetch {}: {}", request.url(), e)))?;

        let status = res.status();
        let url = res.url().to_string();
        // Values may carry obs-text bytes; keep them rather than drop the header.
        let headers: Headers = res
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = res
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read body of {}: {}", url, e)))?;

        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "Fetched");

        Ok(Response::from_parts(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            headers,
            Some(Body::from(body.to_vec())),
        )
        .with_url(url))
    }
}

//! Port traits for external collaborators.

use crate::Result;
use crate::http::{Request, Response};
use async_trait::async_trait;

/// Network retrieval used by the fetch-and-store helpers.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request and return the response with an unread body.
    async fn fetch(&self, request: Request) -> Result<Response>;
}

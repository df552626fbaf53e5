//! HTTP message types: headers, requests, responses and bodies.
//!
//! These are deliberately small. A request carries a URL, a method and
//! headers; a response carries status, status text, headers and a body
//! that can be read exactly once.

use crate::{Error, Result};
use std::fmt;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Ordered, multi-valued header list.
///
/// Names are stored lowercased; insertion order is preserved across all
/// names so repeated headers such as `Set-Cookie` keep their sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value without replacing existing values for the name.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .push((name.as_ref().to_ascii_lowercase(), value.into()));
    }

    /// All values for `name`, combined with `", "`.
    pub fn get(&self, name: &str) -> Option<String> {
        let values = self.get_all(name);
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    /// Every value stored for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

/// An HTTP request used as a cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: String,
    method: String,
    headers: Headers,
}

impl Request {
    /// Create a GET request.
    pub fn get(url: impl AsRef<str>) -> Self {
        Self::new("GET", url)
    }

    /// Create a request with an explicit method.
    ///
    /// URLs that parse are stored in their serialized form
    /// (`http://example.com` becomes `http://example.com/`); anything else
    /// is kept verbatim so it can still be compared against stored keys.
    pub fn new(method: impl AsRef<str>, url: impl AsRef<str>) -> Self {
        Self {
            url: normalize_url(url.as_ref()),
            method: method.as_ref().to_ascii_uppercase(),
            headers: Headers::new(),
        }
    }

    /// Parse `url` strictly, failing on anything that is not an absolute URL.
    pub fn parse(method: impl AsRef<str>, url: &str) -> Result<Self> {
        let parsed = url::Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self::new(method, parsed.as_str()))
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// The URL with any `#fragment` removed.
    pub fn url_without_fragment(&self) -> &str {
        strip_fragment(&self.url)
    }

    /// Scheme portion of the URL (text before the first `:`).
    pub fn scheme(&self) -> &str {
        self.url.split(':').next().unwrap_or_default()
    }

    /// Whether the URL is an absolute `http://` or `https://` URL.
    pub fn is_http(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}

fn normalize_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => parsed.into(),
        Err(_) => raw.to_string(),
    }
}

/// Remove a trailing `#fragment` from a URL.
pub fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

/// Remove the `?query` part from a URL.
pub fn strip_search(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Either a bare URL or a full request.
#[derive(Debug, Clone)]
pub enum RequestLike {
    Url(String),
    Request(Request),
}

impl RequestLike {
    /// Normalize into a request; bare URLs become GET requests.
    pub fn into_request(self) -> Request {
        match self {
            RequestLike::Url(url) => Request::get(url),
            RequestLike::Request(request) => request,
        }
    }
}

impl From<&str> for RequestLike {
    fn from(url: &str) -> Self {
        RequestLike::Url(url.to_string())
    }
}

impl From<String> for RequestLike {
    fn from(url: String) -> Self {
        RequestLike::Url(url)
    }
}

impl From<&String> for RequestLike {
    fn from(url: &String) -> Self {
        RequestLike::Url(url.clone())
    }
}

impl From<Request> for RequestLike {
    fn from(request: Request) -> Self {
        RequestLike::Request(request)
    }
}

impl From<&Request> for RequestLike {
    fn from(request: &Request) -> Self {
        RequestLike::Request(request.clone())
    }
}

/// A response body, readable once as an async byte stream.
pub struct Body {
    reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl Body {
    pub fn empty() -> Self {
        Self::from(Vec::new())
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            reader: Box::pin(reader),
        }
    }

    pub fn into_reader(self) -> Pin<Box<dyn AsyncRead + Send>> {
        self.reader
    }

    /// Read the whole body into memory.
    pub async fn bytes(mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").finish_non_exhaustive()
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_reader(std::io::Cursor::new(bytes))
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Self::from(bytes.to_vec())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::from(text.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::from(text.as_bytes())
    }
}

/// An HTTP response as stored in, or returned from, a cache.
#[derive(Debug)]
pub struct Response {
    url: Option<String>,
    status: u16,
    status_text: String,
    headers: Headers,
    body: Option<Body>,
    body_used: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            url: None,
            status: 200,
            status_text: String::new(),
            headers: Headers::new(),
            body: None,
            body_used: false,
        }
    }
}

impl Response {
    /// A 200 response with the given body.
    pub fn new(body: impl Into<Body>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// A 200 response without a body.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parts(
        status: u16,
        status_text: impl Into<String>,
        headers: Headers,
        body: Option<Body>,
    ) -> Self {
        Self {
            url: None,
            status,
            status_text: status_text.into(),
            headers,
            body,
            body_used: false,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// URL of the entry this response was read from, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn body_used(&self) -> bool {
        self.body_used
    }

    /// Take the body out of the response. Fails once the body was consumed.
    pub fn take_body(&mut self) -> Result<Option<Body>> {
        if self.body_used {
            return Err(Error::BodyAlreadyUsed);
        }
        self.body_used = self.body.is_some();
        Ok(self.body.take())
    }

    /// Read the body fully. A response without a body yields no bytes.
    pub async fn bytes(&mut self) -> Result<Vec<u8>> {
        match self.take_body()? {
            Some(body) => body.bytes().await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn text(&mut self) -> Result<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }
}

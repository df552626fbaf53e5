//! On-disk entry format.
//!
//! ```text
//! bytes[0..4)   little-endian u32 L
//! bytes[4..4+L) UTF-8 JSON {"headers":[[k,v],...],"status":N,"statusText":"..."}
//! bytes[4+L..)  raw response body
//! ```

use fetch_cache_core::{Body, Error, Headers, Response, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the header length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Response metadata stored ahead of the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryHead {
    pub headers: Vec<(String, String)>,
    pub status: u16,
    pub status_text: String,
}

impl EntryHead {
    pub fn from_response(response: &Response) -> Self {
        Self {
            headers: response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            status: response.status(),
            status_text: response.status_text().to_string(),
        }
    }

    /// Rebuild the header list, appending pairs in stored order.
    pub fn to_headers(&self) -> Headers {
        self.headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect()
    }

    /// Length prefix followed by the JSON header.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self)?;
        let len = u32::try_from(json.len()).map_err(|_| {
            Error::Serialization(format!("Entry header too large: {} bytes", json.len()))
        })?;

        let mut buf = Vec::with_capacity(LENGTH_PREFIX_LEN + json.len());
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&json);
        Ok(buf)
    }
}

/// Write the head and stream the body into `writer`. Returns bytes written.
pub async fn write_entry<W>(writer: &mut W, head: &EntryHead, body: Option<Body>) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let encoded = head.encode()?;
    writer.write_all(&encoded).await?;
    let mut written = encoded.len() as u64;

    if let Some(body) = body {
        let mut reader = body.into_reader();
        written += tokio::io::copy(&mut reader, writer).await?;
    }

    writer.flush().await?;
    Ok(written)
}

/// Read the length prefix and JSON header, leaving `reader` at the body.
///
/// `key` only labels the error.
pub async fn read_head<R>(reader: &mut R, key: &str) -> Result<EntryHead>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_LEN];
    reader
        .read_exact(&mut prefix)
        .await
        .map_err(|e| decode_error(key, format!("truncated length prefix: {}", e)))?;
    let len = u32::from_le_bytes(prefix) as usize;

    // The prefix is untrusted; grow the buffer only as bytes arrive.
    let mut json = Vec::new();
    (&mut *reader)
        .take(len as u64)
        .read_to_end(&mut json)
        .await
        .map_err(|e| decode_error(key, format!("unreadable header: {}", e)))?;
    if json.len() != len {
        return Err(decode_error(
            key,
            format!("truncated header ({} bytes expected, {} found)", len, json.len()),
        ));
    }

    serde_json::from_slice(&json).map_err(|e| decode_error(key, format!("invalid header: {}", e)))
}

/// Open an entry file and rebuild the response.
///
/// The body streams from the file starting right after the header.
pub async fn open_entry(path: &Path, key: &str) -> Result<Response> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| Error::Storage(format!("Failed to open cache entry {}: {}", key, e)))?;

    let head = read_head(&mut file, key).await?;
    let headers = head.to_headers();

    Ok(
        Response::from_parts(head.status, head.status_text, headers, Some(Body::from_reader(file)))
            .with_url(key),
    )
}

fn decode_error(key: &str, reason: String) -> Error {
    Error::Decode {
        key: key.to_string(),
        reason,
    }
}

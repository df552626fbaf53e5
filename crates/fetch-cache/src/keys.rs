//! Reversible file name encoding for cache names and entry URLs.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Encode a cache name or URL into a file-system safe name.
///
/// Uses the URL-safe base64 alphabet without padding, so the result never
/// contains `/` and never starts with `.`.
pub fn encode_name(name: &str) -> String {
    URL_SAFE_NO_PAD.encode(name.as_bytes())
}

/// Decode a file name produced by [`encode_name`].
///
/// Returns `None` for names that are not a canonical encoding of UTF-8
/// text, such as temporary files or files placed there by something else.
pub fn decode_name(encoded: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

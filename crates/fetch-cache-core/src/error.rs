//! Error types for fetch-cache.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Validation errors
    #[error("Request scheme '{0}' is unsupported")]
    InvalidScheme(String),

    #[error("Request method '{0}' is unsupported")]
    UnsupportedMethod(String),

    #[error("Partial response (status code 206) is unsupported")]
    PartialResponseUnsupported,

    #[error("Vary header contains *")]
    VaryWildcard,

    #[error("Response body is already used")]
    BodyAlreadyUsed,

    #[error("Request failed with status {status}")]
    RequestFailed { status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid cache name '{0}'")]
    InvalidCacheName(String),

    // Storage errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    // Decode errors
    #[error("Corrupt cache entry {key}: {reason}")]
    Decode { key: String, reason: String },

    // Collaborator errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error was raised by request/response validation,
    /// before any I/O took place.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidScheme(_)
                | Error::UnsupportedMethod(_)
                | Error::PartialResponseUnsupported
                | Error::VaryWildcard
                | Error::BodyAlreadyUsed
                | Error::RequestFailed { .. }
                | Error::InvalidUrl(_)
                | Error::InvalidCacheName(_)
        )
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(Error::InvalidScheme("ftp".into()).is_validation());
        assert!(Error::UnsupportedMethod("POST".into()).is_validation());
        assert!(Error::PartialResponseUnsupported.is_validation());
        assert!(Error::VaryWildcard.is_validation());
        assert!(Error::BodyAlreadyUsed.is_validation());
        assert!(Error::InvalidCacheName(String::new()).is_validation());
        assert!(!Error::Storage("disk full".into()).is_validation());
        assert!(!Error::Network("timeout".into()).is_validation());
    }

    #[test]
    fn test_decode_classification() {
        let err = Error::Decode {
            key: "http://example.com/".into(),
            reason: "truncated header".into(),
        };
        assert!(err.is_decode());
        assert!(!err.is_validation());
        assert_eq!(
            err.to_string(),
            "Corrupt cache entry http://example.com/: truncated header"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

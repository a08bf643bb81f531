//! Error types for the status page client.

use thiserror::Error;

/// Errors that can occur when talking to the Cachet API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured endpoint is not a usable base URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ClientError {
    /// Whether the upstream could not be reached at all, as opposed to
    /// answering with something unusable.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Connection(_) | ClientError::Timeout)
    }

    /// Short, stable name of the error class, for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::InvalidEndpoint(_) => "invalid_endpoint",
            ClientError::Connection(_) => "connection",
            ClientError::Timeout => "timeout",
            ClientError::Http(_) => "http",
            ClientError::Parse(_) => "malformed_response",
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(ClientError::Timeout.is_transport());
        assert!(ClientError::Connection("refused".into()).is_transport());
        assert!(!ClientError::Parse("eof".into()).is_transport());
        assert!(!ClientError::Http("API returned status 500".into()).is_transport());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ClientError::Parse("x".into()).kind(), "malformed_response");
        assert_eq!(ClientError::Timeout.kind(), "timeout");
    }

    #[test]
    fn test_from_serde_json_is_parse() {
        let err = serde_json::from_str::<u8>("nope").unwrap_err();
        assert!(matches!(ClientError::from(err), ClientError::Parse(_)));
    }
}

//! Error types for the palisade HTTP client

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias using palisade's error type
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// Errors surfaced by the HTTP client
///
/// A response with a 4xx or 5xx status is *not* an error: callers receive
/// the response and inspect the status themselves. Errors cover transport
/// failures, breaker fast-fails, cancellation, and caller mistakes.
#[derive(Error, Debug)]
pub enum HttpClientError {
    /// The request URL could not be parsed
    #[error("invalid url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// A caller-supplied header name or value is malformed
    #[error("invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    /// The request body could not be encoded
    #[error("failed to encode request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// The transport failed: DNS, connect, TLS, or per-attempt timeout
    #[error("[{operation}] transport failure: {source}")]
    Transport {
        operation: String,
        #[source]
        source: TransportError,
    },

    /// Synthesized failure signal for a response with status >= 500
    ///
    /// Never returned from the facade (the 5xx response itself is); used as
    /// the failure the circuit breaker records.
    #[error("[{operation}] upstream returned status {status}")]
    ServerStatus { operation: String, status: u16 },

    /// The circuit breaker fast-failed the call without touching the network
    #[error("[{operation}] circuit breaker is open")]
    BreakerOpen { operation: String },

    /// The caller's cancellation token fired during the retry loop
    #[error("[{operation}] call cancelled after {attempts} attempts")]
    Cancelled { operation: String, attempts: u32 },

    /// Invalid client configuration
    #[error("invalid client configuration: {message}")]
    Config { message: String },

    /// Configuration file could not be read
    #[error("failed to read configuration file: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml_ng::Error),
}

impl HttpClientError {
    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an invalid header error
    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a transport error for the named operation
    pub fn transport(operation: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            operation: operation.into(),
            source,
        }
    }

    /// Create a synthesized server-status failure signal
    pub fn server_status(operation: impl Into<String>, status: u16) -> Self {
        Self::ServerStatus {
            operation: operation.into(),
            status,
        }
    }

    /// Create a breaker-open error
    pub fn breaker_open(operation: impl Into<String>) -> Self {
        Self::BreakerOpen {
            operation: operation.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check whether this error is a breaker fast-fail
    pub fn is_breaker_open(&self) -> bool {
        matches!(self, Self::BreakerOpen { .. })
    }

    /// Check whether this error is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let err = HttpClientError::invalid_url("not a url", "relative URL without a base");
        assert!(err.to_string().contains("not a url"));

        let err = HttpClientError::server_status("GET::/users", 503);
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("GET::/users"));

        let err = HttpClientError::breaker_open("orders");
        assert!(err.is_breaker_open());
        assert!(err.to_string().contains("circuit breaker is open"));
    }

    #[test]
    fn test_cancelled_predicate() {
        let err = HttpClientError::Cancelled {
            operation: "op".to_string(),
            attempts: 2,
        };
        assert!(err.is_cancelled());
        assert!(!err.is_breaker_open());
    }
}

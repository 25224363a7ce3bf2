//! Per-call options
//!
//! Every recognized option is an explicit field on `CallOptions`, passed by
//! value into each verb method. There is no ambient context bag and no
//! runtime type assertion: what the call can override is exactly what this
//! struct enumerates.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use palisade_core::types::RetryPolicy;

/// Options for one logical call
///
/// # Example
///
/// ```rust
/// use palisade::CallOptions;
/// use std::time::Duration;
///
/// let options = CallOptions::new()
///     .with_operation_name("GetUserProfile")
///     .with_header("x-tenant-id", "42")
///     .with_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Operation name used for retry-override lookup, breaker command
    /// identity, and tracing/metrics labels
    ///
    /// Defaults to `"{METHOD}::{URL}"`. Keep it low-cardinality: a name per
    /// API, never per request.
    pub operation_name: Option<String>,

    /// Custom headers applied after the client's defaults, so a caller can
    /// override the default content type
    pub headers: Vec<(String, String)>,

    /// Per-call request timeout, applied to each physical attempt
    pub timeout: Option<Duration>,

    /// Per-call retry policy, overriding both the route override and the
    /// client default
    pub retry: Option<RetryPolicy>,

    /// Cancellation token honored between attempts and during backoff sleeps
    pub cancellation: Option<CancellationToken>,
}

impl CallOptions {
    /// Create empty options; every field falls back to the client defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operation name
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Append a custom header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the per-attempt request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the retry policy for this call only
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Attach a cancellation token to this call
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

//! # palisade
//!
//! Resilient outbound HTTP client providing:
//! - Retry with a configurable backoff schedule and per-route overrides
//! - Optional circuit breaking behind a collaborator trait
//! - Optional tracing annotation and external-call timing per attempt
//! - Replayable request bodies: identical bytes on every attempt
//!
//! One logical call makes one-or-more physical attempts with a deterministic
//! outcome: callers always receive either a single response (whose status
//! they inspect themselves, 4xx and final 5xx included) or a single error.

pub mod body;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod options;
pub mod trace;
pub mod transport;

mod executor;
mod orchestrator;

pub use body::ReplayBody;
pub use client::{HttpClient, HttpClientBuilder};
pub use config::{BreakerConfig, ClientConfig};
pub use error::{HttpClientError, Result};
pub use metrics::{CallRecorder, CallTimer, NoopRecorder, StatsRecorder, TracingRecorder};
pub use options::CallOptions;
pub use trace::{ClientSpan, ClientTracer, NoopTracer, TracingClientTracer};
pub use transport::{HttpResponse, ReqwestTransport, RequestIntent, Transport, TransportError};

pub use palisade_core::breaker::{BreakerError, CircuitBreaker, ThresholdBreaker, ThresholdSettings};
pub use palisade_core::retry::{RetryObserver, StatsObserver, TracingObserver};
pub use palisade_core::types::{RetryPolicies, RetryPolicy};

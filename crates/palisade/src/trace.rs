//! Tracer collaborator
//!
//! The tracer annotates each physical attempt with a client span. Span
//! creation and header injection belong to the tracing system behind the
//! trait; the client only starts a span before the send, tags it with the
//! outcome, and relies on drop for finalization, so the span is closed on
//! every exit path.

use reqwest::header::HeaderMap;

use crate::transport::RequestIntent;

/// A client span covering one physical attempt
///
/// Finalization happens on drop; implementations must not require an
/// explicit close call.
pub trait ClientSpan: Send {
    /// Attach a key/value annotation to the span
    fn set_tag(&mut self, key: &str, value: String);

    /// Inject propagation headers into the outgoing request
    fn inject_headers(&self, headers: &mut HeaderMap) {
        let _ = headers;
    }
}

/// Tracer collaborator: a process-wide, read-mostly singleton
pub trait ClientTracer: Send + Sync {
    /// Whether spans should be created at all
    fn is_enabled(&self) -> bool;

    /// Start a span for one attempt at the given request
    fn start_client_span(&self, intent: &RequestIntent) -> Box<dyn ClientSpan>;
}

/// Tracer that never creates spans
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

struct NoopSpan;

impl ClientSpan for NoopSpan {
    fn set_tag(&mut self, _key: &str, _value: String) {}
}

impl ClientTracer for NoopTracer {
    fn is_enabled(&self) -> bool {
        false
    }

    fn start_client_span(&self, _intent: &RequestIntent) -> Box<dyn ClientSpan> {
        Box::new(NoopSpan)
    }
}

/// Tracer backed by the `tracing` crate
///
/// Creates one span per attempt carrying operation, method, and URL; tags
/// accumulate and are emitted as a single event when the span finishes.
/// This tracer does not propagate trace context over the wire; injection
/// is left to tracing systems implementing [`ClientSpan::inject_headers`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingClientTracer;

impl TracingClientTracer {
    /// Create a new tracing-backed tracer
    pub fn new() -> Self {
        Self
    }
}

struct TracingSpan {
    span: tracing::Span,
    tags: Vec<(String, String)>,
}

impl ClientSpan for TracingSpan {
    fn set_tag(&mut self, key: &str, value: String) {
        self.tags.push((key.to_string(), value));
    }
}

impl Drop for TracingSpan {
    fn drop(&mut self) {
        let _guard = self.span.enter();
        tracing::debug!(tags = ?self.tags, "client span finished");
    }
}

impl ClientTracer for TracingClientTracer {
    fn is_enabled(&self) -> bool {
        true
    }

    fn start_client_span(&self, intent: &RequestIntent) -> Box<dyn ClientSpan> {
        let span = tracing::debug_span!(
            "http_client_call",
            operation = %intent.operation,
            method = %intent.method,
            url = %intent.url,
        );
        Box::new(TracingSpan {
            span,
            tags: Vec::new(),
        })
    }
}

//! Attempt executor
//!
//! Performs exactly one physical send: per-attempt timeout (applied by the
//! transport), a client span when tracing is enabled, and a call timer when
//! metrics are enabled. Span and timer are finalized by drop on every exit
//! path. The result comes back unclassified; deciding what a failure means
//! is the orchestrator's job.

use std::sync::Arc;

use crate::metrics::CallRecorder;
use crate::trace::ClientTracer;
use crate::transport::{HttpResponse, RequestIntent, Transport, TransportError};

pub(crate) struct AttemptExecutor {
    transport: Arc<dyn Transport>,
    tracer: Arc<dyn ClientTracer>,
    recorder: Arc<dyn CallRecorder>,
}

impl AttemptExecutor {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        tracer: Arc<dyn ClientTracer>,
        recorder: Arc<dyn CallRecorder>,
    ) -> Self {
        Self {
            transport,
            tracer,
            recorder,
        }
    }

    /// One physical send with tracing and metrics around the transport call
    pub(crate) async fn send_once(
        &self,
        intent: &RequestIntent,
    ) -> Result<HttpResponse, TransportError> {
        let mut span = self
            .tracer
            .is_enabled()
            .then(|| self.tracer.start_client_span(intent));

        // Propagation headers go onto a per-attempt copy; the intent itself
        // stays immutable across attempts.
        let mut attempt = intent.clone();
        if let Some(span) = &span {
            span.inject_headers(&mut attempt.headers);
        }

        let _timer = self
            .recorder
            .is_enabled()
            .then(|| self.recorder.record_external_call(&attempt));

        let result = self.transport.send(&attempt).await;

        if let Some(span) = span.as_mut() {
            match &result {
                Ok(response) => {
                    span.set_tag(
                        "http.response.status",
                        response.status().as_u16().to_string(),
                    );
                    for (name, value) in response.headers() {
                        span.set_tag(
                            &format!("http.response.header.{}", name),
                            String::from_utf8_lossy(value.as_bytes()).into_owned(),
                        );
                    }
                }
                Err(err) => {
                    span.set_tag("error", err.to_string());
                }
            }
        }

        // Span and timer drop here, on success and failure alike.
        result
    }
}

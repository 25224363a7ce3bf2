//! Client facade
//!
//! Verb-shaped entry points that assemble a request intent, resolve per-call
//! options and the effective retry policy, and delegate to the orchestrator.
//! Collaborators (transport, breaker, tracer, recorder) are injected at
//! construction time; per-call state lives entirely in the intent.

use std::str::FromStr;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};

use palisade_core::breaker::CircuitBreaker;

use crate::body::ReplayBody;
use crate::config::ClientConfig;
use crate::error::{HttpClientError, Result};
use crate::executor::AttemptExecutor;
use crate::metrics::{CallRecorder, NoopRecorder, TracingRecorder};
use crate::options::CallOptions;
use crate::orchestrator::Orchestrator;
use crate::trace::{ClientTracer, NoopTracer, TracingClientTracer};
use crate::transport::{HttpResponse, ReqwestTransport, RequestIntent, Transport};

/// Resilient outbound HTTP client
///
/// One client holds one transport (connection pool) plus the shared
/// collaborators; it is cheap to share behind an `Arc` and safe to call
/// concurrently; concurrent calls share no mutable state except the
/// breaker's own statistics.
///
/// # Example
///
/// ```rust,no_run
/// use palisade::{CallOptions, ClientConfig, HttpClient, ReplayBody};
///
/// #[tokio::main]
/// async fn main() -> Result<(), palisade::HttpClientError> {
///     let client = HttpClient::new(ClientConfig::default())?;
///
///     let response = client
///         .get(
///             "https://api.example.com/users/profile",
///             CallOptions::new().with_operation_name("GetUserProfile"),
///         )
///         .await?;
///
///     println!("status: {}", response.status());
///     Ok(())
/// }
/// ```
pub struct HttpClient {
    config: ClientConfig,
    orchestrator: Orchestrator,
}

/// Builder for an [`HttpClient`] with collaborator injection
pub struct HttpClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    breaker: Option<Arc<dyn CircuitBreaker>>,
    tracer: Option<Arc<dyn ClientTracer>>,
    recorder: Option<Arc<dyn CallRecorder>>,
}

impl HttpClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            breaker: None,
            tracer: None,
            recorder: None,
        }
    }

    /// Replace the default reqwest transport
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Inject a circuit breaker collaborator
    ///
    /// Overrides the configuration: a breaker injected here is used even if
    /// `breaker.enabled` is false in the config (the breaker's own
    /// `is_enabled` still gates it per call).
    pub fn with_breaker(mut self, breaker: Arc<dyn CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Inject a tracer collaborator
    pub fn with_tracer(mut self, tracer: Arc<dyn ClientTracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Inject a call recorder collaborator
    pub fn with_recorder(mut self, recorder: Arc<dyn CallRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HttpClient> {
        let config = self.config;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(&config.user_agent)
                    .map_err(|e| HttpClientError::config(e.to_string()))?,
            ),
        };

        let breaker: Option<Arc<dyn CircuitBreaker>> = self.breaker.or_else(|| {
            config
                .breaker
                .enabled
                .then(|| Arc::new(config.breaker.build_breaker()) as Arc<dyn CircuitBreaker>)
        });

        let tracer: Arc<dyn ClientTracer> = self.tracer.unwrap_or_else(|| {
            if config.tracing_enabled {
                Arc::new(TracingClientTracer::new())
            } else {
                Arc::new(NoopTracer)
            }
        });

        let recorder: Arc<dyn CallRecorder> = self.recorder.unwrap_or_else(|| {
            if config.metrics_enabled {
                Arc::new(TracingRecorder::new())
            } else {
                Arc::new(NoopRecorder)
            }
        });

        let executor = AttemptExecutor::new(transport, tracer, recorder);

        Ok(HttpClient {
            config,
            orchestrator: Orchestrator::new(executor, breaker),
        })
    }
}

impl HttpClient {
    /// Create a client with default collaborators from the configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Start building a client with injected collaborators
    pub fn builder(config: ClientConfig) -> HttpClientBuilder {
        HttpClientBuilder::new(config)
    }

    /// The configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a GET request
    pub async fn get(&self, url: &str, options: CallOptions) -> Result<HttpResponse> {
        self.request(Method::GET, url, ReplayBody::empty(), options)
            .await
    }

    /// Send a POST request
    pub async fn post(
        &self,
        url: &str,
        body: impl Into<ReplayBody>,
        options: CallOptions,
    ) -> Result<HttpResponse> {
        self.request(Method::POST, url, body.into(), options).await
    }

    /// Send a PUT request
    pub async fn put(
        &self,
        url: &str,
        body: impl Into<ReplayBody>,
        options: CallOptions,
    ) -> Result<HttpResponse> {
        self.request(Method::PUT, url, body.into(), options).await
    }

    /// Send a PATCH request
    pub async fn patch(
        &self,
        url: &str,
        body: impl Into<ReplayBody>,
        options: CallOptions,
    ) -> Result<HttpResponse> {
        self.request(Method::PATCH, url, body.into(), options).await
    }

    /// Send a DELETE request; the body may be empty
    pub async fn delete(
        &self,
        url: &str,
        body: impl Into<ReplayBody>,
        options: CallOptions,
    ) -> Result<HttpResponse> {
        self.request(Method::DELETE, url, body.into(), options)
            .await
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        body: ReplayBody,
        options: CallOptions,
    ) -> Result<HttpResponse> {
        let parsed_url =
            Url::parse(url).map_err(|e| HttpClientError::invalid_url(url, e.to_string()))?;

        let operation = options
            .operation_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{}::{}", method, parsed_url));

        // Per-call override, then route override, then the client default.
        let policy = match options.retry.clone() {
            Some(policy) => policy.normalized(),
            None => self.config.retry.resolve(method.as_str(), parsed_url.path()),
        };

        let timeout = options.timeout.unwrap_or(self.config.request_timeout());

        let headers = self.assemble_headers(&method, &options)?;

        let intent = RequestIntent {
            method: method.clone(),
            url: parsed_url.clone(),
            headers,
            body,
            timeout,
            operation: operation.clone(),
        };

        tracing::debug!(
            method = %method,
            url = %parsed_url,
            operation = %operation,
            retries_enabled = policy.enabled,
            max_attempts = policy.max_attempts,
            "dispatching request"
        );

        let response = self
            .orchestrator
            .run(intent, policy, options.cancellation)
            .await?;

        tracing::info!(
            method = %method,
            url = %parsed_url,
            status = response.status().as_u16(),
            "received response"
        );

        Ok(response)
    }

    /// Default content type first, caller headers after, so callers can
    /// override the default
    fn assemble_headers(&self, method: &Method, options: &CallOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let writes_body = matches!(
            method.as_str(),
            "POST" | "PUT" | "PATCH" | "DELETE"
        );
        if writes_body {
            let value = HeaderValue::from_str(&self.config.default_content_type)
                .map_err(|e| HttpClientError::config(format!("default content type: {}", e)))?;
            headers.insert(CONTENT_TYPE, value);
        }

        for (name, value) in &options.headers {
            let header_name = HeaderName::from_str(name)
                .map_err(|e| HttpClientError::invalid_header(name, e.to_string()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| HttpClientError::invalid_header(name, e.to_string()))?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

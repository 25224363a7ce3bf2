//! Transport collaborator
//!
//! The transport performs exactly one physical send with no retry or backoff
//! of its own. The default implementation rides on `reqwest`; tests inject
//! scripted transports through the same trait.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use thiserror::Error;

use crate::body::ReplayBody;

/// Immutable description of one logical call
///
/// Created once per facade call and shared by every physical attempt; only
/// the body handle is re-taken (from byte zero) per attempt.
#[derive(Debug, Clone)]
pub struct RequestIntent {
    /// HTTP method
    pub method: Method,
    /// Fully parsed request URL
    pub url: Url,
    /// Effective header set: client defaults plus per-call overrides
    pub headers: HeaderMap,
    /// Captured, replayable request payload
    pub body: ReplayBody,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Operation name labeling this call
    pub operation: String,
}

/// Errors produced by a transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP stack failed: DNS, connect, TLS, or timeout
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection-level failure reported by a non-reqwest transport
    #[error("connection failed: {message}")]
    Connection { message: String },
}

impl TransportError {
    /// Create a connection failure with the given message
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Whether this failure was a per-attempt timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout(),
            Self::Connection { .. } => false,
        }
    }
}

/// A buffered HTTP response
///
/// The body is read to completion inside the transport, so classification
/// and replay never hold a live connection.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    /// Assemble a response from parts; used by transports and test doubles
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw response body
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Response body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Response body decoded as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// One physical send, no retry or backoff of its own
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request described by the intent and buffer the response
    async fn send(&self, intent: &RequestIntent) -> Result<HttpResponse, TransportError>;
}

/// Default transport over a shared `reqwest` client
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with its own connection pool
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, intent: &RequestIntent) -> Result<HttpResponse, TransportError> {
        let mut request = self
            .client
            .request(intent.method.clone(), intent.url.clone())
            .headers(intent.headers.clone())
            .timeout(intent.timeout);

        if !intent.body.is_empty() {
            // A fresh handle per attempt: the replay starts at byte zero.
            request = request.body(intent.body.to_bytes());
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse::new(status, headers, body))
    }
}

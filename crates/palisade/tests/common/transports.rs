//! Scripted transport doubles
//!
//! `ScriptedTransport` serves a fixed sequence of outcomes and counts how
//! many times it was invoked; the counter is how tests verify attempt
//! budgets and breaker fast-fails.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use palisade::{HttpResponse, RequestIntent, Transport, TransportError};

/// A transport serving a scripted sequence of status codes
///
/// Status `0` means a connection-level transport error. Once the script is
/// consumed, the last entry repeats forever.
pub struct ScriptedTransport {
    script: Vec<u16>,
    calls: AtomicU32,
}

impl ScriptedTransport {
    /// Create a transport from a status script
    pub fn with_script(script: Vec<u16>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicU32::new(0),
        })
    }

    /// A transport that always fails at the connection level
    pub fn always_failing() -> Arc<Self> {
        Self::with_script(vec![0])
    }

    /// A transport that always answers with the given status
    pub fn always_status(status: u16) -> Arc<Self> {
        Self::with_script(vec![status])
    }

    /// Number of sends performed
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, _intent: &RequestIntent) -> Result<HttpResponse, TransportError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        let status = *self.script.get(index).or(self.script.last()).unwrap_or(&0);
        if status == 0 {
            Err(TransportError::connection("connection refused"))
        } else {
            Ok(HttpResponse::new(
                StatusCode::from_u16(status).expect("valid status in script"),
                HeaderMap::new(),
                Bytes::new(),
            ))
        }
    }
}

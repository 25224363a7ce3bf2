//! External-call recorder collaborator
//!
//! Mirrors the tracer's shape: a recorder hands out a timer per physical
//! attempt, and the timer finalizes on drop, so duration is observed on every
//! exit path. External APM systems sit behind the trait; this crate ships a
//! tracing-backed recorder and a counting recorder for tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::transport::RequestIntent;

/// Handle covering one recorded call; finalizes on drop
pub trait CallTimer: Send {}

/// Recorder collaborator: a process-wide, read-mostly singleton
pub trait CallRecorder: Send + Sync {
    /// Whether calls should be recorded at all
    fn is_enabled(&self) -> bool;

    /// Open a timer for one attempt at the given request
    fn record_external_call(&self, intent: &RequestIntent) -> Box<dyn CallTimer>;
}

/// Recorder that never records
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

struct NoopTimer;

impl CallTimer for NoopTimer {}

impl CallRecorder for NoopRecorder {
    fn is_enabled(&self) -> bool {
        false
    }

    fn record_external_call(&self, _intent: &RequestIntent) -> Box<dyn CallTimer> {
        Box::new(NoopTimer)
    }
}

/// Recorder that logs call durations through the `tracing` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecorder;

impl TracingRecorder {
    /// Create a new tracing-backed recorder
    pub fn new() -> Self {
        Self
    }
}

struct TracingTimer {
    operation: String,
    method: String,
    started: Instant,
}

impl CallTimer for TracingTimer {}

impl Drop for TracingTimer {
    fn drop(&mut self) {
        tracing::debug!(
            operation = %self.operation,
            method = %self.method,
            duration_ms = self.started.elapsed().as_millis() as u64,
            "external call finished"
        );
    }
}

impl CallRecorder for TracingRecorder {
    fn is_enabled(&self) -> bool {
        true
    }

    fn record_external_call(&self, intent: &RequestIntent) -> Box<dyn CallTimer> {
        Box::new(TracingTimer {
            operation: intent.operation.clone(),
            method: intent.method.to_string(),
            started: Instant::now(),
        })
    }
}

/// Recorder that counts opened and finalized timers, for tests
#[derive(Debug, Default)]
pub struct StatsRecorder {
    started: AtomicU32,
    finished: Arc<AtomicU32>,
}

impl StatsRecorder {
    /// Create a new counting recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers opened
    pub fn started(&self) -> u32 {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of timers finalized
    pub fn finished(&self) -> u32 {
        self.finished.load(Ordering::SeqCst)
    }
}

struct CountingTimer {
    finished: Arc<AtomicU32>,
}

impl CallTimer for CountingTimer {}

impl Drop for CountingTimer {
    fn drop(&mut self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

impl CallRecorder for StatsRecorder {
    fn is_enabled(&self) -> bool {
        true
    }

    fn record_external_call(&self, _intent: &RequestIntent) -> Box<dyn CallTimer> {
        self.started.fetch_add(1, Ordering::SeqCst);
        Box::new(CountingTimer {
            finished: self.finished.clone(),
        })
    }
}

impl<T: CallRecorder + ?Sized> CallRecorder for Arc<T> {
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn record_external_call(&self, intent: &RequestIntent) -> Box<dyn CallTimer> {
        (**self).record_external_call(intent)
    }
}

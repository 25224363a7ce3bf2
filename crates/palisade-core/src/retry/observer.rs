//! Retry observation and logging
//!
//! The `RetryObserver` trait receives callbacks during retry execution, for
//! logging, metrics collection, or test assertions. `TracingObserver` logs
//! events through the `tracing` crate; `StatsObserver` counts them.

use std::fmt::Display;
use std::time::Duration;

/// Observer trait for retry attempt events
///
/// Failures are passed as `&dyn Display`; the observer only ever formats
/// them, it never inspects their type.
pub trait RetryObserver: Send + Sync {
    /// Called when an attempt is about to start
    ///
    /// `attempt` is 1-indexed; `total_attempts` counts the unconditional
    /// first attempt plus all allowed retries.
    fn on_attempt_start(&self, attempt: u32, total_attempts: u32);

    /// Called when an attempt fails and another attempt will follow after
    /// `delay`
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, delay: Duration);

    /// Called when the operation succeeds
    fn on_success(&self, attempt: u32, total_duration: Duration);

    /// Called when the final allowed attempt has failed
    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display);

    /// Called when retrying stops before exhaustion: the failure was
    /// non-retryable, the policy disables retries, or the caller cancelled
    fn on_cancelled(&self, attempt: u32, error: Option<&dyn Display>) {
        let _ = (attempt, error);
    }
}

/// A no-op observer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _attempt: u32, _total_attempts: u32) {}

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Display, _delay: Duration) {}

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Display) {}
}

/// An observer that logs retry events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_attempt_start`: DEBUG
/// - `on_attempt_failed`: WARN
/// - `on_success`: INFO (after a retry) or DEBUG (first attempt)
/// - `on_exhausted`: ERROR
/// - `on_cancelled`: WARN
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Name of the operation being retried, used as log context
    operation: String,
}

impl TracingObserver {
    /// Create a new tracing observer for the named operation
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    /// Get the operation name
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, attempt: u32, total_attempts: u32) {
        tracing::debug!(
            operation = %self.operation,
            attempt = attempt,
            total_attempts = total_attempts,
            "starting attempt"
        );
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, delay: Duration) {
        tracing::warn!(
            operation = %self.operation,
            attempt = attempt,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "attempt failed, will retry"
        );
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        if attempt > 1 {
            tracing::info!(
                operation = %self.operation,
                attempt = attempt,
                total_duration_ms = total_duration.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                duration_ms = total_duration.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display) {
        tracing::error!(
            operation = %self.operation,
            attempts = attempts,
            error = %final_error,
            "all retry attempts exhausted"
        );
    }

    fn on_cancelled(&self, attempt: u32, error: Option<&dyn Display>) {
        if let Some(err) = error {
            tracing::warn!(
                operation = %self.operation,
                attempt = attempt,
                error = %err,
                "retrying stopped"
            );
        } else {
            tracing::warn!(
                operation = %self.operation,
                attempt = attempt,
                "retrying stopped"
            );
        }
    }
}

/// An observer that counts retry events, for tests and metrics
#[derive(Debug, Default)]
pub struct StatsObserver {
    attempt_starts: std::sync::atomic::AtomicU32,
    failures: std::sync::atomic::AtomicU32,
    successes: std::sync::atomic::AtomicU32,
    exhaustions: std::sync::atomic::AtomicU32,
    cancellations: std::sync::atomic::AtomicU32,
}

impl StatsObserver {
    /// Create a new stats observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attempts started
    pub fn attempt_starts(&self) -> u32 {
        self.attempt_starts
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of failed attempts that were followed by a retry
    pub fn failures(&self) -> u32 {
        self.failures.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of successful completions
    pub fn successes(&self) -> u32 {
        self.successes.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of exhaustion events
    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of early-stop events
    pub fn cancellations(&self) -> u32 {
        self.cancellations
            .load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _attempt: u32, _total_attempts: u32) {
        self.attempt_starts
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Display, _delay: Duration) {
        self.failures
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {
        self.successes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Display) {
        self.exhaustions
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_cancelled(&self, _attempt: u32, _error: Option<&dyn Display>) {
        self.cancellations
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_attempt_start(&self, attempt: u32, total_attempts: u32) {
        (**self).on_attempt_start(attempt, total_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, delay: Duration) {
        (**self).on_attempt_failed(attempt, error, delay)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display) {
        (**self).on_exhausted(attempts, final_error)
    }

    fn on_cancelled(&self, attempt: u32, error: Option<&dyn Display>) {
        (**self).on_cancelled(attempt, error)
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Box<T> {
    fn on_attempt_start(&self, attempt: u32, total_attempts: u32) {
        (**self).on_attempt_start(attempt, total_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, delay: Duration) {
        (**self).on_attempt_failed(attempt, error, delay)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display) {
        (**self).on_exhausted(attempts, final_error)
    }

    fn on_cancelled(&self, attempt: u32, error: Option<&dyn Display>) {
        (**self).on_cancelled(attempt, error)
    }
}

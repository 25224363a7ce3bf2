//! Circuit-breaker collaborator abstraction
//!
//! The retry engine never owns breaker state; it consumes this trait. A
//! breaker wraps one unit of work per call: it either fails fast because the
//! circuit is open, or runs the action and records its outcome for the
//! breaker's own statistics. [`ThresholdBreaker`] is the default
//! implementation shipped with this crate; any other implementation can be
//! injected at client construction time.

mod threshold;

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;

pub use threshold::{Phase, ThresholdBreaker, ThresholdSettings};

/// Boxed error type carried through the breaker contract
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The unit of work a breaker guards: an async action reporting success or a
/// failure signal the breaker records
pub type BreakerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;

/// Fallback hook applied to an action failure before it reaches the caller
pub type FallbackFn<'a> = &'a (dyn Fn(BoxError) -> BoxError + Send + Sync);

/// Errors surfaced by a circuit breaker execution
#[derive(Debug, Error)]
pub enum BreakerError {
    /// The circuit is open; the action was not invoked
    #[error("circuit breaker is open for operation '{operation}'")]
    Open {
        /// Operation (command) identity the breaker tracks
        operation: String,
    },

    /// The action ran and failed; the failure was recorded and passed
    /// through the fallback
    #[error(transparent)]
    Action(BoxError),
}

impl BreakerError {
    /// Check whether this error is a fast-fail from an open circuit
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open { .. })
    }
}

/// A circuit breaker guarding calls grouped by operation name
///
/// The contract mirrors a command-style breaker: `execute` either fails fast
/// without invoking the action (open circuit) or invokes it and records the
/// outcome. The `fallback` receives any action failure and may convert it; a
/// pass-through fallback returns it unchanged.
#[async_trait]
pub trait CircuitBreaker: Send + Sync {
    /// Whether this breaker is active; a disabled breaker is bypassed
    /// entirely by callers
    fn is_enabled(&self) -> bool;

    /// Run one guarded unit of work for the named operation
    async fn execute(
        &self,
        operation: &str,
        action: BreakerFuture<'_>,
        fallback: FallbackFn<'_>,
    ) -> Result<(), BreakerError>;
}

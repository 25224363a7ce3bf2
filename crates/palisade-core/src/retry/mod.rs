//! Schedule-driven retry execution engine
//!
//! The engine turns one logical operation into one-or-more attempts separated
//! by the backoff schedule of a [`RetryPolicy`](crate::types::RetryPolicy):
//!
//! - The first attempt is unconditional; a policy with retries enabled allows
//!   `max_attempts` further attempts, `max_attempts + 1` in total.
//! - A predicate can mark individual failures as non-retryable.
//! - Every attempt is observable via the [`RetryObserver`] trait.
//! - The backoff sleep races an optional cancellation token; cancellation
//!   during the sleep aborts the whole loop immediately.

mod error;
mod executor;
mod observer;
mod predicate;

pub use error::RetryError;
pub use executor::{RetryExecutor, RetryExecutorBuilder};
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
pub use predicate::{AlwaysRetry, ClosurePredicate, RetryPredicate};

#[cfg(test)]
mod tests;

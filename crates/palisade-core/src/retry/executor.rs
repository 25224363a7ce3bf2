//! Retry execution loop
//!
//! `RetryExecutor` runs an async operation under a [`RetryPolicy`]: the first
//! attempt is unconditional, then up to `max_attempts` retries separated by
//! the policy's backoff schedule. Attempts for one execution are strictly
//! sequential; the only suspension point between them is the backoff sleep,
//! which races the optional cancellation token.

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::types::RetryPolicy;

use super::error::RetryError;
use super::observer::{NoOpObserver, RetryObserver};
use super::predicate::{AlwaysRetry, RetryPredicate};

/// Builder for configuring a [`RetryExecutor`]
///
/// # Example
///
/// ```rust
/// use palisade_core::retry::{RetryExecutorBuilder, TracingObserver};
/// use palisade_core::types::RetryPolicy;
///
/// let executor = RetryExecutorBuilder::new()
///     .with_policy(RetryPolicy::default())
///     .with_observer(TracingObserver::new("fetch-profile"))
///     .build();
/// ```
pub struct RetryExecutorBuilder<P = AlwaysRetry, O = NoOpObserver> {
    policy: RetryPolicy,
    predicate: P,
    observer: O,
    cancellation: Option<CancellationToken>,
}

impl Default for RetryExecutorBuilder<AlwaysRetry, NoOpObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryExecutorBuilder<AlwaysRetry, NoOpObserver> {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            predicate: AlwaysRetry,
            observer: NoOpObserver,
            cancellation: None,
        }
    }
}

impl<P, O> RetryExecutorBuilder<P, O> {
    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the retry predicate deciding which failures are worth retrying
    pub fn with_predicate<P2>(self, predicate: P2) -> RetryExecutorBuilder<P2, O> {
        RetryExecutorBuilder {
            policy: self.policy,
            predicate,
            observer: self.observer,
            cancellation: self.cancellation,
        }
    }

    /// Set the observer receiving attempt callbacks
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutorBuilder<P, O2> {
        RetryExecutorBuilder {
            policy: self.policy,
            predicate: self.predicate,
            observer,
            cancellation: self.cancellation,
        }
    }

    /// Set the cancellation token raced against backoff sleeps
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the executor
    ///
    /// The policy's backoff schedule is normalized here, so the execution
    /// loop can index it without bounds checks.
    pub fn build(self) -> RetryExecutor<P, O> {
        RetryExecutor {
            policy: self.policy.normalized(),
            predicate: self.predicate,
            observer: self.observer,
            cancellation: self.cancellation,
        }
    }
}

/// A retry executor with configurable policy, predicate, and observer
///
/// Use [`RetryExecutorBuilder`] to create an instance.
pub struct RetryExecutor<P, O> {
    policy: RetryPolicy,
    predicate: P,
    observer: O,
    cancellation: Option<CancellationToken>,
}

impl<P, O> RetryExecutor<P, O>
where
    O: RetryObserver,
{
    /// Execute an operation under the configured policy
    ///
    /// Returns the operation's success value, or a [`RetryError`] carrying
    /// the final failure. Intermediate failures are reported to the observer
    /// and then dropped; only the last attempt's failure is surfaced.
    pub async fn execute<F, Fut, T, E>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: RetryPredicate<E>,
    {
        let start = Instant::now();
        let total = self.policy.total_attempts();

        for attempt in 1..=total {
            if let Some(token) = &self.cancellation {
                if token.is_cancelled() {
                    return Err(RetryError::cancelled(attempt - 1, None));
                }
            }

            self.observer.on_attempt_start(attempt, total);

            let err = match op().await {
                Ok(value) => {
                    self.observer.on_success(attempt, start.elapsed());
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !self.predicate.should_retry(&err) || !self.policy.enabled {
                self.observer.on_cancelled(attempt, Some(&err as &dyn Display));
                return Err(RetryError::non_retryable(err));
            }

            if attempt == total {
                self.observer.on_exhausted(attempt, &err);
                return Err(RetryError::exhausted(attempt, err, start.elapsed()));
            }

            // Backoff schedules are indexed by retry number, not attempt number.
            let delay = self.policy.delay((attempt - 1) as usize);
            self.observer.on_attempt_failed(attempt, &err, delay);

            if let Some(token) = &self.cancellation {
                tokio::select! {
                    _ = token.cancelled() => {
                        self.observer.on_cancelled(attempt, Some(&err as &dyn Display));
                        return Err(RetryError::cancelled(attempt, Some(err)));
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            } else if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        // total_attempts() is always >= 1, so the loop returns before this.
        Err(RetryError::cancelled(total, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::observer::StatsObserver;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn test_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            enabled: true,
            max_attempts,
            backoff_ms: vec![1], // short delays for tests
        }
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let observer = Arc::new(StatsObserver::new());

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(test_policy(3))
            .with_observer(observer.clone())
            .build()
            .execute(|| async { Ok("success") })
            .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(observer.attempt_starts(), 1);
        assert_eq!(observer.successes(), 1);
        assert_eq!(observer.failures(), 0);
    }

    #[tokio::test]
    async fn test_success_after_retry() {
        let observer = Arc::new(StatsObserver::new());
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(test_policy(3))
            .with_observer(observer.clone())
            .build()
            .execute(|| {
                let attempts = attempts_clone.clone();
                async move {
                    let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if attempt < 2 {
                        Err(io::Error::new(io::ErrorKind::TimedOut, "timeout"))
                    } else {
                        Ok("success")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(observer.attempt_starts(), 2);
        assert_eq!(observer.failures(), 1);
        assert_eq!(observer.successes(), 1);
    }

    #[tokio::test]
    async fn test_permanent_failure_makes_n_plus_one_attempts() {
        let observer = Arc::new(StatsObserver::new());

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(test_policy(3))
            .with_observer(observer.clone())
            .build()
            .execute(|| async { Err(io::Error::new(io::ErrorKind::TimedOut, "always fails")) })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_exhausted());
        // 1 unconditional attempt + 3 retries
        assert_eq!(err.attempts(), 4);
        assert_eq!(observer.attempt_starts(), 4);
        assert_eq!(observer.failures(), 3);
        assert_eq!(observer.exhaustions(), 1);
    }

    #[tokio::test]
    async fn test_disabled_policy_single_attempt() {
        let observer = Arc::new(StatsObserver::new());

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(RetryPolicy::disabled())
            .with_observer(observer.clone())
            .build()
            .execute(|| async { Err(io::Error::other("failed")) })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_non_retryable());
        assert_eq!(observer.attempt_starts(), 1);
        assert_eq!(observer.cancellations(), 1);
        assert_eq!(observer.exhaustions(), 0);
    }

    #[tokio::test]
    async fn test_non_retryable_predicate_stops_loop() {
        let observer = Arc::new(StatsObserver::new());
        let predicate = crate::retry::ClosurePredicate::new(|err: &io::Error| {
            err.kind() != io::ErrorKind::NotFound
        });

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(test_policy(5))
            .with_predicate(predicate)
            .with_observer(observer.clone())
            .build()
            .execute(|| async { Err(io::Error::new(io::ErrorKind::NotFound, "not found")) })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_non_retryable());
        assert_eq!(observer.attempt_starts(), 1);
        assert_eq!(observer.cancellations(), 1);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_still_attempts_once() {
        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(test_policy(0))
            .build()
            .execute(|| async { Err(io::Error::other("error")) })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_during_backoff_aborts() {
        let token = CancellationToken::new();
        let observer = Arc::new(StatsObserver::new());

        let policy = RetryPolicy {
            enabled: true,
            max_attempts: 5,
            backoff_ms: vec![5_000], // long enough to be mid-sleep when cancelled
        };

        let executor = RetryExecutorBuilder::new()
            .with_policy(policy)
            .with_observer(observer.clone())
            .with_cancellation(token.clone())
            .build();

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let started = Instant::now();
        let result: Result<&str, RetryError<io::Error>> = executor
            .execute(|| async { Err(io::Error::other("failed")) })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.attempts(), 1);
        assert_eq!(observer.attempt_starts(), 1);
        // The loop must abort the sleep, not serve it out.
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_prevents_first_attempt() {
        let token = CancellationToken::new();
        token.cancel();
        let observer = Arc::new(StatsObserver::new());

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(test_policy(3))
            .with_observer(observer.clone())
            .with_cancellation(token)
            .build()
            .execute(|| async { Ok("never runs") })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.attempts(), 0);
        assert_eq!(observer.attempt_starts(), 0);
    }
}

//! Integration tests for the retry module
//!
//! These tests exercise the complete execution flow: policy normalization,
//! backoff schedule timing, predicates, observers, and cancellation.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::retry::{
    ClosurePredicate, RetryError, RetryExecutorBuilder, StatsObserver, TracingObserver,
};
use crate::types::RetryPolicy;

fn failing_op() -> impl FnMut() -> std::future::Ready<Result<&'static str, io::Error>> {
    || std::future::ready(Err(io::Error::new(io::ErrorKind::TimedOut, "unreachable")))
}

#[tokio::test(start_paused = true)]
async fn test_backoff_schedule_is_honored_exactly() {
    // Policy from the reference scenario: 2 retries, sleeps of 10ms and 20ms.
    let policy = RetryPolicy {
        enabled: true,
        max_attempts: 2,
        backoff_ms: vec![10, 20],
    };
    let observer = Arc::new(StatsObserver::new());

    let started = tokio::time::Instant::now();
    let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(policy)
        .with_observer(observer.clone())
        .build()
        .execute(failing_op())
        .await;

    let err = result.unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(err.attempts(), 3);
    assert_eq!(observer.attempt_starts(), 3);
    // Two sleeps: 10ms + 20ms of (virtual) time, nothing more.
    assert_eq!(started.elapsed(), Duration::from_millis(30));
}

#[tokio::test(start_paused = true)]
async fn test_padded_schedule_reuses_last_duration() {
    let policy = RetryPolicy {
        enabled: true,
        max_attempts: 4,
        backoff_ms: vec![10, 20],
    };

    let started = tokio::time::Instant::now();
    let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(policy)
        .build()
        .execute(failing_op())
        .await;

    assert!(result.unwrap_err().is_exhausted());
    // 10 + 20 + 20 + 20: the tail entries repeat the last configured value.
    assert_eq!(started.elapsed(), Duration::from_millis(70));
}

#[tokio::test]
async fn test_last_attempt_failure_is_surfaced() {
    let attempts = Arc::new(AtomicU32::new(0));
    let attempts_clone = attempts.clone();

    let policy = RetryPolicy {
        enabled: true,
        max_attempts: 2,
        backoff_ms: vec![1],
    };

    let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(policy)
        .build()
        .execute(|| {
            let attempts = attempts_clone.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                Err(io::Error::other(format!("failure #{}", n)))
            }
        })
        .await;

    let err = result.unwrap_err();
    // Only the final attempt's failure comes back, never an aggregate.
    assert!(err.to_string().contains("failure #3"));
}

#[tokio::test]
async fn test_predicate_sees_every_failure() {
    let seen = Arc::new(AtomicU32::new(0));
    let seen_clone = seen.clone();
    let predicate = ClosurePredicate::new(move |_: &io::Error| {
        seen_clone.fetch_add(1, Ordering::SeqCst);
        true
    });

    let policy = RetryPolicy {
        enabled: true,
        max_attempts: 2,
        backoff_ms: vec![1],
    };

    let _: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(policy)
        .with_predicate(predicate)
        .build()
        .execute(failing_op())
        .await;

    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_tracing_observer_does_not_disturb_flow() {
    let policy = RetryPolicy {
        enabled: true,
        max_attempts: 1,
        backoff_ms: vec![1],
    };

    let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(policy)
        .with_observer(TracingObserver::new("test-op"))
        .build()
        .execute(|| async { Ok("fine") })
        .await;

    assert_eq!(result.unwrap(), "fine");
}

#[tokio::test]
async fn test_cancellation_between_attempts_reports_last_error() {
    let token = CancellationToken::new();

    let policy = RetryPolicy {
        enabled: true,
        max_attempts: 3,
        backoff_ms: vec![10_000],
    };

    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(policy)
        .with_cancellation(token)
        .build()
        .execute(failing_op())
        .await;

    match result.unwrap_err() {
        RetryError::Cancelled {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 1);
            assert!(last_error.is_some());
        }
        other => panic!("expected Cancelled, got {}", other),
    }
}

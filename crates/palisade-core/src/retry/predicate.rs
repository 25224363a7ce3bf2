//! Retryability predicates
//!
//! A predicate decides whether a given failure is worth another attempt.
//! The retry loop consults it before sleeping; a `false` answer surfaces the
//! failure immediately as non-retryable.

/// A predicate that determines whether a failure should be retried
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    /// Determine whether the given failure should be retried
    fn should_retry(&self, error: &E) -> bool;
}

/// A predicate that retries every failure
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E: ?Sized> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// A predicate backed by a closure
///
/// # Example
///
/// ```rust
/// use palisade_core::retry::{ClosurePredicate, RetryPredicate};
/// use std::io::{Error, ErrorKind};
///
/// let predicate = ClosurePredicate::new(|err: &Error| {
///     !matches!(err.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied)
/// });
///
/// assert!(predicate.should_retry(&Error::new(ErrorKind::TimedOut, "timeout")));
/// assert!(!predicate.should_retry(&Error::new(ErrorKind::NotFound, "gone")));
/// ```
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    /// Create a new closure-based predicate
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E, F> RetryPredicate<E> for ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

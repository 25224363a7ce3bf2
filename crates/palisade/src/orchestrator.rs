//! Retry/backoff orchestrator
//!
//! The control loop that turns one logical call into one-or-more physical
//! attempts. Classification rules:
//!
//! - any response with status < 500 is a terminal success of the retry
//!   engine, 4xx included; callers inspect the status themselves;
//! - a transport error and a >= 500 response are retried identically, with
//!   the transport error taking priority when both would apply;
//! - a breaker fast-fail is terminal: no transport call happened and none
//!   will, so backing off and re-asking the open breaker would only delay
//!   the caller;
//! - on exhaustion the last attempt's outcome is surfaced: a final 5xx
//!   comes back as a response, a final transport error as an error.
//!
//! Attempts are strictly sequential, never parallel probes.

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use palisade_core::breaker::{BoxError, BreakerError, BreakerFuture, CircuitBreaker};
use palisade_core::retry::{ClosurePredicate, RetryError, RetryExecutorBuilder, TracingObserver};
use palisade_core::types::RetryPolicy;

use crate::error::HttpClientError;
use crate::executor::AttemptExecutor;
use crate::transport::{HttpResponse, RequestIntent, TransportError};

/// Outcome of one failed physical attempt
#[derive(Debug)]
enum AttemptFailure {
    /// The transport itself failed; no usable response exists
    Transport(TransportError),
    /// The transport succeeded but the upstream answered with status >= 500;
    /// the response is kept so exhaustion can surface it unchanged
    Server(HttpResponse),
    /// The circuit breaker fast-failed without invoking the transport
    BreakerOpen { operation: String },
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Transport(err) => write!(f, "{}", err),
            AttemptFailure::Server(response) => {
                write!(f, "upstream returned status {}", response.status().as_u16())
            }
            AttemptFailure::BreakerOpen { operation } => {
                write!(f, "circuit breaker is open for operation '{}'", operation)
            }
        }
    }
}

pub(crate) struct Orchestrator {
    executor: AttemptExecutor,
    breaker: Option<Arc<dyn CircuitBreaker>>,
}

impl Orchestrator {
    pub(crate) fn new(executor: AttemptExecutor, breaker: Option<Arc<dyn CircuitBreaker>>) -> Self {
        Self { executor, breaker }
    }

    /// Run the full retry loop for one logical call
    pub(crate) async fn run(
        &self,
        intent: RequestIntent,
        policy: RetryPolicy,
        cancellation: Option<CancellationToken>,
    ) -> Result<HttpResponse, HttpClientError> {
        let operation = intent.operation.clone();

        let mut builder = RetryExecutorBuilder::new()
            .with_policy(policy)
            .with_predicate(ClosurePredicate::new(|failure: &AttemptFailure| {
                !matches!(failure, AttemptFailure::BreakerOpen { .. })
            }))
            .with_observer(TracingObserver::new(operation.clone()));
        if let Some(token) = cancellation {
            builder = builder.with_cancellation(token);
        }

        let result = builder.build().execute(|| self.attempt(&intent)).await;

        match result {
            Ok(response) => Ok(response),
            Err(RetryError::Cancelled { attempts, .. }) => Err(HttpClientError::Cancelled {
                operation,
                attempts,
            }),
            Err(RetryError::Exhausted { source, .. }) | Err(RetryError::NonRetryable(source)) => {
                match source {
                    // A 5xx on the final attempt is a response, not an error.
                    AttemptFailure::Server(response) => Ok(response),
                    AttemptFailure::Transport(source) => {
                        Err(HttpClientError::Transport { operation, source })
                    }
                    AttemptFailure::BreakerOpen { operation } => {
                        Err(HttpClientError::BreakerOpen { operation })
                    }
                }
            }
        }
    }

    /// One classified attempt: success below 500, failure otherwise
    async fn attempt(&self, intent: &RequestIntent) -> Result<HttpResponse, AttemptFailure> {
        let response = self.guarded_send(intent).await?;
        if response.status().as_u16() >= 500 {
            Err(AttemptFailure::Server(response))
        } else {
            Ok(response)
        }
    }

    /// One physical send, through the breaker when one is present and enabled
    async fn guarded_send(&self, intent: &RequestIntent) -> Result<HttpResponse, AttemptFailure> {
        let breaker = match &self.breaker {
            Some(breaker) if breaker.is_enabled() => breaker,
            // Absent or disabled: the breaker is purely additive, the call
            // goes straight to the attempt executor.
            _ => {
                return self
                    .executor
                    .send_once(intent)
                    .await
                    .map_err(AttemptFailure::Transport);
            }
        };

        // The breaker contract only carries a success/failure signal; the
        // actual attempt result is handed back through this slot.
        let slot: Mutex<Option<Result<HttpResponse, TransportError>>> = Mutex::new(None);
        let action: BreakerFuture<'_> = Box::pin(async {
            let result = self.executor.send_once(intent).await;
            let signal: Result<(), BoxError> = match &result {
                // Transport errors take priority over status classification.
                Err(err) => Err(Box::new(HttpClientError::transport(
                    intent.operation.as_str(),
                    TransportError::connection(err.to_string()),
                )) as BoxError),
                Ok(response) if response.status().as_u16() >= 500 => {
                    Err(Box::new(HttpClientError::server_status(
                        intent.operation.as_str(),
                        response.status().as_u16(),
                    )) as BoxError)
                }
                Ok(_) => Ok(()),
            };
            if let Ok(mut guard) = slot.lock() {
                *guard = Some(result);
            }
            signal
        });

        // The client's fallback is a no-op pass-through.
        let passthrough: &(dyn Fn(BoxError) -> BoxError + Send + Sync) = &|err| err;

        let breaker_outcome = breaker
            .execute(&intent.operation, action, passthrough)
            .await;

        let stored = match slot.into_inner() {
            Ok(stored) => stored,
            Err(poisoned) => poisoned.into_inner(),
        };

        match breaker_outcome {
            Err(BreakerError::Open { operation }) => Err(AttemptFailure::BreakerOpen { operation }),
            // Success or a recorded action failure: the slot holds the
            // attempt result either way.
            Ok(()) | Err(BreakerError::Action(_)) => match stored {
                Some(result) => result.map_err(AttemptFailure::Transport),
                None => Err(AttemptFailure::Transport(TransportError::connection(
                    "breaker returned without executing the attempt",
                ))),
            },
        }
    }
}

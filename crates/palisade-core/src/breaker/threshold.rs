//! Default consecutive-failure circuit breaker
//!
//! State machine per operation:
//!
//! ```text
//! Closed → Open: consecutive failures reach the threshold
//! Open → Half-Open: after the recovery timeout, one probe is allowed
//! Half-Open → Closed: the probe succeeds
//! Half-Open → Open: the probe fails
//! ```
//!
//! While a half-open probe is in flight, every other call fails fast; a
//! recovering upstream is never hammered with more than one request.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{BreakerError, BreakerFuture, CircuitBreaker, FallbackFn};

/// Settings for one breaker command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ThresholdSettings {
    /// Consecutive failures that trip the circuit
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// How long the circuit stays open before a half-open probe is allowed,
    /// in milliseconds
    #[serde(default = "default_recovery_timeout_ms")]
    pub recovery_timeout_ms: u64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            recovery_timeout_ms: default_recovery_timeout_ms(),
        }
    }
}

fn default_failure_threshold() -> u32 {
    5
}
fn default_recovery_timeout_ms() -> u64 {
    1000
}

impl ThresholdSettings {
    fn recovery_timeout(&self) -> Duration {
        Duration::from_millis(self.recovery_timeout_ms)
    }
}

/// Observable phase of one command's circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Requests pass through; failures are being counted
    Closed,
    /// Requests fail fast
    Open,
    /// One probe request is testing whether the upstream recovered
    HalfOpen,
}

#[derive(Debug)]
enum CommandState {
    Closed { consecutive_failures: u32 },
    Open { since: Instant },
    HalfOpen,
}

impl CommandState {
    fn phase(&self) -> Phase {
        match self {
            CommandState::Closed { .. } => Phase::Closed,
            CommandState::Open { .. } => Phase::Open,
            CommandState::HalfOpen => Phase::HalfOpen,
        }
    }
}

/// A circuit breaker that opens after a run of consecutive failures
///
/// State is tracked per operation name, so one misbehaving route never
/// trips the circuit for unrelated routes. The breaker guards its own
/// statistics with an internal lock; callers take none.
pub struct ThresholdBreaker {
    enabled: bool,
    defaults: ThresholdSettings,
    overrides: HashMap<String, ThresholdSettings>,
    commands: Mutex<HashMap<String, CommandState>>,
}

impl ThresholdBreaker {
    /// Create an enabled breaker with the given default settings
    pub fn new(defaults: ThresholdSettings) -> Self {
        Self {
            enabled: true,
            defaults,
            overrides: HashMap::new(),
            commands: Mutex::new(HashMap::new()),
        }
    }

    /// Create a breaker that reports itself disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            defaults: ThresholdSettings::default(),
            overrides: HashMap::new(),
            commands: Mutex::new(HashMap::new()),
        }
    }

    /// Override settings for one operation name
    pub fn with_command(mut self, operation: impl Into<String>, settings: ThresholdSettings) -> Self {
        self.overrides.insert(operation.into(), settings);
        self
    }

    /// Current phase of the named operation's circuit
    pub async fn phase(&self, operation: &str) -> Phase {
        let commands = self.commands.lock().await;
        commands
            .get(operation)
            .map(CommandState::phase)
            .unwrap_or(Phase::Closed)
    }

    fn settings_for(&self, operation: &str) -> &ThresholdSettings {
        self.overrides.get(operation).unwrap_or(&self.defaults)
    }

    /// Gate one call: pass, or fail fast. May move an expired open circuit
    /// to half-open, in which case this caller becomes the probe.
    async fn admit(&self, operation: &str) -> Result<(), BreakerError> {
        let settings = self.settings_for(operation);
        let mut commands = self.commands.lock().await;
        let state = commands
            .entry(operation.to_string())
            .or_insert(CommandState::Closed {
                consecutive_failures: 0,
            });

        match state {
            CommandState::Closed { .. } => Ok(()),
            CommandState::Open { since } => {
                if since.elapsed() >= settings.recovery_timeout() {
                    *state = CommandState::HalfOpen;
                    tracing::debug!(operation, "circuit half-open, probing");
                    Ok(())
                } else {
                    Err(BreakerError::Open {
                        operation: operation.to_string(),
                    })
                }
            }
            // A probe is already in flight.
            CommandState::HalfOpen => Err(BreakerError::Open {
                operation: operation.to_string(),
            }),
        }
    }

    async fn record_success(&self, operation: &str) {
        let mut commands = self.commands.lock().await;
        if let Some(state) = commands.get_mut(operation) {
            if matches!(state, CommandState::HalfOpen) {
                tracing::info!(operation, "circuit closed after successful probe");
            }
            *state = CommandState::Closed {
                consecutive_failures: 0,
            };
        }
    }

    async fn record_failure(&self, operation: &str) {
        let settings = self.settings_for(operation);
        let mut commands = self.commands.lock().await;
        let state = commands
            .entry(operation.to_string())
            .or_insert(CommandState::Closed {
                consecutive_failures: 0,
            });

        match state {
            CommandState::Closed {
                consecutive_failures,
            } => {
                *consecutive_failures += 1;
                if *consecutive_failures >= settings.failure_threshold {
                    tracing::warn!(
                        operation,
                        failures = *consecutive_failures,
                        "circuit opened"
                    );
                    *state = CommandState::Open {
                        since: Instant::now(),
                    };
                }
            }
            CommandState::HalfOpen => {
                tracing::warn!(operation, "probe failed, circuit re-opened");
                *state = CommandState::Open {
                    since: Instant::now(),
                };
            }
            CommandState::Open { .. } => {}
        }
    }
}

#[async_trait]
impl CircuitBreaker for ThresholdBreaker {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn execute(
        &self,
        operation: &str,
        action: BreakerFuture<'_>,
        fallback: FallbackFn<'_>,
    ) -> Result<(), BreakerError> {
        self.admit(operation).await?;

        match action.await {
            Ok(()) => {
                self.record_success(operation).await;
                Ok(())
            }
            Err(err) => {
                self.record_failure(operation).await;
                Err(BreakerError::Action(fallback(err)))
            }
        }
    }
}

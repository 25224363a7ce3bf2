//! Client configuration
//!
//! The whole configuration surface is supplied at construction time: default
//! content type, per-attempt timeout, retry policies with per-route
//! overrides, circuit-breaker settings, and feature toggles for the tracer
//! and recorder collaborators. There is no hot reload.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use palisade_core::breaker::{ThresholdBreaker, ThresholdSettings};
use palisade_core::types::RetryPolicies;

use crate::error::{HttpClientError, Result};

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Content type set on write verbs before caller headers are applied
    #[serde(default = "default_content_type")]
    pub default_content_type: String,

    /// Per-attempt request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// User agent string for outgoing requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Retry policies: client-wide default plus per-route overrides
    #[serde(default)]
    pub retry: RetryPolicies,

    /// Circuit-breaker settings
    #[serde(default)]
    pub breaker: BreakerConfig,

    /// Whether attempts are annotated with client spans
    #[serde(default = "default_true")]
    pub tracing_enabled: bool,

    /// Whether attempts are timed by the call recorder
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_content_type: default_content_type(),
            request_timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
            retry: RetryPolicies::default(),
            breaker: BreakerConfig::default(),
            tracing_enabled: default_true(),
            metrics_enabled: default_true(),
        }
    }
}

fn default_content_type() -> String {
    "application/json".to_string()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_user_agent() -> String {
    format!(
        "palisade/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
fn default_true() -> bool {
    true
}

impl ClientConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HttpClientError::config(format!(
                    "configuration file not found: {}",
                    path.as_ref().display()
                ))
            } else {
                HttpClientError::ConfigIo(e)
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Default per-attempt timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Circuit-breaker configuration
///
/// Disabled by default: the breaker is purely additive, never a required
/// dependency. Commands are keyed by operation name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BreakerConfig {
    /// Whether the built-in threshold breaker guards calls
    #[serde(default)]
    pub enabled: bool,

    /// Default settings for operations without a command entry
    #[serde(default)]
    pub default: ThresholdSettings,

    /// Per-operation setting overrides
    #[serde(default)]
    pub commands: HashMap<String, ThresholdSettings>,
}

impl BreakerConfig {
    /// Build the configured threshold breaker
    pub fn build_breaker(&self) -> ThresholdBreaker {
        let mut breaker = ThresholdBreaker::new(self.default.clone());
        for (operation, settings) in &self.commands {
            breaker = breaker.with_command(operation.clone(), settings.clone());
        }
        breaker
    }
}

//! Retry policy configuration types
//!
//! A `RetryPolicy` describes how one logical call may be re-attempted: whether
//! retries are enabled at all, how many retries follow the first attempt, and
//! the backoff schedule applied between attempts. `RetryPolicies` holds a
//! client-wide default plus per-route overrides keyed by `"[METHOD]::/path"`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Retry policy for an operation
///
/// The backoff schedule is configured as a sequence of millisecond durations.
/// After [`RetryPolicy::normalized`] the schedule is guaranteed to contain at
/// least `max_attempts` entries, so the retry loop can index it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Whether the retry loop runs at all for this operation
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum number of retries after the first attempt
    ///
    /// A call makes `max_attempts + 1` physical attempts in total: the first
    /// attempt is unconditional, then up to `max_attempts` retries.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff durations in milliseconds, indexed by retry number
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: Vec<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_enabled() -> bool {
    true
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_ms() -> Vec<u64> {
    vec![100, 200, 1000]
}

/// Fallback backoff used when a schedule must be synthesized from nothing
const DEFAULT_BACKOFF: Duration = Duration::from_millis(100);

impl RetryPolicy {
    /// A policy that never retries
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            max_attempts: 0,
            backoff_ms: Vec::new(),
        }
    }

    /// Normalize the backoff schedule against `max_attempts`
    ///
    /// - An empty schedule is filled with a fixed default duration repeated
    ///   `max_attempts` times.
    /// - A schedule shorter than `max_attempts` is padded by repeating its
    ///   last entry.
    ///
    /// Invariant after normalization: `backoff_ms.len() >= max_attempts`.
    pub fn normalized(mut self) -> Self {
        let wanted = self.max_attempts as usize;
        match self.backoff_ms.last().copied() {
            None => self.backoff_ms = vec![DEFAULT_BACKOFF.as_millis() as u64; wanted],
            Some(last) if self.backoff_ms.len() < wanted => self.backoff_ms.resize(wanted, last),
            Some(_) => {}
        }
        self
    }

    /// Backoff delay before retry number `retry_index` (0-indexed)
    ///
    /// Falls back to the default duration if the schedule was not normalized.
    pub fn delay(&self, retry_index: usize) -> Duration {
        self.backoff_ms
            .get(retry_index)
            .map(|ms| Duration::from_millis(*ms))
            .unwrap_or(DEFAULT_BACKOFF)
    }

    /// Total number of physical attempts this policy allows
    pub fn total_attempts(&self) -> u32 {
        if self.enabled {
            self.max_attempts + 1
        } else {
            1
        }
    }
}

/// Compose the route lookup key for a method and URL path
///
/// Format: `"[GET]::/users/profile"`. Operation grouping for retry overrides
/// uses the URL path only, never the full URL, to keep keys low-cardinality.
pub fn route_key(method: &str, path: &str) -> String {
    format!("[{}]::{}", method.to_uppercase(), path)
}

/// Client-wide retry configuration: a default policy plus per-route overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicies {
    /// Default retry policy applied when no route override matches
    #[serde(default)]
    pub default: RetryPolicy,

    /// Per-route retry policies keyed by `"[METHOD]::/path"`
    #[serde(default)]
    pub routes: HashMap<String, RetryPolicy>,
}

impl RetryPolicies {
    /// Resolve the effective retry policy for a method and URL path
    ///
    /// Exact-match route lookup, falling back to the default policy. The
    /// returned policy is always normalized; absent overrides are not an
    /// error.
    pub fn resolve(&self, method: &str, path: &str) -> RetryPolicy {
        let key = route_key(method, path);
        self.routes
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
            .normalized()
    }
}

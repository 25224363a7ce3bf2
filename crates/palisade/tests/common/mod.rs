//! Common test infrastructure for palisade tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `mock_server`: Wiremock setup helpers for upstream endpoints
//! - `transports`: Scripted transport doubles with call counters

// Allow unused code in test infrastructure - not every binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_server;
pub mod transports;

pub use mock_server::*;
pub use transports::*;

use palisade::{ClientConfig, HttpClient, RetryPolicy};

/// Install a test subscriber so `RUST_LOG`-style filtering works in tests
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A retry policy with short backoff delays for tests
pub fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        enabled: true,
        max_attempts,
        backoff_ms: vec![1],
    }
}

/// A client whose default retry policy is the given one
pub fn client_with_policy(policy: RetryPolicy) -> HttpClient {
    let mut config = ClientConfig::default();
    config.retry.default = policy;
    HttpClient::new(config).expect("client construction")
}

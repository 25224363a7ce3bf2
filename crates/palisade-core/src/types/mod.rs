//! Type definitions for retry policies and per-route overrides

mod policy;

pub use policy::{route_key, RetryPolicies, RetryPolicy};

//! Mock server helpers for client testing
//!
//! Provides utilities for setting up wiremock servers with the response
//! patterns the retry and breaker tests need.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Set up a GET endpoint that always returns 200 with the given body
pub async fn mock_ok_endpoint(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Set up a GET endpoint that fails N times before succeeding
///
/// First `fail_count` requests return `fail_status`, subsequent requests
/// return 200 with the given body.
pub async fn mock_flaky_endpoint(
    server: &MockServer,
    route: &str,
    fail_status: u16,
    fail_count: u64,
    body: &str,
) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(fail_status))
        .up_to_n_times(fail_count)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Set up a GET endpoint that always returns the given status
pub async fn mock_status_endpoint(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Set up a GET endpoint that answers 200 only after the given delay
pub async fn mock_slow_endpoint(server: &MockServer, route: &str, delay: std::time::Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_delay(delay))
        .mount(server)
        .await;
}

/// Number of requests the server has received so far
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

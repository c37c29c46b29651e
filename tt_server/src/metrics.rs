//! Prometheus metrics.
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter, so the
//! helpers are safe to call when metrics are disabled.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tt_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/auth/login", 200);
//! metrics::match_transitions_total("start");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus exporter.
///
/// Metrics are served at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record an HTTP request.
///
/// `path` should be the matched route template to keep label cardinality bounded.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Domain Metrics
// ============================================================================

/// Record an applied match status transition.
pub fn match_transitions_total(action: &str) {
    metrics::counter!("match_transitions_total", "action" => action.to_string()).increment(1);
}

/// Record the outcome of a registration attempt (`accepted`, `rejected`, `error`).
pub fn registration_outcomes_total(outcome: &str) {
    metrics::counter!("registration_outcomes_total", "outcome" => outcome.to_string())
        .increment(1);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Record a login attempt.
pub fn login_attempts_total(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("login_attempts_total", "result" => result).increment(1);
}

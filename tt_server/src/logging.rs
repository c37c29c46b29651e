//! Structured logging setup.
//!
//! Library crates log through the `log` facade; the subscriber installed here
//! picks those records up alongside the server's own `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize the global subscriber
///
/// Log levels are configurable through `RUST_LOG`.
///
/// # Example
///
/// ```no_run
/// use tt_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a security-relevant event such as a failed login
///
/// # Example
///
/// ```
/// use tt_server::logging::log_security_event;
///
/// log_security_event("failed_login", None, Some("curl/8.0"), "Incorrect email or password");
/// ```
pub fn log_security_event(
    event_type: &str,
    player_id: Option<i64>,
    client: Option<&str>,
    message: &str,
) {
    tracing::warn!(
        event_type = event_type,
        player_id = player_id,
        client = client,
        "SECURITY: {}",
        message
    );
}

/// Log a completed API request
///
/// Requests slower than a second are raised to a warning.
pub fn log_api_request(
    request_id: &str,
    method: &str,
    path: &str,
    status_code: u16,
    duration_ms: u64,
) {
    if duration_ms > 1000 {
        tracing::warn!(
            request_id = request_id,
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "Slow API request"
        );
    } else {
        tracing::info!(
            request_id = request_id,
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_security_event() {
        log_security_event("test_event", Some(1), Some("test-agent"), "Test message");
        log_security_event("failed_login", None, None, "Unknown email");
    }

    #[test]
    fn test_log_api_request() {
        log_api_request("req-1", "GET", "/api/v1/tournaments", 200, 45);
        log_api_request("req-2", "POST", "/api/v1/auth/login", 401, 1200);
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}

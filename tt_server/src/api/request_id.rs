//! Request ID middleware for log correlation.
//!
//! Also records per-request timing and the HTTP metrics.

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

use crate::{logging, metrics};

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reuse the caller's request ID or generate a fresh one
fn get_or_generate_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Tag the request and response with a request ID and log the exchange
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use tt_server::api::request_id::request_id_middleware;
///
/// let app: Router = Router::new()
///     .route("/", get(|| async { "Hello" }))
///     .layer(middleware::from_fn(request_id_middleware));
/// ```
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let started = Instant::now();
    let request_id = get_or_generate_request_id(request.headers());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let method = request.method().to_string();
    // Route template, so metric labels stay bounded
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        uri = %request.uri(),
        "Request started"
    );

    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, header_value);
    }

    let elapsed = started.elapsed();
    let status = parts.status.as_u16();
    logging::log_api_request(
        &request_id,
        &method,
        &path,
        status,
        elapsed.as_millis() as u64,
    );
    metrics::http_requests_total(&method, &path, status);
    metrics::http_request_duration_ms(&method, &path, elapsed.as_secs_f64() * 1000.0);

    Response::from_parts(parts, body)
}

/// Request ID stored in request extensions
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Axum extractor for request ID
impl<S> axum::extract::FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestId>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Request ID not found in extensions",
        ))
    }
}

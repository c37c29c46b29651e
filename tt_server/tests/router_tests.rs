//! Router tests that need no database.
//!
//! The state is built over a lazy pool pointing at an unreachable address, so
//! only paths that are decided before touching storage are exercised here.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use tennis_tournament::AdmissionPolicy;
use tower::ServiceExt;
use tt_server::api::{AppState, create_router, error::ErrorResponse, request_id::REQUEST_ID_HEADER};
use tt_server::config::SecurityConfig;

const ORIGIN: &str = "http://localhost:3000";

fn security() -> SecurityConfig {
    SecurityConfig {
        jwt_secret: "router_test_jwt_secret_0123456789abcdef".to_string(),
        password_pepper: "router_test_pepper".to_string(),
        access_token_minutes: 15,
        refresh_token_days: 1,
    }
}

fn app() -> axum::Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(500))
        .connect_lazy("postgres://postgres@127.0.0.1:1/unreachable")
        .expect("lazy pool");
    let state = AppState::new(pool, &security(), AdmissionPolicy::default());
    create_router(state, &[ORIGIN.to_string()])
}

async fn error_body(response: axum::response::Response) -> ErrorResponse {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("error body")
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/players/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = error_body(response).await;
    assert_eq!(body.error, "Could not validate credentials");
}

#[tokio::test]
async fn test_malformed_token_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/tournaments")
                .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/matches/1/status")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action": "start"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_reports_unavailable_database() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["database"], false);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/players")
                .header(REQUEST_ID_HEADER, "trace-me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "trace-me");
}

#[tokio::test]
async fn test_request_id_generated_when_absent() {
    let response = app()
        .oneshot(Request::builder().uri("/api/v1/players").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_register_rejects_weak_password_before_storage() {
    let body = serde_json::json!({
        "email": "weak@example.com",
        "password": "short",
        "first_name": "Weak",
        "last_name": "Password",
    });

    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(response).await;
    assert!(body.error.starts_with("Password too weak"));
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let body = serde_json::json!({
        "email": "not-an-email",
        "password": "Baseline123",
        "first_name": "No",
        "last_name": "Domain",
    });

    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/v1/tournaments")
                .header(header::ORIGIN, ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        ORIGIN
    );
}

#[tokio::test]
async fn test_cors_ignores_unknown_origin() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/v1/tournaments")
                .header(header::ORIGIN, "http://evil.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

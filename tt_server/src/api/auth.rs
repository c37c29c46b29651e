//! Authentication API handlers.
//!
//! Register:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "rafa@example.com", "password": "SecurePass123", "first_name": "Rafa", "last_name": "Clay"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "rafa@example.com", "password": "SecurePass123"}'
//! ```

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
};
use serde::{Deserialize, Serialize};
use tennis_tournament::auth::{AuthError, LoginRequest, RegisterRequest, SessionTokens};
use tennis_tournament::{DomainError, ErrorKind, Player};

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl From<SessionTokens> for TokenResponse {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "bearer".to_string(),
            expires_in: tokens.expires_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Sessions are bound to the client that created them
fn device_fingerprint(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Credential failures answer 401 rather than the generic 403
fn auth_failure(err: AuthError) -> ApiError {
    if err.kind() == ErrorKind::Unauthorized {
        ApiError::new(StatusCode::UNAUTHORIZED, err.client_message())
    } else {
        err.into()
    }
}

/// Create a player account.
///
/// # Errors
///
/// - `400 Bad Request`: Email already registered, invalid email, weak password
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Player>)> {
    let player = state.auth_manager.register(payload).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// Exchange email and password for a token pair.
///
/// # Errors
///
/// - `401 Unauthorized`: Incorrect email or password, or inactive account
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let fingerprint = device_fingerprint(&headers);

    match state.auth_manager.login(payload, fingerprint.clone()).await {
        Ok((player, tokens)) => {
            metrics::login_attempts_total(true);
            tracing::info!(player_id = player.id, "Player logged in");
            Ok(Json(tokens.into()))
        }
        Err(err) => {
            metrics::login_attempts_total(false);
            logging::log_security_event(
                "failed_login",
                None,
                Some(&fingerprint),
                &err.to_string(),
            );
            Err(auth_failure(err))
        }
    }
}

/// Rotate a refresh token.
///
/// The presented token is consumed; the response carries a fresh pair.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RefreshPayload>,
) -> ApiResult<Json<TokenResponse>> {
    let tokens = state
        .auth_manager
        .refresh_token(payload.refresh_token, device_fingerprint(&headers))
        .await
        .map_err(auth_failure)?;

    Ok(Json(tokens.into()))
}

/// Invalidate a refresh token.
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> ApiResult<Json<MessageResponse>> {
    state.auth_manager.logout(payload.refresh_token).await?;

    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_device_fingerprint() {
        let mut headers = HeaderMap::new();
        assert_eq!(device_fingerprint(&headers), "unknown");

        headers.insert(USER_AGENT, HeaderValue::from_static("courtside/1.0"));
        assert_eq!(device_fingerprint(&headers), "courtside/1.0");
    }

    #[test]
    fn test_credential_failures_are_401() {
        assert_eq!(
            auth_failure(AuthError::InvalidCredentials).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            auth_failure(AuthError::InvalidRefreshToken).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            auth_failure(AuthError::EmailTaken).status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_token_response_type() {
        let response = TokenResponse::from(SessionTokens {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 900,
        });
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.expires_in, 900);
    }
}

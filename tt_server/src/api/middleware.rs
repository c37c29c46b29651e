//! Authentication middleware for protected endpoints.
//!
//! Validates the bearer access token, loads the player and injects their
//! [`PlayerId`] into request extensions for downstream handlers:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use tennis_tournament::PlayerId;
//!
//! async fn protected_handler(Extension(player_id): Extension<PlayerId>) -> String {
//!     format!("Authenticated as player {}", player_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::header::{AUTHORIZATION, USER_AGENT},
    middleware::Next,
    response::Response,
};
use tennis_tournament::{PlayerId, player::PlayerError};

use super::AppState;
use super::error::ApiError;
use crate::logging;

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub(crate) fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reject the request with 401 unless it carries a valid token for an active player.
///
/// - **Missing or malformed header**: 401
/// - **Invalid or expired token**: 401
/// - **Unknown or inactive player**: 401
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(ApiError::unauthenticated)?;

    let claims = state.auth_manager.verify_access_token(token).map_err(|_| {
        let client = request
            .headers()
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok());
        logging::log_security_event("invalid_token", None, client, "Rejected access token");
        ApiError::unauthenticated()
    })?;

    let player = match state.player_manager.get_player(claims.sub).await {
        Ok(player) => player,
        Err(PlayerError::NotFound(_)) => return Err(ApiError::unauthenticated()),
        Err(err) => return Err(err.into()),
    };

    if !player.is_active {
        logging::log_security_event(
            "inactive_player",
            Some(player.id),
            None,
            "Token presented by inactive player",
        );
        return Err(ApiError::unauthenticated());
    }

    request.extensions_mut().insert::<PlayerId>(player.id);
    Ok(next.run(request).await)
}

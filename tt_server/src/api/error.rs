//! Error responses.
//!
//! Every handler returns [`ApiError`]; library errors convert into it through
//! their [`ErrorKind`], so status codes are decided in one place.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tennis_tournament::{DomainError, ErrorKind};

/// Error body: `{"error": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An HTTP error with a client-safe message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Missing or rejected credentials
    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Could not validate credentials")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

/// HTTP status for an error category
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::PreconditionFailed => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<E> From<E> for ApiError
where
    E: DomainError,
{
    fn from(err: E) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Storage {
            tracing::error!(error = %err, "Storage failure");
        }
        Self::new(status_for(kind), err.client_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tennis_tournament::db::PageError;
    use tennis_tournament::matches::{MatchError, MatchStatus, NotApplicable};
    use tennis_tournament::registration::RegistrationError;
    use tennis_tournament::tournament::AdmissionRejection;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::PreconditionFailed), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::ValidationFailed), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Storage), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_domain_errors_convert() {
        let err: ApiError = MatchError::NotFound(9).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = MatchError::from(NotApplicable {
            action: "start",
            status: MatchStatus::Completed,
        })
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Cannot start a match that is COMPLETED");

        let err: ApiError = RegistrationError::from(AdmissionRejection::RegistrationDisabled).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = PageError::NegativeSkip(-1).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_errors_are_sanitised() {
        let err: ApiError = MatchError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn test_unauthenticated() {
        assert_eq!(ApiError::unauthenticated().status, StatusCode::UNAUTHORIZED);
    }
}

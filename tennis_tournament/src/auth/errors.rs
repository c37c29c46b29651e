//! Authentication error types.

use crate::error::{DomainError, ErrorKind};
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Unknown email or wrong password; the two are not distinguished
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Account has been deactivated
    #[error("Inactive player")]
    InactivePlayer,

    /// Player referenced by a session no longer exists
    #[error("Player not found")]
    PlayerNotFound,

    /// Email already exists
    #[error("Email already registered")]
    EmailTaken,

    /// Invalid email format
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Missing or malformed profile field
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Password too weak
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// JWT token error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Session expired
    #[error("Session expired")]
    SessionExpired,

    /// Invalid refresh token
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
}

impl DomainError for AuthError {
    fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Database(_) | AuthError::HashingFailed => ErrorKind::Storage,
            AuthError::PlayerNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken => ErrorKind::PreconditionFailed,
            AuthError::InvalidEmail(_)
            | AuthError::InvalidProfile(_)
            | AuthError::WeakPassword(_) => ErrorKind::ValidationFailed,
            AuthError::InvalidCredentials
            | AuthError::InactivePlayer
            | AuthError::JwtError(_)
            | AuthError::SessionExpired
            | AuthError::InvalidRefreshToken => ErrorKind::Unauthorized,
        }
    }

    /// Database and JWT errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::HashingFailed => {
                "Internal server error".to_string()
            }
            AuthError::JwtError(_) => "Authentication failed".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

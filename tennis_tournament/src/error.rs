//! Error classification shared by every domain module.
//!
//! Each module keeps its own `thiserror` enum; [`DomainError::kind`] folds them
//! into the small set of outcomes the HTTP layer cares about.

use std::fmt;

/// Coarse outcome category for a domain error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced entity does not exist
    NotFound,
    /// Business rule rejected the operation (wrong state, closed, full, duplicate)
    PreconditionFailed,
    /// Caller may not act on the resource
    Unauthorized,
    /// Malformed or incomplete input
    ValidationFailed,
    /// Storage or other infrastructure fault
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::PreconditionFailed => write!(f, "precondition_failed"),
            ErrorKind::Unauthorized => write!(f, "unauthorized"),
            ErrorKind::ValidationFailed => write!(f, "validation_failed"),
            ErrorKind::Storage => write!(f, "storage"),
        }
    }
}

/// Implemented by every module error so callers can map outcomes uniformly.
pub trait DomainError: std::error::Error {
    /// Category of this error
    fn kind(&self) -> ErrorKind;

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage errors are replaced with a generic message; everything else is
    /// an expected business outcome and safe to show.
    fn client_message(&self) -> String {
        match self.kind() {
            ErrorKind::Storage => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Returns true when the error is a PostgreSQL unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "23505")
}

/// Returns true when the error is a PostgreSQL foreign-key violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "23503")
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    enum SampleError {
        #[error("thing is missing")]
        Missing,
        #[error("Database error: {0}")]
        Database(String),
    }

    impl DomainError for SampleError {
        fn kind(&self) -> ErrorKind {
            match self {
                SampleError::Missing => ErrorKind::NotFound,
                SampleError::Database(_) => ErrorKind::Storage,
            }
        }
    }

    #[test]
    fn test_client_message_hides_storage_details() {
        let err = SampleError::Database("relation \"players\" does not exist".to_string());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_client_message_passes_business_errors() {
        assert_eq!(SampleError::Missing.client_message(), "thing is missing");
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::PreconditionFailed.to_string(), "precondition_failed");
        assert_eq!(ErrorKind::Storage.to_string(), "storage");
    }

    #[test]
    fn test_non_database_error_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_foreign_key_violation(&sqlx::Error::RowNotFound));
    }
}

//! Registration error types.

use super::models::{RegistrationId, RegistrationStatus};
use crate::error::{DomainError, ErrorKind};
use crate::tournament::{AdmissionRejection, TournamentId};
use thiserror::Error;

/// Registration errors
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Registration not found")]
    NotFound(RegistrationId),

    #[error("Tournament not found")]
    TournamentNotFound(TournamentId),

    #[error("Already registered for this tournament")]
    AlreadyRegistered,

    #[error(transparent)]
    Admission(#[from] AdmissionRejection),

    #[error("Registration is {0}, only PENDING registrations can be confirmed")]
    NotPending(RegistrationStatus),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DomainError for RegistrationError {
    fn kind(&self) -> ErrorKind {
        match self {
            RegistrationError::NotFound(_) | RegistrationError::TournamentNotFound(_) => {
                ErrorKind::NotFound
            }
            RegistrationError::AlreadyRegistered
            | RegistrationError::Admission(_)
            | RegistrationError::NotPending(_) => ErrorKind::PreconditionFailed,
            RegistrationError::Database(_) => ErrorKind::Storage,
        }
    }
}

pub type RegistrationResult<T> = Result<T, RegistrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(RegistrationError::NotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            RegistrationError::TournamentNotFound(1).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RegistrationError::AlreadyRegistered.kind(),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(
            RegistrationError::from(AdmissionRejection::RegistrationDisabled).kind(),
            ErrorKind::PreconditionFailed
        );
    }

    #[test]
    fn test_admission_message_passes_through() {
        let err = RegistrationError::from(AdmissionRejection::Full {
            confirmed: 2,
            capacity: 2,
        });
        assert_eq!(err.client_message(), "Tournament is full (2/2 confirmed)");
    }
}

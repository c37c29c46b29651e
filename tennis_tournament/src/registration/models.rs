//! Registration data models.

use super::errors::{RegistrationError, RegistrationResult};
use crate::player::PlayerId;
use crate::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration ID type
pub type RegistrationId = i64;

/// Payment status assigned to new registrations
pub const DEFAULT_PAYMENT_STATUS: &str = "pending";

/// Registration status
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "registration_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Confirmed,
    Waitlisted,
    Cancelled,
    Rejected,
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RegistrationStatus::Pending => "PENDING",
            RegistrationStatus::Confirmed => "CONFIRMED",
            RegistrationStatus::Waitlisted => "WAITLISTED",
            RegistrationStatus::Cancelled => "CANCELLED",
            RegistrationStatus::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// Registration row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Registration {
    pub id: RegistrationId,
    pub player_id: PlayerId,
    pub tournament_id: TournamentId,
    pub status: RegistrationStatus,
    pub registration_date: DateTime<Utc>,
    pub confirmation_date: Option<DateTime<Utc>>,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// PENDING -> CONFIRMED. Capacity is checked by the caller.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> RegistrationResult<()> {
        if self.status != RegistrationStatus::Pending {
            return Err(RegistrationError::NotPending(self.status));
        }
        self.status = RegistrationStatus::Confirmed;
        self.confirmation_date = Some(now);
        Ok(())
    }

    /// Any status -> CANCELLED
    pub fn cancel(&mut self) {
        self.status = RegistrationStatus::Cancelled;
    }
}

/// Registration request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegistration {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Administrative edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationUpdate {
    pub status: Option<RegistrationStatus>,
    pub notes: Option<String>,
    pub payment_status: Option<String>,
    pub payment_reference: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn registration(status: RegistrationStatus) -> Registration {
        let now = Utc::now();
        Registration {
            id: 1,
            player_id: 7,
            tournament_id: 1,
            status,
            registration_date: now,
            confirmation_date: None,
            payment_status: DEFAULT_PAYMENT_STATUS.to_string(),
            payment_reference: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_pending() {
        let now = Utc::now();
        let mut registration = fixtures::registration(RegistrationStatus::Pending);

        registration.confirm(now).unwrap();
        assert_eq!(registration.status, RegistrationStatus::Confirmed);
        assert_eq!(registration.confirmation_date, Some(now));
    }

    #[test]
    fn test_confirm_requires_pending() {
        for status in [
            RegistrationStatus::Confirmed,
            RegistrationStatus::Waitlisted,
            RegistrationStatus::Cancelled,
            RegistrationStatus::Rejected,
        ] {
            let mut registration = fixtures::registration(status);
            let before = registration.clone();

            assert!(matches!(
                registration.confirm(Utc::now()),
                Err(RegistrationError::NotPending(s)) if s == status
            ));
            assert_eq!(registration, before);
        }
    }

    #[test]
    fn test_cancel_from_any_status() {
        for status in [
            RegistrationStatus::Pending,
            RegistrationStatus::Confirmed,
            RegistrationStatus::Cancelled,
            RegistrationStatus::Rejected,
        ] {
            let mut registration = fixtures::registration(status);
            registration.cancel();
            assert_eq!(registration.status, RegistrationStatus::Cancelled);
        }
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&RegistrationStatus::Waitlisted).unwrap(),
            "\"WAITLISTED\""
        );
        assert_eq!(RegistrationStatus::default(), RegistrationStatus::Pending);
    }
}

//! Registration admission rules.
//!
//! Admission is decided from the tournament row and the number of CONFIRMED
//! registrations. Pending registrations do not consume capacity.

use super::models::{Tournament, TournamentStatus};
use crate::error::{DomainError, ErrorKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason a registration was not admitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionRejection {
    #[error("Tournament does not allow registration")]
    RegistrationDisabled,

    #[error("Tournament is not open for registration (status {0})")]
    NotOpen(TournamentStatus),

    #[error("Tournament is full ({confirmed}/{capacity} confirmed)")]
    Full { confirmed: i64, capacity: i64 },

    #[error("Registration deadline passed at {0}")]
    DeadlinePassed(DateTime<Utc>),
}

impl DomainError for AdmissionRejection {
    fn kind(&self) -> ErrorKind {
        ErrorKind::PreconditionFailed
    }
}

/// Tunable admission behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionPolicy {
    /// Reject registrations after `registration_deadline`. Off by default.
    pub enforce_deadline: bool,
}

impl AdmissionPolicy {
    pub fn new(enforce_deadline: bool) -> Self {
        Self { enforce_deadline }
    }

    /// Check whether one more registration may be admitted
    ///
    /// Rules are applied in order: allow flag, status, capacity, deadline.
    pub fn check(
        &self,
        tournament: &Tournament,
        confirmed: i64,
        now: DateTime<Utc>,
    ) -> Result<(), AdmissionRejection> {
        if !tournament.allow_registration {
            return Err(AdmissionRejection::RegistrationDisabled);
        }

        if !tournament.status.accepts_registrations() {
            return Err(AdmissionRejection::NotOpen(tournament.status));
        }

        self.check_capacity(tournament, confirmed)?;

        if self.enforce_deadline
            && let Some(deadline) = tournament.registration_deadline
            && deadline < now
        {
            return Err(AdmissionRejection::DeadlinePassed(deadline));
        }

        Ok(())
    }

    /// Capacity rule alone; also used when confirming a pending registration
    pub fn check_capacity(
        &self,
        tournament: &Tournament,
        confirmed: i64,
    ) -> Result<(), AdmissionRejection> {
        let capacity = i64::from(tournament.max_participants);
        if confirmed >= capacity {
            return Err(AdmissionRejection::Full {
                confirmed,
                capacity,
            });
        }
        Ok(())
    }

    /// Boolean form of [`AdmissionPolicy::check`]
    pub fn can_register(&self, tournament: &Tournament, confirmed: i64, now: DateTime<Utc>) -> bool {
        self.check(tournament, confirmed, now).is_ok()
    }
}

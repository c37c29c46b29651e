//! Match status state machine.
//!
//! ```text
//! SCHEDULED --start--> IN_PROGRESS --complete--> COMPLETED
//!     |                     |
//!     +------forfeit--------+------forfeit-----> FORFEIT
//! ```
//!
//! CANCELLED is only reachable through an administrative update. A failed
//! transition leaves the match untouched.
//!
//! [`Match::forfeit`] itself derives no winner for a player outside the
//! match; callers that persist a forfeit check [`Match::ensure_forfeiter`]
//! first so `forfeit_by` always names a participant.

use super::models::{Match, MatchId, MatchRound, MatchStatus};
use crate::error::{DomainError, ErrorKind};
use crate::player::PlayerId;
use crate::tournament::TournamentId;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// A named status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Start,
    Complete { winner_id: PlayerId },
    Forfeit { player_id: PlayerId },
}

impl StatusAction {
    pub fn name(&self) -> &'static str {
        match self {
            StatusAction::Start => "start",
            StatusAction::Complete { .. } => "complete",
            StatusAction::Forfeit { .. } => "forfeit",
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transition rejected because of the current status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot {action} a match that is {status}")]
pub struct NotApplicable {
    pub action: &'static str,
    pub status: MatchStatus,
}

impl DomainError for NotApplicable {
    fn kind(&self) -> ErrorKind {
        ErrorKind::PreconditionFailed
    }
}

/// Forfeit named a player who is not in the match
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Player {player_id} is not a participant in this match")]
pub struct NotParticipant {
    pub player_id: PlayerId,
}

impl DomainError for NotParticipant {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ValidationFailed
    }
}

impl Match {
    /// A fresh SCHEDULED match
    pub fn scheduled(
        id: MatchId,
        tournament_id: TournamentId,
        round: MatchRound,
        player1_id: PlayerId,
        player2_id: Option<PlayerId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            tournament_id,
            round,
            match_number: None,
            player1_id,
            player2_id,
            status: MatchStatus::Scheduled,
            scheduled_at: None,
            started_at: None,
            completed_at: None,
            winner_id: None,
            forfeit_by: None,
            best_of_sets: 3,
            court_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// SCHEDULED -> IN_PROGRESS
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), NotApplicable> {
        self.require("start", &[MatchStatus::Scheduled])?;
        self.status = MatchStatus::InProgress;
        self.started_at = Some(now);
        Ok(())
    }

    /// IN_PROGRESS -> COMPLETED
    ///
    /// The winner is taken as given; it is not checked against the participants.
    pub fn complete(&mut self, winner_id: PlayerId, now: DateTime<Utc>) -> Result<(), NotApplicable> {
        self.require("complete", &[MatchStatus::InProgress])?;
        self.status = MatchStatus::Completed;
        self.completed_at = Some(now);
        self.winner_id = Some(winner_id);
        Ok(())
    }

    /// SCHEDULED or IN_PROGRESS -> FORFEIT
    ///
    /// When `player_id` is a participant the other participant becomes the
    /// winner (none for a bye); otherwise the winner is left as it was.
    pub fn forfeit(&mut self, player_id: PlayerId, now: DateTime<Utc>) -> Result<(), NotApplicable> {
        self.require("forfeit", &[MatchStatus::Scheduled, MatchStatus::InProgress])?;
        self.status = MatchStatus::Forfeit;
        self.completed_at = Some(now);
        self.forfeit_by = Some(player_id);
        if self.is_participant(player_id) {
            self.winner_id = self.opponent_of(player_id);
        }
        Ok(())
    }

    /// A forfeit must name one of the two participants
    pub fn ensure_forfeiter(&self, action: &StatusAction) -> Result<(), NotParticipant> {
        match *action {
            StatusAction::Forfeit { player_id } if !self.is_participant(player_id) => {
                Err(NotParticipant { player_id })
            }
            _ => Ok(()),
        }
    }

    /// Apply a named transition
    pub fn apply(&mut self, action: StatusAction, now: DateTime<Utc>) -> Result<(), NotApplicable> {
        match action {
            StatusAction::Start => self.start(now),
            StatusAction::Complete { winner_id } => self.complete(winner_id, now),
            StatusAction::Forfeit { player_id } => self.forfeit(player_id, now),
        }
    }

    fn require(&self, action: &'static str, allowed: &[MatchStatus]) -> Result<(), NotApplicable> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(NotApplicable {
                action,
                status: self.status,
            })
        }
    }
}

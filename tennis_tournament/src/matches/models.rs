//! Match data models.

use crate::player::PlayerId;
use crate::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Match ID type
pub type MatchId = i64;

/// Round label. Stored only; nothing advances winners between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "match_round", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchRound {
    RoundRobin,
    #[serde(rename = "ROUND_32")]
    #[sqlx(rename = "ROUND_32")]
    Round32,
    #[serde(rename = "ROUND_16")]
    #[sqlx(rename = "ROUND_16")]
    Round16,
    QuarterFinal,
    SemiFinal,
    Final,
    WinnersBracket,
    LosersBracket,
    GrandFinal,
}

/// Match status
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "match_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Forfeit,
    Cancelled,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::InProgress => "IN_PROGRESS",
            MatchStatus::Completed => "COMPLETED",
            MatchStatus::Forfeit => "FORFEIT",
            MatchStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Match row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round: MatchRound,
    pub match_number: Option<i32>,
    pub player1_id: PlayerId,
    /// `None` for a bye
    pub player2_id: Option<PlayerId>,
    pub status: MatchStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub winner_id: Option<PlayerId>,
    pub forfeit_by: Option<PlayerId>,
    pub best_of_sets: i32,
    pub court_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn is_participant(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == Some(player_id)
    }

    /// The other participant, if `player_id` plays in this match
    ///
    /// For a bye the opponent of player1 is `None`.
    pub fn opponent_of(&self, player_id: PlayerId) -> Option<PlayerId> {
        if player_id == self.player1_id {
            self.player2_id
        } else if self.player2_id == Some(player_id) {
            Some(self.player1_id)
        } else {
            None
        }
    }
}

fn default_best_of_sets() -> i32 {
    3
}

/// Match creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub tournament_id: TournamentId,
    pub round: MatchRound,
    #[serde(default)]
    pub match_number: Option<i32>,
    pub player1_id: PlayerId,
    #[serde(default)]
    pub player2_id: Option<PlayerId>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default = "default_best_of_sets")]
    pub best_of_sets: i32,
    #[serde(default)]
    pub court_number: Option<String>,
}

impl NewMatch {
    pub fn validate(&self) -> Result<(), String> {
        if self.player2_id == Some(self.player1_id) {
            return Err("A player cannot play against themself".to_string());
        }
        validate_best_of_sets(Some(self.best_of_sets))
    }
}

/// Administrative edit. `None` leaves the field untouched, so a winner
/// once set is never cleared here.
///
/// The only status an edit may set is CANCELLED, and only on a match that
/// has not finished. Players can be swapped only before play starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchUpdate {
    pub round: Option<MatchRound>,
    pub match_number: Option<i32>,
    pub player2_id: Option<PlayerId>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: Option<MatchStatus>,
    pub best_of_sets: Option<i32>,
    pub court_number: Option<String>,
    pub winner_id: Option<PlayerId>,
}

impl MatchUpdate {
    /// Merge the edit into `game`, leaving it untouched on error
    pub fn apply_to(self, game: &mut Match) -> Result<(), String> {
        validate_best_of_sets(self.best_of_sets)?;

        if let Some(status) = self.status
            && status != game.status
        {
            if status != MatchStatus::Cancelled {
                return Err(format!(
                    "Status can only be edited to CANCELLED; use the status actions to move to {}",
                    status
                ));
            }
            if !matches!(game.status, MatchStatus::Scheduled | MatchStatus::InProgress) {
                return Err(format!("Cannot cancel a match that is {}", game.status));
            }
        }

        if let Some(player2_id) = self.player2_id {
            if player2_id == game.player1_id {
                return Err("A player cannot play against themself".to_string());
            }
            if Some(player2_id) != game.player2_id && game.status != MatchStatus::Scheduled {
                return Err("Players can only be changed before the match starts".to_string());
            }
        }

        if let Some(round) = self.round {
            game.round = round;
        }
        if self.match_number.is_some() {
            game.match_number = self.match_number;
        }
        if self.player2_id.is_some() {
            game.player2_id = self.player2_id;
        }
        if self.scheduled_at.is_some() {
            game.scheduled_at = self.scheduled_at;
        }
        if let Some(status) = self.status {
            game.status = status;
        }
        if let Some(best_of_sets) = self.best_of_sets {
            game.best_of_sets = best_of_sets;
        }
        if self.court_number.is_some() {
            game.court_number = self.court_number;
        }
        if self.winner_id.is_some() {
            game.winner_id = self.winner_id;
        }
        Ok(())
    }
}

fn validate_best_of_sets(best_of_sets: Option<i32>) -> Result<(), String> {
    if best_of_sets.is_some_and(|n| n < 1 || n % 2 == 0) {
        return Err("best_of_sets must be a positive odd number".to_string());
    }
    Ok(())
}

/// Listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFilter {
    pub tournament_id: Option<TournamentId>,
    /// Matches where this player is either participant
    pub player_id: Option<PlayerId>,
    pub status: Option<MatchStatus>,
    pub round: Option<MatchRound>,
}

/// Set row. Scores are recorded externally; no scoring rules run here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MatchSet {
    pub id: i64,
    pub match_id: MatchId,
    pub set_number: i32,
    pub player1_games: i32,
    pub player2_games: i32,
    pub is_tiebreak: bool,
    pub player1_tiebreak_points: i32,
    pub player2_tiebreak_points: i32,
    pub is_completed: bool,
    pub winner_id: Option<PlayerId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//! Tournament data models.

use crate::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tournament ID type
pub type TournamentId = i64;

/// Draw format. Stored only; no bracket is generated from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "tournament_format", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentFormat {
    RoundRobin,
    SingleElimination,
    DoubleElimination,
}

/// Tournament status
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "tournament_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    #[default]
    Draft,
    RegistrationOpen,
    RegistrationClosed,
    InProgress,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    /// Statuses in which new registrations may be admitted
    pub fn accepts_registrations(self) -> bool {
        matches!(self, TournamentStatus::Draft | TournamentStatus::RegistrationOpen)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TournamentStatus::Draft => "DRAFT",
            TournamentStatus::RegistrationOpen => "REGISTRATION_OPEN",
            TournamentStatus::RegistrationClosed => "REGISTRATION_CLOSED",
            TournamentStatus::InProgress => "IN_PROGRESS",
            TournamentStatus::Completed => "COMPLETED",
            TournamentStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Tournament row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tournament {
    pub id: TournamentId,
    pub organizer_id: PlayerId,
    pub name: String,
    pub description: Option<String>,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    pub max_participants: i32,
    /// Entry fee in cents
    pub entry_fee: i32,
    /// Prize pool in cents
    pub prize_pool: i32,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub best_of_sets: i32,
    pub tiebreak_games: i32,
    /// Minutes
    pub match_duration_limit: Option<i32>,
    pub is_public: bool,
    pub allow_registration: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_organizer(&self, player_id: PlayerId) -> bool {
        self.organizer_id == player_id
    }

    /// Private tournaments are only visible to their organizer
    pub fn is_visible_to(&self, player_id: PlayerId) -> bool {
        self.is_public || self.is_organizer(player_id)
    }
}

fn default_max_participants() -> i32 {
    32
}

fn default_best_of_sets() -> i32 {
    3
}

fn default_tiebreak_games() -> i32 {
    6
}

fn default_true() -> bool {
    true
}

/// Tournament creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub format: TournamentFormat,
    #[serde(default = "default_max_participants")]
    pub max_participants: i32,
    #[serde(default)]
    pub entry_fee: i32,
    #[serde(default)]
    pub prize_pool: i32,
    #[serde(default)]
    pub registration_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub venue_name: Option<String>,
    #[serde(default)]
    pub venue_address: Option<String>,
    #[serde(default = "default_best_of_sets")]
    pub best_of_sets: i32,
    #[serde(default = "default_tiebreak_games")]
    pub tiebreak_games: i32,
    #[serde(default)]
    pub match_duration_limit: Option<i32>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default = "default_true")]
    pub allow_registration: bool,
}

impl NewTournament {
    /// Minimal request with every optional field at its default
    pub fn new(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            name: name.into(),
            description: None,
            format,
            max_participants: default_max_participants(),
            entry_fee: 0,
            prize_pool: 0,
            registration_deadline: None,
            start_date: None,
            end_date: None,
            venue_name: None,
            venue_address: None,
            best_of_sets: default_best_of_sets(),
            tiebreak_games: default_tiebreak_games(),
            match_duration_limit: None,
            is_public: true,
            allow_registration: true,
        }
    }

    /// Check field ranges before insert
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Tournament name cannot be empty".to_string());
        }
        validate_numbers(
            Some(self.max_participants),
            Some(self.entry_fee),
            Some(self.prize_pool),
            Some(self.best_of_sets),
            Some(self.tiebreak_games),
        )?;
        validate_dates(self.start_date, self.end_date)
    }
}

/// Organizer edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub format: Option<TournamentFormat>,
    pub max_participants: Option<i32>,
    pub entry_fee: Option<i32>,
    pub prize_pool: Option<i32>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub best_of_sets: Option<i32>,
    pub tiebreak_games: Option<i32>,
    pub match_duration_limit: Option<i32>,
    pub status: Option<TournamentStatus>,
    pub is_public: Option<bool>,
    pub allow_registration: Option<bool>,
}

impl TournamentUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("Tournament name cannot be empty".to_string());
        }
        validate_numbers(
            self.max_participants,
            self.entry_fee,
            self.prize_pool,
            self.best_of_sets,
            self.tiebreak_games,
        )?;
        validate_dates(self.start_date, self.end_date)
    }
}

fn validate_numbers(
    max_participants: Option<i32>,
    entry_fee: Option<i32>,
    prize_pool: Option<i32>,
    best_of_sets: Option<i32>,
    tiebreak_games: Option<i32>,
) -> Result<(), String> {
    if max_participants.is_some_and(|n| n < 1) {
        return Err("max_participants must be at least 1".to_string());
    }
    if entry_fee.is_some_and(|n| n < 0) || prize_pool.is_some_and(|n| n < 0) {
        return Err("Amounts cannot be negative".to_string());
    }
    if best_of_sets.is_some_and(|n| n < 1 || n % 2 == 0) {
        return Err("best_of_sets must be a positive odd number".to_string());
    }
    if tiebreak_games.is_some_and(|n| n < 1) {
        return Err("tiebreak_games must be positive".to_string());
    }
    Ok(())
}

fn validate_dates(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<(), String> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err("end_date cannot be before start_date".to_string())
        }
        _ => Ok(()),
    }
}

/// Listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentFilter {
    pub status: Option<TournamentStatus>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    pub organizer_id: Option<PlayerId>,
    /// Include non-public tournaments (organizer listings)
    #[serde(default)]
    pub include_private: bool,
}

impl TournamentFilter {
    /// `ILIKE` pattern for the search term, if any
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn tournament(status: TournamentStatus, max_participants: i32) -> Tournament {
        let now = Utc::now();
        Tournament {
            id: 1,
            organizer_id: 100,
            name: "Club Championship".to_string(),
            description: None,
            format: TournamentFormat::SingleElimination,
            status,
            max_participants,
            entry_fee: 0,
            prize_pool: 0,
            registration_deadline: None,
            start_date: None,
            end_date: None,
            venue_name: None,
            venue_address: None,
            best_of_sets: 3,
            tiebreak_games: 6,
            match_duration_limit: None,
            is_public: true,
            allow_registration: true,
            created_at: now,
            updated_at: now,
        }
    }
}

//! # Tennis Tournament
//!
//! Backend library for running tennis tournaments: player accounts, tournament
//! configuration, registration admission and the match lifecycle.
//!
//! ## Architecture
//!
//! Each domain area is split into plain data models plus a manager that owns a
//! PostgreSQL connection pool:
//!
//! - [`auth`]: Player sign-up, login, JWT access tokens and rotating refresh tokens
//! - [`player`]: Player profiles
//! - [`tournament`]: Tournament CRUD and the registration admission policy
//! - [`registration`]: Admission-controlled registration and its confirm/cancel flow
//! - [`matches`]: Match scheduling and the status state machine
//! - [`db`]: Connection pooling, migrations, pagination and query timeouts
//!
//! The state machine and the admission rules are pure functions over the
//! models, so they can be exercised without a database. Managers wrap them in a
//! single transaction: lock the row, apply the rule, write, commit, re-read.
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use tennis_tournament::matches::{Match, MatchRound, MatchStatus};
//!
//! let mut game = Match::scheduled(1, 10, MatchRound::Final, 7, Some(8));
//! game.forfeit(7, Utc::now()).unwrap();
//!
//! assert_eq!(game.status, MatchStatus::Forfeit);
//! assert_eq!(game.winner_id, Some(8));
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod matches;
pub mod player;
pub mod registration;
pub mod tournament;

pub use error::{DomainError, ErrorKind};
pub use matches::{Match, MatchManager, MatchStatus};
pub use player::{Player, PlayerId, PlayerManager};
pub use registration::{Registration, RegistrationManager, RegistrationStatus};
pub use tournament::{AdmissionPolicy, Tournament, TournamentManager, TournamentStatus};

//! Tournament configuration and registration admission.

pub mod admission;
pub mod manager;
pub mod models;

pub use admission::{AdmissionPolicy, AdmissionRejection};
pub use manager::{TournamentError, TournamentManager, TournamentResult};
pub use models::{
    NewTournament, Tournament, TournamentFilter, TournamentFormat, TournamentId, TournamentStatus,
    TournamentUpdate,
};

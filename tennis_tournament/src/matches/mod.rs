//! Match scheduling and the status lifecycle.

pub mod lifecycle;
pub mod manager;
pub mod models;

pub use lifecycle::{NotApplicable, NotParticipant, StatusAction};
pub use manager::{MatchError, MatchManager, MatchResult};
pub use models::{
    Match, MatchFilter, MatchId, MatchRound, MatchSet, MatchStatus, MatchUpdate, NewMatch,
};

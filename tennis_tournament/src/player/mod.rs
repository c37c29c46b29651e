//! Player profiles.

pub mod manager;
pub mod models;

pub use manager::{PlayerError, PlayerManager, PlayerResult};
pub use models::{Player, PlayerId, PlayerUpdate, PreferredHand, SkillLevel};

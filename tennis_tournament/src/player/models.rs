//! Player data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player ID type
pub type PlayerId = i64;

/// Self-reported playing level
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "skill_level", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillLevel::Beginner => write!(f, "BEGINNER"),
            SkillLevel::Intermediate => write!(f, "INTERMEDIATE"),
            SkillLevel::Advanced => write!(f, "ADVANCED"),
        }
    }
}

/// Racket hand
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "preferred_hand", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreferredHand {
    #[default]
    Right,
    Left,
    Ambidextrous,
}

impl fmt::Display for PreferredHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferredHand::Right => write!(f, "RIGHT"),
            PreferredHand::Left => write!(f, "LEFT"),
            PreferredHand::Ambidextrous => write!(f, "AMBIDEXTROUS"),
        }
    }
}

/// Player model. The password hash never leaves the auth module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: PlayerId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub skill_level: SkillLevel,
    pub preferred_hand: PreferredHand,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Name shown to other players: the display name, or "first last"
    pub fn public_name(&self) -> String {
        match &self.display_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// Profile fields a player may change. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub skill_level: Option<SkillLevel>,
    pub preferred_hand: Option<PreferredHand>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player() -> Player {
        Player {
            id: 1,
            email: "serena@example.com".to_string(),
            first_name: "Serena".to_string(),
            last_name: "Ace".to_string(),
            display_name: None,
            phone: None,
            date_of_birth: None,
            skill_level: SkillLevel::Advanced,
            preferred_hand: PreferredHand::Right,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_name_falls_back_to_full_name() {
        let mut player = sample_player();
        assert_eq!(player.public_name(), "Serena Ace");

        player.display_name = Some("   ".to_string());
        assert_eq!(player.public_name(), "Serena Ace");

        player.display_name = Some("S.A.".to_string());
        assert_eq!(player.public_name(), "S.A.");
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(
            serde_json::to_string(&SkillLevel::Intermediate).unwrap(),
            "\"INTERMEDIATE\""
        );
        assert_eq!(
            serde_json::from_str::<PreferredHand>("\"AMBIDEXTROUS\"").unwrap(),
            PreferredHand::Ambidextrous
        );
        assert_eq!(SkillLevel::default(), SkillLevel::Intermediate);
        assert_eq!(PreferredHand::default().to_string(), "RIGHT");
    }
}

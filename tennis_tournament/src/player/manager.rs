//! Player profile manager.

use super::models::{Player, PlayerId, PlayerUpdate};
use crate::auth::manager::normalize_email;
use crate::db::Page;
use crate::error::{DomainError, ErrorKind};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

/// Columns selected for a [`Player`]; the password hash is deliberately absent.
pub(crate) const PLAYER_COLUMNS: &str = "id, email, first_name, last_name, display_name, phone, \
     date_of_birth, skill_level, preferred_hand, is_active, created_at, updated_at";

/// Player errors
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player not found")]
    NotFound(PlayerId),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DomainError for PlayerError {
    fn kind(&self) -> ErrorKind {
        match self {
            PlayerError::NotFound(_) => ErrorKind::NotFound,
            PlayerError::InvalidProfile(_) => ErrorKind::ValidationFailed,
            PlayerError::Database(_) => ErrorKind::Storage,
        }
    }
}

pub type PlayerResult<T> = Result<T, PlayerError>;

/// Player manager
#[derive(Clone)]
pub struct PlayerManager {
    pool: Arc<PgPool>,
}

impl PlayerManager {
    /// Create a new player manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Get a player by ID
    ///
    /// # Errors
    ///
    /// * `PlayerError::NotFound` - No player with this ID
    pub async fn get_player(&self, player_id: PlayerId) -> PlayerResult<Player> {
        let query = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1");
        sqlx::query_as::<_, Player>(&query)
            .bind(player_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(PlayerError::NotFound(player_id))
    }

    /// Find a player by email address, compared case-insensitively
    pub async fn find_by_email(&self, email: &str) -> PlayerResult<Option<Player>> {
        let query = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE email = $1");
        Ok(sqlx::query_as::<_, Player>(&query)
            .bind(normalize_email(email))
            .fetch_optional(self.pool.as_ref())
            .await?)
    }

    /// Update a player's own profile fields
    pub async fn update_profile(
        &self,
        player_id: PlayerId,
        update: PlayerUpdate,
    ) -> PlayerResult<Player> {
        for (field, value) in [
            ("first_name", &update.first_name),
            ("last_name", &update.last_name),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(PlayerError::InvalidProfile(format!("{field} cannot be empty")));
            }
        }

        let query = format!(
            r#"
            UPDATE players SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                display_name = COALESCE($4, display_name),
                phone = COALESCE($5, phone),
                date_of_birth = COALESCE($6, date_of_birth),
                skill_level = COALESCE($7, skill_level),
                preferred_hand = COALESCE($8, preferred_hand),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PLAYER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Player>(&query)
            .bind(player_id)
            .bind(update.first_name)
            .bind(update.last_name)
            .bind(update.display_name)
            .bind(update.phone)
            .bind(update.date_of_birth)
            .bind(update.skill_level)
            .bind(update.preferred_hand)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(PlayerError::NotFound(player_id))
    }

    /// List active players
    pub async fn list_active(&self, page: Page) -> PlayerResult<Vec<Player>> {
        let query = format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE is_active = TRUE \
             ORDER BY id OFFSET $1 LIMIT $2"
        );
        Ok(sqlx::query_as::<_, Player>(&query)
            .bind(page.skip)
            .bind(page.limit)
            .fetch_all(self.pool.as_ref())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_error_kinds() {
        assert_eq!(PlayerError::NotFound(3).kind(), ErrorKind::NotFound);
        assert_eq!(
            PlayerError::InvalidProfile("x".to_string()).kind(),
            ErrorKind::ValidationFailed
        );
        assert_eq!(
            PlayerError::Database(sqlx::Error::RowNotFound).client_message(),
            "Internal server error"
        );
    }

    #[test]
    fn test_player_columns_exclude_password_hash() {
        assert!(!PLAYER_COLUMNS.contains("password_hash"));
    }
}

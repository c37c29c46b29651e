//! Match manager: scheduling, listings and transactional status transitions.

use super::lifecycle::{NotApplicable, NotParticipant, StatusAction};
use super::models::{Match, MatchFilter, MatchId, MatchSet, MatchStatus, MatchUpdate, NewMatch};
use crate::db::Page;
use crate::error::{DomainError, ErrorKind, is_foreign_key_violation};
use crate::player::PlayerId;
use crate::tournament::TournamentId;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use thiserror::Error;

/// Match errors
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match not found")]
    NotFound(MatchId),

    #[error(transparent)]
    NotApplicable(#[from] NotApplicable),

    #[error(transparent)]
    NotParticipant(#[from] NotParticipant),

    #[error("Invalid match: {0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DomainError for MatchError {
    fn kind(&self) -> ErrorKind {
        match self {
            MatchError::NotFound(_) => ErrorKind::NotFound,
            MatchError::NotApplicable(_) => ErrorKind::PreconditionFailed,
            MatchError::NotParticipant(_) => ErrorKind::ValidationFailed,
            MatchError::Invalid(_) => ErrorKind::ValidationFailed,
            MatchError::Database(_) => ErrorKind::Storage,
        }
    }
}

pub type MatchResult<T> = Result<T, MatchError>;

/// Match manager
#[derive(Clone)]
pub struct MatchManager {
    pool: Arc<PgPool>,
}

impl MatchManager {
    /// Create a new match manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Schedule a match
    ///
    /// # Errors
    ///
    /// * `MatchError::Invalid` - Same player twice, bad best-of, or unknown tournament/player
    pub async fn create_match(&self, request: NewMatch) -> MatchResult<Match> {
        request.validate().map_err(MatchError::Invalid)?;

        let game = sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO matches (
                tournament_id, round, match_number, player1_id, player2_id,
                scheduled_at, best_of_sets, court_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.tournament_id)
        .bind(request.round)
        .bind(request.match_number)
        .bind(request.player1_id)
        .bind(request.player2_id)
        .bind(request.scheduled_at)
        .bind(request.best_of_sets)
        .bind(&request.court_number)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_reference_error)?;

        log::info!(
            "Scheduled match {} in tournament {} ({} vs {:?})",
            game.id,
            game.tournament_id,
            game.player1_id,
            game.player2_id
        );

        Ok(game)
    }

    /// Get a match by ID
    pub async fn get_match(&self, match_id: MatchId) -> MatchResult<Match> {
        sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = $1")
            .bind(match_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(MatchError::NotFound(match_id))
    }

    /// Filtered listing ordered by scheduled time (unscheduled last)
    pub async fn list_matches(&self, filter: &MatchFilter, page: Page) -> MatchResult<Vec<Match>> {
        Ok(sqlx::query_as::<_, Match>(
            r#"
            SELECT * FROM matches
            WHERE ($1::bigint IS NULL OR tournament_id = $1)
              AND ($2::bigint IS NULL OR player1_id = $2 OR player2_id = $2)
              AND ($3::match_status IS NULL OR status = $3)
              AND ($4::match_round IS NULL OR round = $4)
            ORDER BY scheduled_at ASC NULLS LAST, id ASC
            OFFSET $5 LIMIT $6
            "#,
        )
        .bind(filter.tournament_id)
        .bind(filter.player_id)
        .bind(filter.status)
        .bind(filter.round)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool.as_ref())
        .await?)
    }

    /// Matches currently IN_PROGRESS
    pub async fn live_matches(&self, page: Page) -> MatchResult<Vec<Match>> {
        let filter = MatchFilter {
            status: Some(MatchStatus::InProgress),
            ..Default::default()
        };
        self.list_matches(&filter, page).await
    }

    /// SCHEDULED matches, optionally restricted to one player
    pub async fn upcoming_matches(
        &self,
        player_id: Option<PlayerId>,
        page: Page,
    ) -> MatchResult<Vec<Match>> {
        let filter = MatchFilter {
            player_id,
            status: Some(MatchStatus::Scheduled),
            ..Default::default()
        };
        self.list_matches(&filter, page).await
    }

    pub async fn matches_for_player(&self, player_id: PlayerId, page: Page) -> MatchResult<Vec<Match>> {
        let filter = MatchFilter {
            player_id: Some(player_id),
            ..Default::default()
        };
        self.list_matches(&filter, page).await
    }

    pub async fn matches_for_tournament(
        &self,
        tournament_id: TournamentId,
        page: Page,
    ) -> MatchResult<Vec<Match>> {
        let filter = MatchFilter {
            tournament_id: Some(tournament_id),
            ..Default::default()
        };
        self.list_matches(&filter, page).await
    }

    /// Administrative field edit, including moving a match to CANCELLED
    ///
    /// The row is locked and the edit merged in memory, so the checks in
    /// [`MatchUpdate::apply_to`] see the current status and players.
    ///
    /// # Errors
    ///
    /// * `MatchError::NotFound` - No match with this ID
    /// * `MatchError::Invalid` - Edit would reopen or corrupt the match, or names an unknown player
    pub async fn update_match(&self, match_id: MatchId, update: MatchUpdate) -> MatchResult<Match> {
        let mut tx = self.pool.begin().await?;

        let mut game = lock_match(&mut tx, match_id)
            .await?
            .ok_or(MatchError::NotFound(match_id))?;

        update.apply_to(&mut game).map_err(MatchError::Invalid)?;

        let game = sqlx::query_as::<_, Match>(
            r#"
            UPDATE matches SET
                round = $2,
                match_number = $3,
                player2_id = $4,
                scheduled_at = $5,
                status = $6,
                best_of_sets = $7,
                court_number = $8,
                winner_id = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(match_id)
        .bind(game.round)
        .bind(game.match_number)
        .bind(game.player2_id)
        .bind(game.scheduled_at)
        .bind(game.status)
        .bind(game.best_of_sets)
        .bind(&game.court_number)
        .bind(game.winner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_reference_error)?;

        tx.commit().await?;

        log::info!("Match {} edited (status {})", match_id, game.status);
        Ok(game)
    }

    pub async fn start_match(&self, match_id: MatchId) -> MatchResult<Match> {
        self.transition(match_id, StatusAction::Start).await
    }

    pub async fn complete_match(&self, match_id: MatchId, winner_id: PlayerId) -> MatchResult<Match> {
        self.transition(match_id, StatusAction::Complete { winner_id })
            .await
    }

    pub async fn forfeit_match(&self, match_id: MatchId, player_id: PlayerId) -> MatchResult<Match> {
        self.transition(match_id, StatusAction::Forfeit { player_id })
            .await
    }

    /// Apply a status transition in one transaction
    ///
    /// The row is locked, the transition applied in memory, written back and
    /// committed; the fresh row is then read again. A rejected transition
    /// rolls back without writing.
    ///
    /// # Errors
    ///
    /// * `MatchError::NotFound` - No match with this ID
    /// * `MatchError::NotApplicable` - Action not allowed from the current status
    /// * `MatchError::NotParticipant` - Forfeit names a player outside the match
    pub async fn transition(&self, match_id: MatchId, action: StatusAction) -> MatchResult<Match> {
        let mut tx = self.pool.begin().await?;

        let mut game = lock_match(&mut tx, match_id)
            .await?
            .ok_or(MatchError::NotFound(match_id))?;

        game.apply(action, Utc::now())?;
        game.ensure_forfeiter(&action)?;

        if let StatusAction::Complete { winner_id } = action
            && !game.is_participant(winner_id)
        {
            log::warn!(
                "Match {} completed with winner {} who is not a participant",
                match_id,
                winner_id
            );
        }

        sqlx::query(
            r#"
            UPDATE matches SET
                status = $2,
                started_at = $3,
                completed_at = $4,
                winner_id = $5,
                forfeit_by = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(match_id)
        .bind(game.status)
        .bind(game.started_at)
        .bind(game.completed_at)
        .bind(game.winner_id)
        .bind(game.forfeit_by)
        .execute(&mut *tx)
        .await
        .map_err(map_reference_error)?;

        tx.commit().await?;

        log::info!("Match {} {} -> {}", match_id, action, game.status);

        self.get_match(match_id).await
    }

    /// Sets recorded for a match, in set order
    pub async fn list_sets(&self, match_id: MatchId) -> MatchResult<Vec<MatchSet>> {
        Ok(sqlx::query_as::<_, MatchSet>(
            "SELECT * FROM sets WHERE match_id = $1 ORDER BY set_number ASC",
        )
        .bind(match_id)
        .fetch_all(self.pool.as_ref())
        .await?)
    }
}

async fn lock_match(
    conn: &mut PgConnection,
    match_id: MatchId,
) -> Result<Option<Match>, sqlx::Error> {
    sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = $1 FOR UPDATE")
        .bind(match_id)
        .fetch_optional(conn)
        .await
}

fn map_reference_error(err: sqlx::Error) -> MatchError {
    if is_foreign_key_violation(&err) {
        MatchError::Invalid("Unknown tournament or player".to_string())
    } else {
        MatchError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_error_kinds() {
        assert_eq!(MatchError::NotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            MatchError::from(NotApplicable {
                action: "start",
                status: MatchStatus::Completed
            })
            .kind(),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(
            MatchError::Invalid("x".to_string()).kind(),
            ErrorKind::ValidationFailed
        );
        assert_eq!(
            MatchError::from(NotParticipant { player_id: 42 }).kind(),
            ErrorKind::ValidationFailed
        );
    }

    #[test]
    fn test_not_applicable_message_is_transparent() {
        let err = MatchError::from(NotApplicable {
            action: "complete",
            status: MatchStatus::Scheduled,
        });
        assert_eq!(
            err.client_message(),
            "Cannot complete a match that is SCHEDULED"
        );
    }

    #[test]
    fn test_reference_errors_map_to_database_otherwise() {
        assert!(matches!(
            map_reference_error(sqlx::Error::RowNotFound),
            MatchError::Database(_)
        ));
    }
}

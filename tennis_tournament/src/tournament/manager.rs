//! Tournament manager: CRUD, listings and admission checks.

use super::admission::AdmissionPolicy;
use super::models::{
    NewTournament, Tournament, TournamentFilter, TournamentId, TournamentStatus, TournamentUpdate,
};
use crate::db::Page;
use crate::error::{DomainError, ErrorKind};
use crate::player::PlayerId;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found")]
    NotFound(TournamentId),

    #[error("Invalid tournament: {0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DomainError for TournamentError {
    fn kind(&self) -> ErrorKind {
        match self {
            TournamentError::NotFound(_) => ErrorKind::NotFound,
            TournamentError::Invalid(_) => ErrorKind::ValidationFailed,
            TournamentError::Database(_) => ErrorKind::Storage,
        }
    }
}

pub type TournamentResult<T> = Result<T, TournamentError>;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    pool: Arc<PgPool>,
    policy: AdmissionPolicy,
}

impl TournamentManager {
    /// Create a new tournament manager with the default admission policy
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            policy: AdmissionPolicy::default(),
        }
    }

    pub fn with_admission_policy(mut self, policy: AdmissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn admission_policy(&self) -> AdmissionPolicy {
        self.policy
    }

    /// Create a tournament in DRAFT with `organizer_id` as organizer
    pub async fn create_tournament(
        &self,
        organizer_id: PlayerId,
        request: NewTournament,
    ) -> TournamentResult<Tournament> {
        request.validate().map_err(TournamentError::Invalid)?;

        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            INSERT INTO tournaments (
                organizer_id, name, description, format, max_participants, entry_fee,
                prize_pool, registration_deadline, start_date, end_date, venue_name,
                venue_address, best_of_sets, tiebreak_games, match_duration_limit,
                is_public, allow_registration
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(organizer_id)
        .bind(request.name.trim())
        .bind(&request.description)
        .bind(request.format)
        .bind(request.max_participants)
        .bind(request.entry_fee)
        .bind(request.prize_pool)
        .bind(request.registration_deadline)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.venue_name)
        .bind(&request.venue_address)
        .bind(request.best_of_sets)
        .bind(request.tiebreak_games)
        .bind(request.match_duration_limit)
        .bind(request.is_public)
        .bind(request.allow_registration)
        .fetch_one(self.pool.as_ref())
        .await?;

        log::info!(
            "Created tournament {} '{}' organized by {}",
            tournament.id,
            tournament.name,
            organizer_id
        );

        Ok(tournament)
    }

    /// Get a tournament by ID
    pub async fn get_tournament(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        sqlx::query_as::<_, Tournament>("SELECT * FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))
    }

    /// List tournaments, newest first
    ///
    /// Without `include_private` only public tournaments are returned.
    pub async fn list_tournaments(
        &self,
        filter: &TournamentFilter,
        page: Page,
    ) -> TournamentResult<Vec<Tournament>> {
        let tournaments = sqlx::query_as::<_, Tournament>(
            r#"
            SELECT * FROM tournaments
            WHERE ($1 OR is_public)
              AND ($2::tournament_status IS NULL OR status = $2)
              AND ($3::bigint IS NULL OR organizer_id = $3)
              AND ($4::text IS NULL OR name ILIKE $4 OR description ILIKE $4)
            ORDER BY created_at DESC, id DESC
            OFFSET $5 LIMIT $6
            "#,
        )
        .bind(filter.include_private)
        .bind(filter.status)
        .bind(filter.organizer_id)
        .bind(filter.search_pattern())
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(tournaments)
    }

    /// Tournaments organized by a player, private ones included
    pub async fn list_organized_by(
        &self,
        organizer_id: PlayerId,
        page: Page,
    ) -> TournamentResult<Vec<Tournament>> {
        let filter = TournamentFilter {
            organizer_id: Some(organizer_id),
            include_private: true,
            ..Default::default()
        };
        self.list_tournaments(&filter, page).await
    }

    /// Apply an organizer edit
    pub async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        update: TournamentUpdate,
    ) -> TournamentResult<Tournament> {
        update.validate().map_err(TournamentError::Invalid)?;

        sqlx::query_as::<_, Tournament>(
            r#"
            UPDATE tournaments SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                format = COALESCE($4, format),
                max_participants = COALESCE($5, max_participants),
                entry_fee = COALESCE($6, entry_fee),
                prize_pool = COALESCE($7, prize_pool),
                registration_deadline = COALESCE($8, registration_deadline),
                start_date = COALESCE($9, start_date),
                end_date = COALESCE($10, end_date),
                venue_name = COALESCE($11, venue_name),
                venue_address = COALESCE($12, venue_address),
                best_of_sets = COALESCE($13, best_of_sets),
                tiebreak_games = COALESCE($14, tiebreak_games),
                match_duration_limit = COALESCE($15, match_duration_limit),
                status = COALESCE($16, status),
                is_public = COALESCE($17, is_public),
                allow_registration = COALESCE($18, allow_registration),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tournament_id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.format)
        .bind(update.max_participants)
        .bind(update.entry_fee)
        .bind(update.prize_pool)
        .bind(update.registration_deadline)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(update.venue_name)
        .bind(update.venue_address)
        .bind(update.best_of_sets)
        .bind(update.tiebreak_games)
        .bind(update.match_duration_limit)
        .bind(update.status)
        .bind(update.is_public)
        .bind(update.allow_registration)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(TournamentError::NotFound(tournament_id))
    }

    /// Soft delete: move the tournament to CANCELLED
    pub async fn cancel_tournament(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        let tournament = sqlx::query_as::<_, Tournament>(
            "UPDATE tournaments SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(tournament_id)
        .bind(TournamentStatus::Cancelled)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(TournamentError::NotFound(tournament_id))?;

        log::info!("Cancelled tournament {}", tournament_id);
        Ok(tournament)
    }

    /// Number of CONFIRMED registrations
    pub async fn confirmed_count(&self, tournament_id: TournamentId) -> TournamentResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Ok(count_confirmed(&mut conn, tournament_id).await?)
    }

    /// Whether one more registration would be admitted right now
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotFound` - No tournament with this ID
    pub async fn can_register(&self, tournament_id: TournamentId) -> TournamentResult<bool> {
        let tournament = self.get_tournament(tournament_id).await?;
        let confirmed = self.confirmed_count(tournament_id).await?;
        Ok(self.policy.can_register(&tournament, confirmed, Utc::now()))
    }
}

/// Read a tournament row and hold its lock until the transaction ends
pub(crate) async fn lock_tournament(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> Result<Option<Tournament>, sqlx::Error> {
    sqlx::query_as::<_, Tournament>("SELECT * FROM tournaments WHERE id = $1 FOR UPDATE")
        .bind(tournament_id)
        .fetch_optional(conn)
        .await
}

pub(crate) async fn count_confirmed(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM registrations WHERE tournament_id = $1 AND status = 'CONFIRMED'",
    )
    .bind(tournament_id)
    .fetch_one(conn)
    .await
}

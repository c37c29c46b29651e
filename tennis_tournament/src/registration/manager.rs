//! Registration manager: admission-controlled sign-up and its confirm/cancel flow.

use super::errors::{RegistrationError, RegistrationResult};
use super::models::{
    NewRegistration, Registration, RegistrationId, RegistrationStatus, RegistrationUpdate,
};
use crate::db::Page;
use crate::error::is_unique_violation;
use crate::player::PlayerId;
use crate::tournament::manager::{count_confirmed, lock_tournament};
use crate::tournament::{AdmissionPolicy, TournamentId};
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;

/// Registration manager
#[derive(Clone)]
pub struct RegistrationManager {
    pool: Arc<PgPool>,
    policy: AdmissionPolicy,
}

impl RegistrationManager {
    /// Create a new registration manager with the default admission policy
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

    /// Register a player for a tournament
    ///
    /// The tournament row stays locked from the admission check until the
    /// insert commits, so concurrent sign-ups for one tournament are serialized.
    ///
    /// # Errors
    ///
    /// * `RegistrationError::TournamentNotFound` - No tournament with this ID
    /// * `RegistrationError::Admission` - Closed, full or past the deadline
    /// * `RegistrationError::AlreadyRegistered` - Any earlier registration exists, whatever its status
    pub async fn register(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        request: NewRegistration,
    ) -> RegistrationResult<Registration> {
        let mut tx = self.pool.begin().await?;

        let tournament = lock_tournament(&mut tx, tournament_id)
            .await?
            .ok_or(RegistrationError::TournamentNotFound(tournament_id))?;

        let confirmed = count_confirmed(&mut tx, tournament_id).await?;
        let now = Utc::now();
        self.policy.check(&tournament, confirmed, now)?;

        if find_existing(&mut tx, player_id, tournament_id)
            .await?
            .is_some()
        {
            return Err(RegistrationError::AlreadyRegistered);
        }

        let registration = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (player_id, tournament_id, status, registration_date, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(player_id)
        .bind(tournament_id)
        .bind(RegistrationStatus::Pending)
        .bind(now)
        .bind(&request.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RegistrationError::AlreadyRegistered
            } else {
                RegistrationError::Database(e)
            }
        })?;

        tx.commit().await?;

        log::info!(
            "Player {} registered for tournament {} (registration {})",
            player_id,
            tournament_id,
            registration.id
        );

        Ok(registration)
    }

    /// Confirm a pending registration, provided the tournament has room
    ///
    /// # Errors
    ///
    /// * `RegistrationError::NotFound` - No registration with this ID
    /// * `RegistrationError::NotPending` - Registration is not PENDING
    /// * `RegistrationError::Admission` - Tournament already at capacity
    pub async fn confirm(&self, registration_id: RegistrationId) -> RegistrationResult<Registration> {
        let tournament_id = self.get_registration(registration_id).await?.tournament_id;

        let mut tx = self.pool.begin().await?;

        let tournament = lock_tournament(&mut tx, tournament_id)
            .await?
            .ok_or(RegistrationError::TournamentNotFound(tournament_id))?;

        let mut registration = lock_registration(&mut tx, registration_id)
            .await?
            .ok_or(RegistrationError::NotFound(registration_id))?;

        registration.confirm(Utc::now())?;

        let confirmed = count_confirmed(&mut tx, tournament_id).await?;
        self.policy.check_capacity(&tournament, confirmed)?;

        let registration = sqlx::query_as::<_, Registration>(
            r#"
            UPDATE registrations
            SET status = $2, confirmation_date = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(registration_id)
        .bind(registration.status)
        .bind(registration.confirmation_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!(
            "Confirmed registration {} for tournament {}",
            registration_id,
            tournament_id
        );

        Ok(registration)
    }

    /// Cancel a registration from any status
    pub async fn cancel(&self, registration_id: RegistrationId) -> RegistrationResult<Registration> {
        let mut tx = self.pool.begin().await?;

        let mut registration = lock_registration(&mut tx, registration_id)
            .await?
            .ok_or(RegistrationError::NotFound(registration_id))?;

        registration.cancel();

        let registration = sqlx::query_as::<_, Registration>(
            "UPDATE registrations SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(registration_id)
        .bind(registration.status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!("Cancelled registration {}", registration_id);
        Ok(registration)
    }

    /// Administrative edit of status, notes and payment fields
    ///
    /// Moving a registration to CONFIRMED stamps `confirmation_date` if it was unset.
    pub async fn update(
        &self,
        registration_id: RegistrationId,
        update: RegistrationUpdate,
    ) -> RegistrationResult<Registration> {
        sqlx::query_as::<_, Registration>(
            r#"
            UPDATE registrations SET
                status = COALESCE($2, status),
                notes = COALESCE($3, notes),
                payment_status = COALESCE($4, payment_status),
                payment_reference = COALESCE($5, payment_reference),
                confirmation_date = CASE
                    WHEN $2 = 'CONFIRMED'::registration_status AND confirmation_date IS NULL
                        THEN NOW()
                    ELSE confirmation_date
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(registration_id)
        .bind(update.status)
        .bind(update.notes)
        .bind(update.payment_status)
        .bind(update.payment_reference)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(RegistrationError::NotFound(registration_id))
    }

    /// Get a registration by ID
    pub async fn get_registration(
        &self,
        registration_id: RegistrationId,
    ) -> RegistrationResult<Registration> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE id = $1")
            .bind(registration_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(RegistrationError::NotFound(registration_id))
    }

    /// The registration of a player for a tournament, if any
    pub async fn find(
        &self,
        player_id: PlayerId,
        tournament_id: TournamentId,
    ) -> RegistrationResult<Option<Registration>> {
        let mut conn = self.pool.acquire().await?;
        Ok(find_existing(&mut conn, player_id, tournament_id).await?)
    }

    /// Registrations for a tournament, oldest first
    pub async fn list_for_tournament(
        &self,
        tournament_id: TournamentId,
        page: Page,
    ) -> RegistrationResult<Vec<Registration>> {
        Ok(sqlx::query_as::<_, Registration>(
            r#"
            SELECT * FROM registrations
            WHERE tournament_id = $1
            ORDER BY registration_date ASC, id ASC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(tournament_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool.as_ref())
        .await?)
    }

    /// A player's registrations, newest first
    pub async fn list_for_player(
        &self,
        player_id: PlayerId,
        page: Page,
    ) -> RegistrationResult<Vec<Registration>> {
        Ok(sqlx::query_as::<_, Registration>(
            r#"
            SELECT * FROM registrations
            WHERE player_id = $1
            ORDER BY registration_date DESC, id DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(player_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool.as_ref())
        .await?)
    }
}

async fn lock_registration(
    conn: &mut PgConnection,
    registration_id: RegistrationId,
) -> Result<Option<Registration>, sqlx::Error> {
    sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE id = $1 FOR UPDATE")
        .bind(registration_id)
        .fetch_optional(conn)
        .await
}

async fn find_existing(
    conn: &mut PgConnection,
    player_id: PlayerId,
    tournament_id: TournamentId,
) -> Result<Option<Registration>, sqlx::Error> {
    sqlx::query_as::<_, Registration>(
        "SELECT * FROM registrations WHERE player_id = $1 AND tournament_id = $2",
    )
    .bind(player_id)
    .bind(tournament_id)
    .fetch_optional(conn)
    .await
}

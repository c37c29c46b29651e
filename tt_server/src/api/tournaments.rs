//! Tournament and registration handlers.
//!
//! Private tournaments are visible to their organizer only. Editing,
//! cancelling and registration administration are organizer-only.

use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tennis_tournament::db::Page;
use tennis_tournament::registration::{
    NewRegistration, Registration, RegistrationError, RegistrationId, RegistrationUpdate,
};
use tennis_tournament::tournament::{
    NewTournament, Tournament, TournamentFilter, TournamentId, TournamentStatus, TournamentUpdate,
};
use tennis_tournament::{DomainError, ErrorKind, PlayerId};

use super::error::{ApiError, ApiResult};
use super::{AppState, PageQuery};
use crate::metrics;

#[derive(Debug, Default, Deserialize)]
pub struct TournamentQuery {
    pub status: Option<TournamentStatus>,
    pub search: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Load a tournament and require the caller to be its organizer
async fn organized_tournament(
    state: &AppState,
    tournament_id: TournamentId,
    player_id: PlayerId,
    denied: &str,
) -> ApiResult<Tournament> {
    let tournament = state
        .tournament_manager
        .get_tournament(tournament_id)
        .await?;
    if !tournament.is_organizer(player_id) {
        return Err(ApiError::forbidden(denied));
    }
    Ok(tournament)
}

/// Load a registration that must belong to the given tournament
async fn registration_in(
    state: &AppState,
    tournament_id: TournamentId,
    registration_id: RegistrationId,
) -> ApiResult<Registration> {
    let registration = state
        .registration_manager
        .get_registration(registration_id)
        .await?;
    if registration.tournament_id != tournament_id {
        return Err(RegistrationError::NotFound(registration_id).into());
    }
    Ok(registration)
}

pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Json(request): Json<NewTournament>,
) -> ApiResult<(StatusCode, Json<Tournament>)> {
    let tournament = state
        .tournament_manager
        .create_tournament(player_id, request)
        .await?;
    tracing::info!(
        tournament_id = tournament.id,
        organizer_id = player_id,
        "Tournament created"
    );
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// Public tournaments, newest first, filtered by status and search term
pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(query): Query<TournamentQuery>,
) -> ApiResult<Json<Vec<Tournament>>> {
    let page = Page::new(query.skip, query.limit)?;
    let filter = TournamentFilter {
        status: query.status,
        search: query.search,
        ..Default::default()
    };
    let tournaments = state
        .tournament_manager
        .list_tournaments(&filter, page)
        .await?;
    Ok(Json(tournaments))
}

pub async fn my_organized(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<Tournament>>> {
    let tournaments = state
        .tournament_manager
        .list_organized_by(player_id, query.page()?)
        .await?;
    Ok(Json(tournaments))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Tournament>> {
    let tournament = state
        .tournament_manager
        .get_tournament(tournament_id)
        .await?;
    if !tournament.is_visible_to(player_id) {
        return Err(ApiError::forbidden("Not authorized to view this tournament"));
    }
    Ok(Json(tournament))
}

pub async fn update_tournament(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Path(tournament_id): Path<TournamentId>,
    Json(update): Json<TournamentUpdate>,
) -> ApiResult<Json<Tournament>> {
    organized_tournament(
        &state,
        tournament_id,
        player_id,
        "Only tournament organizers can update tournaments",
    )
    .await?;

    let tournament = state
        .tournament_manager
        .update_tournament(tournament_id, update)
        .await?;
    Ok(Json(tournament))
}

/// Cancels rather than deletes
pub async fn cancel_tournament(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Tournament>> {
    organized_tournament(
        &state,
        tournament_id,
        player_id,
        "Only tournament organizers can cancel tournaments",
    )
    .await?;

    let tournament = state
        .tournament_manager
        .cancel_tournament(tournament_id)
        .await?;
    tracing::info!(tournament_id, "Tournament cancelled");
    Ok(Json(tournament))
}

/// Register the caller. The body (`{"notes": ...}`) is optional.
pub async fn register(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Path(tournament_id): Path<TournamentId>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Registration>)> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        NewRegistration::default()
    } else {
        serde_json::from_slice::<NewRegistration>(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid registration body: {}", e)))?
    };

    let result = state
        .registration_manager
        .register(tournament_id, player_id, request)
        .await;

    match result {
        Ok(registration) => {
            metrics::registration_outcomes_total("accepted");
            Ok((StatusCode::CREATED, Json(registration)))
        }
        Err(err) => {
            let outcome = match err.kind() {
                ErrorKind::Storage => "error",
                _ => "rejected",
            };
            metrics::registration_outcomes_total(outcome);
            Err(err.into())
        }
    }
}

pub async fn list_registrations(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Path(tournament_id): Path<TournamentId>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<Registration>>> {
    let page = query.page()?;
    organized_tournament(
        &state,
        tournament_id,
        player_id,
        "Only tournament organizers can view registrations",
    )
    .await?;

    let registrations = state
        .registration_manager
        .list_for_tournament(tournament_id, page)
        .await?;
    Ok(Json(registrations))
}

pub async fn update_registration(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Path((tournament_id, registration_id)): Path<(TournamentId, RegistrationId)>,
    Json(update): Json<RegistrationUpdate>,
) -> ApiResult<Json<Registration>> {
    organized_tournament(
        &state,
        tournament_id,
        player_id,
        "Only tournament organizers can update registrations",
    )
    .await?;
    registration_in(&state, tournament_id, registration_id).await?;

    let registration = state
        .registration_manager
        .update(registration_id, update)
        .await?;
    Ok(Json(registration))
}

pub async fn confirm_registration(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Path((tournament_id, registration_id)): Path<(TournamentId, RegistrationId)>,
) -> ApiResult<Json<Registration>> {
    organized_tournament(
        &state,
        tournament_id,
        player_id,
        "Only tournament organizers can confirm registrations",
    )
    .await?;
    registration_in(&state, tournament_id, registration_id).await?;

    let registration = state.registration_manager.confirm(registration_id).await?;
    Ok(Json(registration))
}

/// Withdraw a registration; allowed for the registrant and the organizer
pub async fn cancel_registration(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Path(registration_id): Path<RegistrationId>,
) -> ApiResult<Json<Registration>> {
    let registration = state
        .registration_manager
        .get_registration(registration_id)
        .await?;

    if registration.player_id != player_id {
        organized_tournament(
            &state,
            registration.tournament_id,
            player_id,
            "Not authorized to cancel this registration",
        )
        .await?;
    }

    let registration = state.registration_manager.cancel(registration_id).await?;
    Ok(Json(registration))
}

pub async fn my_registrations(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<Registration>>> {
    let registrations = state
        .registration_manager
        .list_for_player(player_id, query.page()?)
        .await?;
    Ok(Json(registrations))
}

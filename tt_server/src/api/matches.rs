//! Match handlers.
//!
//! Scheduling and administrative edits belong to the tournament organizer.
//! Status transitions are open to the organizer and the two participants.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tennis_tournament::db::Page;
use tennis_tournament::matches::{
    Match, MatchFilter, MatchId, MatchRound, MatchSet, MatchStatus, MatchUpdate, NewMatch,
    StatusAction,
};
use tennis_tournament::PlayerId;
use tennis_tournament::tournament::TournamentId;

use super::error::{ApiError, ApiResult};
use super::{AppState, PageQuery};
use crate::metrics;

#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    pub tournament_id: Option<TournamentId>,
    pub player_id: Option<PlayerId>,
    pub status: Option<MatchStatus>,
    pub round: Option<MatchRound>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    /// Defaults to the caller
    pub player_id: Option<PlayerId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Body of `POST /matches/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusActionPayload {
    pub action: String,
    #[serde(default)]
    pub winner_id: Option<PlayerId>,
    #[serde(default)]
    pub forfeit_player_id: Option<PlayerId>,
}

impl StatusActionPayload {
    pub fn into_action(self) -> ApiResult<StatusAction> {
        match self.action.as_str() {
            "start" => Ok(StatusAction::Start),
            "complete" => self
                .winner_id
                .map(|winner_id| StatusAction::Complete { winner_id })
                .ok_or_else(|| ApiError::bad_request("Winner ID required to complete match")),
            "forfeit" => self
                .forfeit_player_id
                .map(|player_id| StatusAction::Forfeit { player_id })
                .ok_or_else(|| ApiError::bad_request("Forfeit player ID required")),
            _ => Err(ApiError::bad_request(
                "Invalid action. Must be 'start', 'complete', or 'forfeit'",
            )),
        }
    }
}

/// Decide whether `player_id` may apply `action` to the match
///
/// Anyone allowed to act may only forfeit one of the two participants.
fn authorize_transition(
    game: &Match,
    is_organizer: bool,
    player_id: PlayerId,
    action: &StatusAction,
) -> ApiResult<()> {
    if !is_organizer && !game.is_participant(player_id) {
        return Err(ApiError::forbidden("Not authorized to update this match"));
    }
    if let StatusAction::Forfeit {
        player_id: forfeiter,
    } = action
        && !is_organizer
        && *forfeiter != player_id
    {
        return Err(ApiError::forbidden("Can only forfeit your own match"));
    }
    game.ensure_forfeiter(action)?;
    Ok(())
}

async fn require_organizer(
    state: &AppState,
    tournament_id: TournamentId,
    player_id: PlayerId,
    denied: &str,
) -> ApiResult<()> {
    let tournament = state
        .tournament_manager
        .get_tournament(tournament_id)
        .await?;
    if !tournament.is_organizer(player_id) {
        return Err(ApiError::forbidden(denied));
    }
    Ok(())
}

pub async fn create_match(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Json(request): Json<NewMatch>,
) -> ApiResult<(StatusCode, Json<Match>)> {
    require_organizer(
        &state,
        request.tournament_id,
        player_id,
        "Only tournament organizers can create matches",
    )
    .await?;

    let game = state.match_manager.create_match(request).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

pub async fn list_matches(
    State(state): State<AppState>,
    Query(query): Query<MatchQuery>,
) -> ApiResult<Json<Vec<Match>>> {
    let page = Page::new(query.skip, query.limit)?;
    let filter = MatchFilter {
        tournament_id: query.tournament_id,
        player_id: query.player_id,
        status: query.status,
        round: query.round,
    };
    Ok(Json(state.match_manager.list_matches(&filter, page).await?))
}

pub async fn live_matches(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<Match>>> {
    Ok(Json(state.match_manager.live_matches(query.page()?).await?))
}

pub async fn upcoming_matches(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Query(query): Query<UpcomingQuery>,
) -> ApiResult<Json<Vec<Match>>> {
    let page = Page::new(query.skip, query.limit)?;
    let player = query.player_id.unwrap_or(player_id);
    let matches = state
        .match_manager
        .upcoming_matches(Some(player), page)
        .await?;
    Ok(Json(matches))
}

pub async fn my_matches(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<Match>>> {
    let matches = state
        .match_manager
        .matches_for_player(player_id, query.page()?)
        .await?;
    Ok(Json(matches))
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.match_manager.get_match(match_id).await?))
}

pub async fn update_match(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Path(match_id): Path<MatchId>,
    Json(update): Json<MatchUpdate>,
) -> ApiResult<Json<Match>> {
    let game = state.match_manager.get_match(match_id).await?;
    require_organizer(
        &state,
        game.tournament_id,
        player_id,
        "Only tournament organizers can update matches",
    )
    .await?;

    Ok(Json(state.match_manager.update_match(match_id, update).await?))
}

/// Start, complete or forfeit a match
pub async fn update_match_status(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Path(match_id): Path<MatchId>,
    Json(payload): Json<StatusActionPayload>,
) -> ApiResult<Json<Match>> {
    let action = payload.into_action()?;

    let game = state.match_manager.get_match(match_id).await?;
    let is_organizer = state
        .tournament_manager
        .get_tournament(game.tournament_id)
        .await?
        .is_organizer(player_id);

    authorize_transition(&game, is_organizer, player_id, &action)?;

    let updated = state.match_manager.transition(match_id, action).await?;
    metrics::match_transitions_total(action.name());
    tracing::info!(
        match_id,
        player_id,
        action = action.name(),
        status = %updated.status,
        "Match status updated"
    );
    Ok(Json(updated))
}

pub async fn list_sets(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<Vec<MatchSet>>> {
    state.match_manager.get_match(match_id).await?;
    Ok(Json(state.match_manager.list_sets(match_id).await?))
}

pub async fn tournament_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<Match>>> {
    let page = query.page()?;
    state
        .tournament_manager
        .get_tournament(tournament_id)
        .await?;
    let matches = state
        .match_manager
        .matches_for_tournament(tournament_id, page)
        .await?;
    Ok(Json(matches))
}

//! Player profile handlers.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use tennis_tournament::PlayerId;
use tennis_tournament::player::{Player, PlayerUpdate};

use super::error::{ApiError, ApiResult};
use super::{AppState, PageQuery};

/// The authenticated player's own profile
pub async fn get_me(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
) -> ApiResult<Json<Player>> {
    Ok(Json(state.player_manager.get_player(player_id).await?))
}

/// Update the authenticated player's profile
pub async fn update_me(
    State(state): State<AppState>,
    Extension(player_id): Extension<PlayerId>,
    Json(update): Json<PlayerUpdate>,
) -> ApiResult<Json<Player>> {
    let player = state
        .player_manager
        .update_profile(player_id, update)
        .await?;
    Ok(Json(player))
}

/// Active players, by id
pub async fn list_players(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<Player>>> {
    let players = state.player_manager.list_active(query.page()?).await?;
    Ok(Json(players))
}

/// A single active player
pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<Json<Player>> {
    let player = state.player_manager.get_player(player_id).await?;
    if !player.is_active {
        return Err(ApiError::not_found("Player not found"));
    }
    Ok(Json(player))
}

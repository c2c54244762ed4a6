use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;

use crate::api::models::{NicknameRequest, PlayerDetail, RegisterPlayerRequest};
use crate::domain::PlayerState;
use super::{ApiResult, AppState, run_blocking};

pub async fn get_player_detail(
    State(state): State<Arc<AppState>>,
    Path((league, player_id)): Path<(String, String)>,
) -> ApiResult<Json<PlayerDetail>> {
    let summary = run_blocking(&state, move |service| service.player_summary(&league, &player_id)).await?;
    Ok(Json(PlayerDetail::from(summary)))
}

pub async fn register_player(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
    Json(request): Json<RegisterPlayerRequest>,
) -> ApiResult<(StatusCode, Json<PlayerState>)> {
    let player = run_blocking(&state, move |service| {
        service.register_player(&league, &request.player_id, request.nickname.as_deref())
    })
    .await?;
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn set_nickname(
    State(state): State<Arc<AppState>>,
    Path((league, player_id)): Path<(String, String)>,
    Json(request): Json<NicknameRequest>,
) -> ApiResult<StatusCode> {
    run_blocking(&state, move |service| {
        service.set_nickname(&league, &player_id, &request.nickname)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

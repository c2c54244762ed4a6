use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;

use crate::api::models::{LadderResponse, MatchListResponse};
use crate::domain::MatchReport;
use crate::services::AppliedMatch;
use super::{ApiResult, AppState, MatchParams, run_blocking};

pub async fn get_ladder(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
) -> ApiResult<Json<LadderResponse>> {
    let recent = state.config.server.recent_matches;
    let response = run_blocking(&state, move |service| {
        let players = service.leaderboard(&league)?;
        let recent_matches = service.recent_matches(&league, recent)?;
        Ok(LadderResponse {
            league,
            players,
            recent_matches,
        })
    })
    .await?;

    Ok(Json(response))
}

pub async fn get_matches(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
    Query(params): Query<MatchParams>,
) -> ApiResult<Json<MatchListResponse>> {
    let limit = params.limit.unwrap_or(state.config.server.recent_matches).clamp(1, 1000);
    let items = run_blocking(&state, move |service| service.recent_matches(&league, limit)).await?;
    Ok(Json(MatchListResponse { items }))
}

pub async fn report_match(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
    Json(report): Json<MatchReport>,
) -> ApiResult<(StatusCode, Json<AppliedMatch>)> {
    let applied = run_blocking(&state, move |service| service.report_match(&league, &report)).await?;
    Ok((StatusCode::CREATED, Json(applied)))
}

use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::api::models::LeaguesResponse;
use super::{ApiResult, AppState, run_blocking};

pub async fn list_leagues(State(state): State<Arc<AppState>>) -> ApiResult<Json<LeaguesResponse>> {
    let items = run_blocking(&state, |service| service.leagues()).await?;
    Ok(Json(LeaguesResponse { items }))
}

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use std::sync::Arc;

use crate::services::RebuildSummary;
use super::{ApiResult, AppState, authorize, run_blocking};

pub async fn rebuild_league(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<RebuildSummary>> {
    authorize(&headers, &state.config)?;

    log::info!("Admin triggered rebuild of league {}", league);
    let summary = run_blocking(&state, move |service| service.rebuild(&league)).await?;
    Ok(Json(summary))
}

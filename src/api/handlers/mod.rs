use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::models::ErrorResponse;
use crate::config::settings::AppConfig;
use crate::errors::{LadderError, LadderResult};
use crate::services::LadderService;

pub mod admin;
pub mod leagues;
pub mod matches;
pub mod players;

pub struct AppState {
    pub service: Arc<LadderService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(service: LadderService, config: AppConfig) -> Self {
        Self {
            service: Arc::new(service),
            config,
        }
    }
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub limit: Option<usize>,
}

/// Error returned by every handler
#[derive(Debug)]
pub enum ApiError {
    Ladder(LadderError),
    Unauthorized,
}

impl From<LadderError> for ApiError {
    fn from(e: LadderError) -> Self {
        ApiError::Ladder(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Ladder(LadderError::InvalidMatch(_)) => StatusCode::BAD_REQUEST,
            ApiError::Ladder(LadderError::NotFound { .. } | LadderError::LeagueNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Ladder(LadderError::ConcurrentRebuildInProgress(_)) => StatusCode::CONFLICT,
            ApiError::Ladder(LadderError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::Ladder(e) => e.to_string(),
        };
        if status.is_server_error() {
            log::error!("Request failed: {}", message);
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Runs a blocking service call off the async runtime
pub async fn run_blocking<T, F>(state: &Arc<AppState>, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&LadderService) -> LadderResult<T> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    let result = tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| LadderError::Storage(anyhow::anyhow!("Worker task failed: {e}")))?;
    Ok(result?)
}

/// Checks `Authorization: Bearer <token>` when an admin token is configured
pub fn authorize(headers: &HeaderMap, config: &AppConfig) -> ApiResult<()> {
    let Some(token) = config.server.admin_token.as_deref() else {
        return Ok(());
    };
    let auth_header = headers.get("Authorization").and_then(|h| h.to_str().ok());
    match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(given) if given == token => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

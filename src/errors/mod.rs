use thiserror::Error;

/// Failures surfaced by the ladder engine and its service layer
#[derive(Debug, Error)]
pub enum LadderError {
    #[error("Invalid match: {0}")]
    InvalidMatch(String),

    #[error("Player {player_id} not found in league {league}")]
    NotFound { league: String, player_id: String },

    #[error("League {0} not found")]
    LeagueNotFound(String),

    #[error("A rebuild of league {0} is in progress, retry later")]
    ConcurrentRebuildInProgress(String),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub type LadderResult<T> = Result<T, LadderError>;

impl LadderError {
    pub fn invalid_match(reason: impl Into<String>) -> Self {
        LadderError::InvalidMatch(reason.into())
    }

    pub fn player_not_found(league: &str, player_id: &str) -> Self {
        LadderError::NotFound {
            league: league.to_string(),
            player_id: player_id.to_string(),
        }
    }
}

/// Add context to store errors
pub fn store_context(operation: &str, league: &str) -> String {
    format!("Failed to {} for league: {}", operation, league)
}

use serde::{Deserialize, Serialize};

use crate::domain::{League, MatchResult};
use crate::rating::{ConfidenceLevel, LadderRow};
use crate::services::PlayerSummary;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaguesResponse {
    pub items: Vec<League>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderResponse {
    pub league: String,
    pub players: Vec<LadderRow>,
    pub recent_matches: Vec<MatchResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListResponse {
    pub items: Vec<MatchResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetail {
    pub player_id: String,
    pub display_name: String,
    pub rank: usize,
    pub rating: i32,
    pub rating_change: i32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub games_played: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub confidence_level: String,
    pub matches: Vec<MatchResult>,
}

impl From<PlayerSummary> for PlayerDetail {
    fn from(summary: PlayerSummary) -> Self {
        let state = summary.state;
        Self {
            games_played: state.games_played(),
            goal_difference: state.goal_difference(),
            confidence_level: ConfidenceLevel::from_provisional(state.is_provisional)
                .as_str()
                .to_string(),
            player_id: state.player_id,
            display_name: summary.display_name,
            rank: summary.rank,
            rating: state.rating,
            rating_change: state.rating_change,
            wins: state.wins,
            draws: state.draws,
            losses: state.losses,
            goals_for: state.goals_for,
            goals_against: state.goals_against,
            matches: summary.matches,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPlayerRequest {
    pub player_id: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Deserialize)]
pub struct NicknameRequest {
    pub nickname: String,
}

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{PlayerState, display_name};

/// A player with its 1-based position on the ladder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPlayer {
    pub rank: usize,
    pub player: PlayerState,
}

/// One leaderboard line, with the derived columns filled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderRow {
    pub rank: usize,
    pub player_id: String,
    pub display_name: String,
    pub rating: i32,
    pub rating_change: i32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub games_played: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub is_provisional: bool,
}

impl LadderRow {
    pub fn new(ranked: &RankedPlayer, display_name: String) -> Self {
        let player = &ranked.player;
        Self {
            rank: ranked.rank,
            player_id: player.player_id.clone(),
            display_name,
            rating: player.rating,
            rating_change: player.rating_change,
            wins: player.wins,
            draws: player.draws,
            losses: player.losses,
            games_played: player.games_played(),
            goals_for: player.goals_for,
            goals_against: player.goals_against,
            goal_difference: player.goal_difference(),
            is_provisional: player.is_provisional,
        }
    }
}

/// Orders players by rating, highest first.
///
/// Equal ratings are ordered by player id so the ladder is the same no matter
/// in which order the store returned the players.
pub fn rank(mut players: Vec<PlayerState>) -> Vec<RankedPlayer> {
    players.sort_by(|a, b| {
        b.rating
            .cmp(&a.rating)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    players
        .into_iter()
        .enumerate()
        .map(|(idx, player)| RankedPlayer {
            rank: idx + 1,
            player,
        })
        .collect()
}

/// Ranks `players` and attaches display names built from `nicknames`
pub fn leaderboard(players: Vec<PlayerState>, nicknames: &HashMap<String, String>) -> Vec<LadderRow> {
    rank(players)
        .iter()
        .map(|ranked| {
            let nickname = nicknames.get(&ranked.player.player_id).map(String::as_str);
            LadderRow::new(ranked, display_name(&ranked.player.player_id, nickname))
        })
        .collect()
}

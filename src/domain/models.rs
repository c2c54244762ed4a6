use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LadderError, LadderResult};

/// Highest score a single side may record in one match
pub const MAX_SCORE: u32 = 999;

/// A league ("ladder") known to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Rating and aggregate record of one player in one league
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub league: String,
    pub player_id: String,
    /// 0 means the player has never been rated
    pub rating: i32,
    pub rating_change: i32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub is_provisional: bool,
}

impl PlayerState {
    pub fn new(league: &str, player_id: &str) -> Self {
        Self {
            league: league.to_string(),
            player_id: player_id.to_string(),
            rating: 0,
            rating_change: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            is_provisional: true,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    pub fn is_rated(&self) -> bool {
        self.rating != 0
    }

    /// Back to the state of a freshly registered player
    pub fn reset(&mut self) {
        *self = Self::new(&self.league, &self.player_id);
    }
}

/// A validated match that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub league: String,
    pub winner: String,
    pub loser: String,
    pub tie: bool,
    pub winner_score: u32,
    pub loser_score: u32,
    #[serde(default)]
    pub winner_team: Option<String>,
    #[serde(default)]
    pub loser_team: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewMatch {
    pub fn new(league: &str, winner: &str, loser: &str, winner_score: u32, loser_score: u32) -> Self {
        Self {
            league: league.to_string(),
            winner: winner.to_string(),
            loser: loser.to_string(),
            tie: false,
            winner_score,
            loser_score,
            winner_team: None,
            loser_team: None,
            comment: None,
        }
    }

    pub fn tied(mut self) -> Self {
        self.tie = true;
        self
    }

    pub fn validate(&self) -> LadderResult<()> {
        if self.winner == self.loser {
            return Err(LadderError::invalid_match(format!(
                "{} cannot play against themselves",
                self.winner
            )));
        }
        if self.winner_score > MAX_SCORE || self.loser_score > MAX_SCORE {
            return Err(LadderError::invalid_match(format!(
                "scores above {} are not accepted, got {}-{}",
                MAX_SCORE, self.winner_score, self.loser_score
            )));
        }
        if self.winner_score < self.loser_score {
            return Err(LadderError::invalid_match(format!(
                "winner score {} is lower than loser score {}",
                self.winner_score, self.loser_score
            )));
        }
        Ok(())
    }

    /// Goal margin seen from the winning side, never negative
    pub fn winner_margin(&self) -> i32 {
        signed_margin(self.winner_score, self.loser_score)
    }

    /// Goal margin seen from the losing side, never positive
    pub fn loser_margin(&self) -> i32 {
        signed_margin(self.loser_score, self.winner_score)
    }

    pub fn involves(&self, player_id: &str) -> bool {
        self.winner == player_id || self.loser == player_id
    }
}

fn signed_margin(own: u32, other: u32) -> i32 {
    let margin = i64::from(own) - i64::from(other);
    i32::try_from(margin).unwrap_or(if margin < 0 { i32::MIN } else { i32::MAX })
}

/// A stored, immutable match. `(created_at, id)` is its position in the league history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub game: NewMatch,
}

impl MatchResult {
    pub fn history_key(&self) -> (DateTime<Utc>, i64) {
        (self.created_at, self.id)
    }
}

/// Name shown for a player: `"nickname (id)"` when a nickname is set
pub fn display_name(player_id: &str, nickname: Option<&str>) -> String {
    match nickname.map(str::trim).filter(|n| !n.is_empty()) {
        Some(nickname) => format!("{} ({})", nickname, player_id),
        None => player_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_unrated_and_provisional() {
        let state = PlayerState::new("fifadev", "ann@example.com");
        assert_eq!(state.rating, 0);
        assert!(!state.is_rated());
        assert!(state.is_provisional);
        assert_eq!(state.games_played(), 0);
    }

    #[test]
    fn test_reset_keeps_identity() {
        let mut state = PlayerState::new("fifadev", "ann");
        state.rating = 1543;
        state.wins = 7;
        state.goals_for = 12;
        state.goals_against = 3;
        state.is_provisional = false;

        state.reset();

        assert_eq!(state, PlayerState::new("fifadev", "ann"));
    }

    #[test]
    fn test_goal_difference_can_be_negative() {
        let mut state = PlayerState::new("fifadev", "ann");
        state.goals_for = 2;
        state.goals_against = 9;
        assert_eq!(state.goal_difference(), -7);
    }

    #[test]
    fn test_margins_are_side_specific() {
        let game = NewMatch::new("fifadev", "ann", "bob", 5, 1);
        assert_eq!(game.winner_margin(), 4);
        assert_eq!(game.loser_margin(), -4);
    }

    #[test]
    fn test_margins_do_not_wrap_for_huge_scores() {
        let game = NewMatch::new("fifadev", "ann", "bob", u32::MAX, 0);
        assert_eq!(game.winner_margin(), i32::MAX);
        assert_eq!(game.loser_margin(), i32::MIN);
    }

    #[test]
    fn test_validate_rejects_scores_above_limit() {
        assert!(NewMatch::new("fifadev", "ann", "bob", MAX_SCORE, 0).validate().is_ok());
        let game = NewMatch::new("fifadev", "ann", "bob", 1_000_000_000, 0);
        assert!(matches!(game.validate(), Err(LadderError::InvalidMatch(_))));
    }

    #[test]
    fn test_validate_rejects_self_match() {
        let game = NewMatch::new("fifadev", "ann", "ann", 1, 0);
        assert!(matches!(game.validate(), Err(LadderError::InvalidMatch(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_scores() {
        let game = NewMatch::new("fifadev", "ann", "bob", 0, 2);
        assert!(matches!(game.validate(), Err(LadderError::InvalidMatch(_))));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("ann@example.com", Some("Ann")), "Ann (ann@example.com)");
        assert_eq!(display_name("ann@example.com", Some("  ")), "ann@example.com");
        assert_eq!(display_name("ann@example.com", None), "ann@example.com");
    }
}

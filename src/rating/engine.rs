use log::debug;

use super::math::{applied_change, rating_delta};
use super::types::Outcome;
use crate::config::settings::RatingSettings;
use crate::domain::{NewMatch, PlayerState};
use crate::errors::{LadderError, LadderResult};

/// Applies match results to player states
#[derive(Debug, Clone)]
pub struct RatingEngine {
    settings: RatingSettings,
}

/// Everything one side of a match needs to compute its rating change
struct SideInput<'a> {
    state: &'a PlayerState,
    rating: i32,
    opponent_rating: i32,
    outcome: Outcome,
    margin: i32,
    goals_for: u32,
    goals_against: u32,
    protected: bool,
}

impl RatingEngine {
    pub fn new(settings: RatingSettings) -> Self {
        Self { settings }
    }

    /// Computes the new winner and loser states for `game`.
    ///
    /// Both states are produced together or not at all; the inputs are never
    /// modified.
    pub fn apply_match(
        &self,
        game: &NewMatch,
        winner: &PlayerState,
        loser: &PlayerState,
    ) -> LadderResult<(PlayerState, PlayerState)> {
        game.validate()?;
        Self::check_state(game, winner, &game.winner)?;
        Self::check_state(game, loser, &game.loser)?;

        let winner_rating = self.effective_rating(winner);
        let loser_rating = self.effective_rating(loser);

        // Only an established loser beaten by a provisional winner is protected.
        let loser_protected = winner.is_provisional && !loser.is_provisional;

        let new_winner = self.apply_side(SideInput {
            state: winner,
            rating: winner_rating,
            opponent_rating: loser_rating,
            outcome: Outcome::for_winner(game.tie),
            margin: game.winner_margin(),
            goals_for: game.winner_score,
            goals_against: game.loser_score,
            protected: false,
        })?;
        let new_loser = self.apply_side(SideInput {
            state: loser,
            rating: loser_rating,
            opponent_rating: winner_rating,
            outcome: Outcome::for_loser(game.tie),
            margin: game.loser_margin(),
            goals_for: game.loser_score,
            goals_against: game.winner_score,
            protected: loser_protected,
        })?;

        debug!(
            "Rated {} vs {} ({}-{}{}): {} {:+} -> {}, {} {:+} -> {}",
            game.winner,
            game.loser,
            game.winner_score,
            game.loser_score,
            if game.tie { ", tie" } else { "" },
            new_winner.player_id,
            new_winner.rating_change,
            new_winner.rating,
            new_loser.player_id,
            new_loser.rating_change,
            new_loser.rating,
        );

        Ok((new_winner, new_loser))
    }

    /// Stored rating, with the never-rated sentinel 0 replaced by the default rating
    pub fn effective_rating(&self, state: &PlayerState) -> i32 {
        if state.is_rated() {
            state.rating
        } else {
            self.settings.default_rating
        }
    }

    pub fn is_provisional(&self, games_played: u32) -> bool {
        games_played < self.settings.provisional_games
    }

    fn apply_side(&self, side: SideInput<'_>) -> LadderResult<PlayerState> {
        let delta = rating_delta(
            side.rating,
            side.opponent_rating,
            side.outcome,
            side.margin,
            side.protected,
            &self.settings,
        );
        let change = applied_change(delta);

        let mut next = side.state.clone();
        next.rating = side.rating.checked_add(change).ok_or_else(|| {
            LadderError::invalid_match(format!(
                "rating of {} would overflow ({} {:+})",
                side.state.player_id, side.rating, change
            ))
        })?;
        next.rating_change = change;
        next.goals_for = next.goals_for.saturating_add(side.goals_for);
        next.goals_against = next.goals_against.saturating_add(side.goals_against);
        match side.outcome {
            Outcome::Win => next.wins += 1,
            Outcome::Draw => next.draws += 1,
            Outcome::Loss => next.losses += 1,
        }
        // Once established a player never becomes provisional again.
        next.is_provisional = side.state.is_provisional && self.is_provisional(next.games_played());
        Ok(next)
    }

    fn check_state(game: &NewMatch, state: &PlayerState, expected_id: &str) -> LadderResult<()> {
        if state.league != game.league || state.player_id != expected_id {
            return Err(LadderError::invalid_match(format!(
                "state of {}/{} does not belong to {} in league {}",
                state.league, state.player_id, expected_id, game.league
            )));
        }
        Ok(())
    }
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self::new(RatingSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAGUE: &str = "fifadev";

    fn player(id: &str, rating: i32, games: u32) -> PlayerState {
        let mut state = PlayerState::new(LEAGUE, id);
        state.rating = rating;
        state.wins = games;
        state.is_provisional = games < 6;
        state
    }

    #[test]
    fn test_unrated_players_three_nil() {
        let engine = RatingEngine::default();
        let game = NewMatch::new(LEAGUE, "a", "b", 3, 0);

        let (a, b) = engine
            .apply_match(&game, &PlayerState::new(LEAGUE, "a"), &PlayerState::new(LEAGUE, "b"))
            .unwrap();

        assert_eq!(a.rating, 1543);
        assert_eq!(a.rating_change, 43);
        assert_eq!(b.rating, 1475);
        assert_eq!(b.rating_change, -25);
        assert_eq!((a.wins, a.losses, a.goals_for, a.goals_against), (1, 0, 3, 0));
        assert_eq!((b.wins, b.losses, b.goals_for, b.goals_against), (0, 1, 0, 3));
    }

    #[test]
    fn test_tie_between_equal_players_changes_nothing() {
        let engine = RatingEngine::default();
        let game = NewMatch::new(LEAGUE, "a", "b", 1, 1).tied();

        let (a, b) = engine
            .apply_match(&game, &player("a", 1500, 0), &player("b", 1500, 0))
            .unwrap();

        assert_eq!((a.rating, a.rating_change, a.draws), (1500, 0, 1));
        assert_eq!((b.rating, b.rating_change, b.draws), (1500, 0, 1));
        assert_eq!(a.wins + a.losses + b.wins + b.losses, 0);
        assert_eq!((a.goals_for, a.goals_against), (1, 1));
    }

    #[test]
    fn test_established_loser_protected_against_provisional_winner() {
        let engine = RatingEngine::default();
        let game = NewMatch::new(LEAGUE, "rookie", "veteran", 1, 0);

        let (rookie, veteran) = engine
            .apply_match(&game, &player("rookie", 1500, 0), &player("veteran", 1500, 6))
            .unwrap();

        assert_eq!(rookie.rating_change, 25);
        assert_eq!(veteran.rating_change, -12);
    }

    #[test]
    fn test_no_protection_when_both_provisional() {
        let engine = RatingEngine::default();
        let game = NewMatch::new(LEAGUE, "a", "b", 1, 0);

        let (_, b) = engine
            .apply_match(&game, &player("a", 1500, 0), &player("b", 1500, 2))
            .unwrap();

        assert_eq!(b.rating_change, -25);
    }

    #[test]
    fn test_no_protection_for_provisional_loser_against_established_winner() {
        let engine = RatingEngine::default();
        let game = NewMatch::new(LEAGUE, "veteran", "rookie", 1, 0);

        let (veteran, rookie) = engine
            .apply_match(&game, &player("veteran", 1500, 10), &player("rookie", 1500, 0))
            .unwrap();

        assert_eq!(veteran.rating_change, 25);
        assert_eq!(rookie.rating_change, -25);
    }

    #[test]
    fn test_margin_bonus_only_amplifies_winner() {
        let engine = RatingEngine::default();
        let narrow = NewMatch::new(LEAGUE, "a", "b", 1, 0);
        let wide = NewMatch::new(LEAGUE, "a", "b", 3, 0);
        let a = player("a", 1500, 10);
        let b = player("b", 1500, 10);

        let (narrow_a, narrow_b) = engine.apply_match(&narrow, &a, &b).unwrap();
        let (wide_a, wide_b) = engine.apply_match(&wide, &a, &b).unwrap();

        assert_eq!(narrow_a.rating_change, 25);
        assert_eq!(wide_a.rating_change, 43);
        assert_eq!(narrow_b.rating_change, wide_b.rating_change);
        assert_eq!(wide_b.rating_change, -25);
    }

    #[test]
    fn test_tie_with_uneven_labels_uses_winner_margin() {
        // Scores on a tie are still stored highest first; the margin bonus follows the label.
        let engine = RatingEngine::default();
        let game = NewMatch::new(LEAGUE, "a", "b", 2, 0).tied();

        let (a, b) = engine
            .apply_match(&game, &player("a", 1400, 10), &player("b", 1600, 10))
            .unwrap();

        assert!(a.rating_change > 0);
        assert!(b.rating_change < 0);
        assert!(a.rating_change.abs() > b.rating_change.abs());
    }

    #[test]
    fn test_provisional_ends_at_sixth_game_and_stays_off() {
        let engine = RatingEngine::default();
        let mut a = PlayerState::new(LEAGUE, "a");
        let mut b = PlayerState::new(LEAGUE, "b");

        for game_number in 1..=12u32 {
            let game = if game_number % 2 == 0 {
                NewMatch::new(LEAGUE, "a", "b", 2, 1)
            } else {
                NewMatch::new(LEAGUE, "b", "a", 1, 0)
            };
            let (next_a, next_b) = if game.winner == "a" {
                engine.apply_match(&game, &a, &b).unwrap()
            } else {
                let (w, l) = engine.apply_match(&game, &b, &a).unwrap();
                (l, w)
            };
            a = next_a;
            b = next_b;

            assert_eq!(a.games_played(), game_number);
            assert_eq!(a.is_provisional, game_number < 6, "after game {game_number}");
            assert_eq!(b.is_provisional, game_number < 6, "after game {game_number}");
        }
    }

    #[test]
    fn test_established_state_never_reverts() {
        let engine = RatingEngine::new(RatingSettings {
            provisional_games: 20,
            ..RatingSettings::default()
        });
        let mut established = player("a", 1500, 8);
        established.is_provisional = false;

        let game = NewMatch::new(LEAGUE, "a", "b", 1, 0);
        let (a, _) = engine
            .apply_match(&game, &established, &player("b", 1500, 0))
            .unwrap();

        assert!(!a.is_provisional);
    }

    #[test]
    fn test_self_match_is_refused() {
        let engine = RatingEngine::default();
        let state = player("a", 1500, 3);
        let game = NewMatch::new(LEAGUE, "a", "a", 1, 0);

        let result = engine.apply_match(&game, &state, &state);

        assert!(matches!(result, Err(LadderError::InvalidMatch(_))));
        assert_eq!(state, player("a", 1500, 3));
    }

    #[test]
    fn test_huge_score_is_refused_without_panicking() {
        let engine = RatingEngine::default();
        let game = NewMatch::new(LEAGUE, "a", "b", 1_000_000_000, 0);

        let result = engine.apply_match(&game, &PlayerState::new(LEAGUE, "a"), &PlayerState::new(LEAGUE, "b"));

        assert!(matches!(result, Err(LadderError::InvalidMatch(_))));
    }

    #[test]
    fn test_rating_overflow_is_refused() {
        let engine = RatingEngine::default();
        let game = NewMatch::new(LEAGUE, "a", "b", 1, 0);
        let near_limit = i32::MAX - 10;

        let result = engine.apply_match(&game, &player("a", near_limit, 10), &player("b", near_limit, 10));

        assert!(matches!(result, Err(LadderError::InvalidMatch(_))));
    }

    #[test]
    fn test_mismatched_state_is_refused() {
        let engine = RatingEngine::default();
        let game = NewMatch::new(LEAGUE, "a", "b", 1, 0);
        let other_league = PlayerState::new("other", "b");

        let result = engine.apply_match(&game, &player("a", 1500, 0), &other_league);

        assert!(matches!(result, Err(LadderError::InvalidMatch(_))));
    }

    #[test]
    fn test_default_rating_is_configurable() {
        let engine = RatingEngine::new(RatingSettings {
            default_rating: 1000,
            ..RatingSettings::default()
        });
        let game = NewMatch::new(LEAGUE, "a", "b", 1, 0);

        let (a, b) = engine
            .apply_match(&game, &PlayerState::new(LEAGUE, "a"), &PlayerState::new(LEAGUE, "b"))
            .unwrap();

        assert_eq!(a.rating, 1025);
        assert_eq!(b.rating, 975);
    }
}

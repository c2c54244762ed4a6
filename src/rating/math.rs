//! Elo rating formulas, based on the World Football Elo Ratings:
//!
//! `Rn = Ro + K × (W - We)` where `K` is the match weight, `W` the result
//! (1 win, 0.5 draw, 0 loss) and `We` the expected result.

use super::types::Outcome;
use crate::config::settings::RatingSettings;

/// Expected result of a player rated `rating` against `opponent_rating`, in (0, 1)
pub fn expected_result(rating: i32, opponent_rating: i32, divisor: f64) -> f64 {
    let exponent = f64::from(opponent_rating - rating) / divisor;
    1.0 / (1.0 + 10f64.powf(exponent))
}

/// Match weight for one side given its signed goal margin.
///
/// Only a positive margin of 2 or more raises the weight, so the losing side
/// always gets the base weight.
pub fn match_weight(margin: i32, base_weight: f64) -> f64 {
    if margin >= 4 {
        base_weight * (1.75 + f64::from(margin - 3) / 8.0)
    } else if margin >= 3 {
        base_weight * 1.75
    } else if margin >= 2 {
        base_weight * 1.5
    } else {
        base_weight
    }
}

pub fn rating_delta(
    rating: i32,
    opponent_rating: i32,
    outcome: Outcome,
    margin: i32,
    protected: bool,
    settings: &RatingSettings,
) -> f64 {
    let expected = expected_result(rating, opponent_rating, settings.rating_divisor);
    let weight = match_weight(margin, settings.match_weight);
    let divisor = if protected {
        settings.protection_divisor
    } else {
        1.0
    };
    (outcome.score() - expected) * weight / divisor
}

/// Integer change actually applied to a rating, truncated toward zero
pub fn applied_change(delta: f64) -> i32 {
    delta.trunc() as i32
}

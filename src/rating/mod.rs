pub mod engine;
pub mod math;
pub mod ranking;
pub mod types;

pub use engine::RatingEngine;
pub use math::{applied_change, expected_result, match_weight, rating_delta};
pub use ranking::{LadderRow, RankedPlayer, leaderboard, rank};
pub use types::{ConfidenceLevel, Outcome};

pub mod models;
pub mod report;

pub use models::{League, MatchResult, NewMatch, PlayerState, display_name};
pub use report::{MatchReport, RawScore, ReportedOutcome};

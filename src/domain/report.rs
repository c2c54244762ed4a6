use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::models::NewMatch;
use crate::errors::{LadderError, LadderResult};

/// Outcome as seen by the reporting player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportedOutcome {
    Win,
    Loss,
    Draw,
}

impl FromStr for ReportedOutcome {
    type Err = LadderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "win" => Ok(ReportedOutcome::Win),
            "loss" | "lose" => Ok(ReportedOutcome::Loss),
            "draw" | "tie" => Ok(ReportedOutcome::Draw),
            other => Err(LadderError::invalid_match(format!("unknown outcome {:?}", other))),
        }
    }
}

/// A score exactly as submitted, either a JSON number or form text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Number(i64),
    Text(String),
    /// Anything else (fractions, booleans, null); never a valid score
    Other(serde_json::Value),
}

impl RawScore {
    fn parse(&self, field: &str) -> LadderResult<u32> {
        match self {
            RawScore::Number(n) => u32::try_from(*n)
                .map_err(|_| LadderError::invalid_match(format!("{field} must be a non-negative integer, got {n}"))),
            RawScore::Text(text) => text.trim().parse::<u32>().map_err(|_| {
                LadderError::invalid_match(format!(
                    "{field} must be a non-negative integer, got {text:?}"
                ))
            }),
            RawScore::Other(value) => Err(LadderError::invalid_match(format!(
                "{field} must be a non-negative integer, got {value}"
            ))),
        }
    }
}

impl From<u32> for RawScore {
    fn from(score: u32) -> Self {
        RawScore::Number(i64::from(score))
    }
}

impl From<&str> for RawScore {
    fn from(score: &str) -> Self {
        RawScore::Text(score.to_string())
    }
}

/// Match submission from one of the two players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub reporter: String,
    pub opponent: String,
    pub outcome: String,
    pub reporter_score: RawScore,
    pub opponent_score: RawScore,
    #[serde(default)]
    pub reporter_team: Option<String>,
    #[serde(default)]
    pub opponent_team: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl MatchReport {
    /// Turns the submission into a match for `league`.
    ///
    /// The higher score is always recorded as the winner score, even on a
    /// draw. On a win the reporter is the winner, otherwise the opponent is.
    pub fn into_match(&self, league: &str) -> LadderResult<NewMatch> {
        let outcome: ReportedOutcome = self.outcome.parse()?;
        let reporter_score = self.reporter_score.parse("reporter score")?;
        let opponent_score = self.opponent_score.parse("opponent score")?;

        let reporter = self.reporter.trim();
        let opponent = self.opponent.trim();
        if reporter.is_empty() || opponent.is_empty() {
            return Err(LadderError::invalid_match("both players must be named"));
        }

        let reporter_team = non_empty(&self.reporter_team);
        let opponent_team = non_empty(&self.opponent_team);

        let (winner, loser, winner_team, loser_team) = match outcome {
            ReportedOutcome::Win => (reporter, opponent, reporter_team, opponent_team),
            ReportedOutcome::Loss | ReportedOutcome::Draw => {
                (opponent, reporter, opponent_team, reporter_team)
            }
        };

        let game = NewMatch {
            league: league.to_string(),
            winner: winner.to_string(),
            loser: loser.to_string(),
            tie: outcome == ReportedOutcome::Draw,
            winner_score: reporter_score.max(opponent_score),
            loser_score: reporter_score.min(opponent_score),
            winner_team,
            loser_team,
            comment: non_empty(&self.comment),
        };
        game.validate()?;
        Ok(game)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: &str, reporter_score: RawScore, opponent_score: RawScore) -> MatchReport {
        MatchReport {
            reporter: "ann".to_string(),
            opponent: "bob".to_string(),
            outcome: outcome.to_string(),
            reporter_score,
            opponent_score,
            reporter_team: Some("Arsenal".to_string()),
            opponent_team: Some("  ".to_string()),
            comment: None,
        }
    }

    #[test]
    fn test_win_makes_reporter_the_winner() {
        let game = report("win", 3.into(), 1.into()).into_match("fifadev").unwrap();
        assert_eq!(game.winner, "ann");
        assert_eq!(game.loser, "bob");
        assert_eq!((game.winner_score, game.loser_score), (3, 1));
        assert_eq!(game.winner_team.as_deref(), Some("Arsenal"));
        assert_eq!(game.loser_team, None);
        assert!(!game.tie);
    }

    #[test]
    fn test_loss_makes_opponent_the_winner_with_higher_score() {
        let game = report("loss", "0".into(), "2".into()).into_match("fifadev").unwrap();
        assert_eq!(game.winner, "bob");
        assert_eq!(game.loser, "ann");
        assert_eq!((game.winner_score, game.loser_score), (2, 0));
        assert_eq!(game.loser_team.as_deref(), Some("Arsenal"));
    }

    #[test]
    fn test_draw_sets_tie() {
        let game = report("draw", 1.into(), 1.into()).into_match("fifadev").unwrap();
        assert!(game.tie);
        assert_eq!(game.winner, "bob");
    }

    #[test]
    fn test_non_numeric_score_is_rejected() {
        let result = report("win", "three".into(), 1.into()).into_match("fifadev");
        assert!(matches!(result, Err(LadderError::InvalidMatch(_))));
    }

    #[test]
    fn test_empty_score_is_not_coerced_to_zero() {
        let result = report("win", 1.into(), "".into()).into_match("fifadev");
        assert!(matches!(result, Err(LadderError::InvalidMatch(_))));
    }

    #[test]
    fn test_negative_score_is_rejected() {
        let result = report("win", RawScore::Number(-1), 0.into()).into_match("fifadev");
        assert!(matches!(result, Err(LadderError::InvalidMatch(_))));
        let result = report("win", "-1".into(), 0.into()).into_match("fifadev");
        assert!(matches!(result, Err(LadderError::InvalidMatch(_))));
    }

    #[test]
    fn test_draw_with_different_scores_keeps_higher_score_first() {
        let game = report("draw", 2.into(), 1.into()).into_match("fifadev").unwrap();
        assert!(game.tie);
        assert_eq!(game.winner, "bob");
        assert_eq!((game.winner_score, game.loser_score), (2, 1));
    }

    #[test]
    fn test_fractional_and_null_scores_are_invalid() {
        for score in ["2.5", "true", "null"] {
            let json = format!(
                r#"{{"reporter":"ann","opponent":"bob","outcome":"win","reporterScore":{score},"opponentScore":0}}"#
            );
            let parsed: MatchReport = serde_json::from_str(&json).unwrap();
            assert!(matches!(parsed.into_match("fifadev"), Err(LadderError::InvalidMatch(_))));
        }
    }

    #[test]
    fn test_unknown_outcome_is_rejected() {
        let result = report("forfeit", 1.into(), 0.into()).into_match("fifadev");
        assert!(matches!(result, Err(LadderError::InvalidMatch(_))));
    }

    #[test]
    fn test_self_report_is_rejected() {
        let mut self_report = report("win", 1.into(), 0.into());
        self_report.opponent = "ann".to_string();
        assert!(matches!(
            self_report.into_match("fifadev"),
            Err(LadderError::InvalidMatch(_))
        ));
    }

    #[test]
    fn test_deserializes_numbers_and_strings() {
        let json = r#"{"reporter":"ann","opponent":"bob","outcome":"win","reporterScore":"4","opponentScore":2}"#;
        let parsed: MatchReport = serde_json::from_str(json).unwrap();
        let game = parsed.into_match("fifadev").unwrap();
        assert_eq!((game.winner_score, game.loser_score), (4, 2));
    }
}

use serde::{Deserialize, Serialize};

/// Result of a match from one side's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn score(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Draw => 0.5,
            Outcome::Loss => 0.0,
        }
    }

    pub fn for_winner(tie: bool) -> Self {
        if tie { Outcome::Draw } else { Outcome::Win }
    }

    pub fn for_loser(tie: bool) -> Self {
        if tie { Outcome::Draw } else { Outcome::Loss }
    }
}

/// Lifecycle stage derived from games played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Provisional,
    Established,
}

impl ConfidenceLevel {
    pub fn from_provisional(is_provisional: bool) -> Self {
        if is_provisional {
            ConfidenceLevel::Provisional
        } else {
            ConfidenceLevel::Established
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConfidenceLevel::Provisional => "provisional",
            ConfidenceLevel::Established => "established",
        }
    }
}

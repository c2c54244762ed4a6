//! Persistence port used by the ladder services.
//!
//! Every listing is complete: no implementation may cap the number of rows
//! it returns unless the caller asks for a limit.

pub mod memory;
pub mod sqlite;

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::domain::{League, MatchResult, NewMatch, PlayerState};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOrder {
    /// Oldest first
    Asc,
    /// Newest first
    Desc,
}

/// Position of a match in its league history, used for keyset paging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchCursor {
    pub created_at: DateTime<Utc>,
    pub id: i64,
}

impl MatchCursor {
    pub fn of(game: &MatchResult) -> Self {
        Self {
            created_at: game.created_at,
            id: game.id,
        }
    }
}

pub trait LadderStore: Send + Sync {
    /// Records the league if it is not known yet
    fn ensure_league(&self, league: &str) -> Result<()>;

    fn league_exists(&self, league: &str) -> Result<bool>;

    fn list_leagues(&self) -> Result<Vec<League>>;

    fn get_player(&self, league: &str, player_id: &str) -> Result<Option<PlayerState>>;

    /// Inserts or updates one player, leaving its nickname untouched
    fn put_player(&self, state: &PlayerState) -> Result<()>;

    /// Writes all states in one transaction
    fn put_players(&self, states: &[PlayerState]) -> Result<()>;

    /// All players of the league, ordered by player id
    fn list_players(&self, league: &str) -> Result<Vec<PlayerState>>;

    /// Appends a match without touching any player
    fn put_match(&self, game: &NewMatch) -> Result<MatchResult>;

    /// Appends a match and writes both updated players in one transaction
    fn commit_match(
        &self,
        game: &NewMatch,
        winner: &PlayerState,
        loser: &PlayerState,
    ) -> Result<MatchResult>;

    fn list_matches(
        &self,
        league: &str,
        order: MatchOrder,
        limit: Option<usize>,
    ) -> Result<Vec<MatchResult>>;

    /// Up to `page_size` matches strictly after `after`, oldest first
    fn list_matches_after(
        &self,
        league: &str,
        after: Option<MatchCursor>,
        page_size: usize,
    ) -> Result<Vec<MatchResult>>;

    /// Matches the player took part in, newest first
    fn list_player_matches(&self, league: &str, player_id: &str) -> Result<Vec<MatchResult>>;

    /// Returns false when the player is not registered in the league
    fn set_nickname(&self, league: &str, player_id: &str, nickname: &str) -> Result<bool>;

    /// Nicknames by player id, for players that have one
    fn nicknames(&self, league: &str) -> Result<HashMap<String, String>>;
}

/// Creation time of a new match, at the microsecond precision the stores keep
pub(crate) fn creation_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

use super::{LadderStore, MatchCursor, MatchOrder, creation_timestamp};
use crate::domain::{League, MatchResult, NewMatch, PlayerState};

#[derive(Default)]
struct MemoryState {
    leagues: BTreeMap<String, DateTime<Utc>>,
    players: BTreeMap<(String, String), StoredPlayer>,
    matches: Vec<MatchResult>,
    next_match_id: i64,
}

struct StoredPlayer {
    state: PlayerState,
    nickname: Option<String>,
}

impl MemoryState {
    fn touch_league(&mut self, league: &str) {
        self.leagues.entry(league.to_string()).or_insert_with(Utc::now);
    }

    fn upsert_player(&mut self, state: &PlayerState) {
        self.touch_league(&state.league);
        let key = (state.league.clone(), state.player_id.clone());
        match self.players.get_mut(&key) {
            Some(stored) => stored.state = state.clone(),
            None => {
                self.players.insert(
                    key,
                    StoredPlayer {
                        state: state.clone(),
                        nickname: None,
                    },
                );
            }
        }
    }

    fn append_match(&mut self, game: &NewMatch) -> MatchResult {
        self.touch_league(&game.league);
        self.next_match_id += 1;
        let stored = MatchResult {
            id: self.next_match_id,
            created_at: creation_timestamp(),
            game: game.clone(),
        };
        self.matches.push(stored.clone());
        stored
    }

    fn league_matches<'a>(&'a self, league: &'a str) -> impl Iterator<Item = &'a MatchResult> + 'a {
        self.matches.iter().filter(move |m| m.game.league == league)
    }
}

/// Store kept entirely in process memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))
    }
}

impl LadderStore for MemoryStore {
    fn ensure_league(&self, league: &str) -> Result<()> {
        self.lock()?.touch_league(league);
        Ok(())
    }

    fn league_exists(&self, league: &str) -> Result<bool> {
        Ok(self.lock()?.leagues.contains_key(league))
    }

    fn list_leagues(&self) -> Result<Vec<League>> {
        Ok(self
            .lock()?
            .leagues
            .iter()
            .map(|(name, created_at)| League {
                name: name.clone(),
                created_at: *created_at,
            })
            .collect())
    }

    fn get_player(&self, league: &str, player_id: &str) -> Result<Option<PlayerState>> {
        let key = (league.to_string(), player_id.to_string());
        Ok(self.lock()?.players.get(&key).map(|p| p.state.clone()))
    }

    fn put_player(&self, state: &PlayerState) -> Result<()> {
        self.lock()?.upsert_player(state);
        Ok(())
    }

    fn put_players(&self, states: &[PlayerState]) -> Result<()> {
        let mut guard = self.lock()?;
        for state in states {
            guard.upsert_player(state);
        }
        Ok(())
    }

    fn list_players(&self, league: &str) -> Result<Vec<PlayerState>> {
        Ok(self
            .lock()?
            .players
            .values()
            .filter(|p| p.state.league == league)
            .map(|p| p.state.clone())
            .collect())
    }

    fn put_match(&self, game: &NewMatch) -> Result<MatchResult> {
        Ok(self.lock()?.append_match(game))
    }

    fn commit_match(
        &self,
        game: &NewMatch,
        winner: &PlayerState,
        loser: &PlayerState,
    ) -> Result<MatchResult> {
        let mut guard = self.lock()?;
        let stored = guard.append_match(game);
        guard.upsert_player(winner);
        guard.upsert_player(loser);
        Ok(stored)
    }

    fn list_matches(
        &self,
        league: &str,
        order: MatchOrder,
        limit: Option<usize>,
    ) -> Result<Vec<MatchResult>> {
        let guard = self.lock()?;
        let mut matches: Vec<MatchResult> = guard.league_matches(league).cloned().collect();
        matches.sort_by_key(MatchResult::history_key);
        if order == MatchOrder::Desc {
            matches.reverse();
        }
        if let Some(limit) = limit {
            matches.truncate(limit);
        }
        Ok(matches)
    }

    fn list_matches_after(
        &self,
        league: &str,
        after: Option<MatchCursor>,
        page_size: usize,
    ) -> Result<Vec<MatchResult>> {
        let guard = self.lock()?;
        let mut matches: Vec<MatchResult> = guard
            .league_matches(league)
            .filter(|m| after.is_none_or(|cursor| MatchCursor::of(m) > cursor))
            .cloned()
            .collect();
        matches.sort_by_key(MatchResult::history_key);
        matches.truncate(page_size);
        Ok(matches)
    }

    fn list_player_matches(&self, league: &str, player_id: &str) -> Result<Vec<MatchResult>> {
        let guard = self.lock()?;
        let mut matches: Vec<MatchResult> = guard
            .league_matches(league)
            .filter(|m| m.game.involves(player_id))
            .cloned()
            .collect();
        matches.sort_by_key(|m| std::cmp::Reverse(m.history_key()));
        Ok(matches)
    }

    fn set_nickname(&self, league: &str, player_id: &str, nickname: &str) -> Result<bool> {
        let key = (league.to_string(), player_id.to_string());
        let mut guard = self.lock()?;
        Ok(match guard.players.get_mut(&key) {
            Some(stored) => {
                stored.nickname = Some(nickname.to_string());
                true
            }
            None => false,
        })
    }

    fn nicknames(&self, league: &str) -> Result<HashMap<String, String>> {
        Ok(self
            .lock()?
            .players
            .values()
            .filter(|p| p.state.league == league)
            .filter_map(|p| {
                p.nickname
                    .as_ref()
                    .map(|nickname| (p.state.player_id.clone(), nickname.clone()))
            })
            .collect())
    }
}

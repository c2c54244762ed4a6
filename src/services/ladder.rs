use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{info, warn};
use serde::Serialize;

use super::recalculation::{RebuildSummary, RecalculationCoordinator};
use crate::config::settings::AppConfig;
use crate::domain::{League, MatchReport, MatchResult, NewMatch, PlayerState, display_name};
use crate::errors::{LadderError, LadderResult};
use crate::pagination::PaginationConfig;
use crate::rating::{LadderRow, RatingEngine, leaderboard, rank};
use crate::store::{LadderStore, MatchOrder};

/// A stored match with the player states it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedMatch {
    #[serde(rename = "match")]
    pub game: MatchResult,
    pub winner: PlayerState,
    pub loser: PlayerState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub display_name: String,
    pub rank: usize,
    pub state: PlayerState,
    /// Newest first
    pub matches: Vec<MatchResult>,
}

#[derive(Default)]
struct LeagueLock {
    rebuilding: AtomicBool,
    // The mutex guards no data, it only serializes writers of one league.
    writer: Mutex<()>,
}

impl LeagueLock {
    fn writer(&self) -> MutexGuard<'_, ()> {
        // Writes are transactional, so a writer that panicked left nothing half done.
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clears the rebuild flag on every exit path
struct RebuildFlag<'a>(&'a AtomicBool);

impl Drop for RebuildFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One writer per league; a rebuild excludes every other write to its league
#[derive(Default)]
pub struct LeagueLocks {
    leagues: Mutex<HashMap<String, Arc<LeagueLock>>>,
}

impl LeagueLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, league: &str) -> Arc<LeagueLock> {
        let mut leagues = self
            .leagues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        leagues.entry(league.to_string()).or_default().clone()
    }

    pub fn is_rebuilding(&self, league: &str) -> bool {
        let leagues = self
            .leagues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        leagues
            .get(league)
            .is_some_and(|lock| lock.rebuilding.load(Ordering::Acquire))
    }

    /// Number of leagues that have taken a lock so far
    pub fn tracked_leagues(&self) -> usize {
        self.leagues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Runs `f` as the league's only writer, unless a rebuild is in progress
    pub fn with_writer<T>(&self, league: &str, f: impl FnOnce() -> LadderResult<T>) -> LadderResult<T> {
        let lock = self.lock_for(league);
        if lock.rebuilding.load(Ordering::Acquire) {
            return Err(LadderError::ConcurrentRebuildInProgress(league.to_string()));
        }
        let _writer = lock.writer();
        f()
    }

    /// Runs `f` with the league flagged as rebuilding and no other writer active
    pub fn with_rebuild<T>(&self, league: &str, f: impl FnOnce() -> LadderResult<T>) -> LadderResult<T> {
        let lock = self.lock_for(league);
        if lock
            .rebuilding
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LadderError::ConcurrentRebuildInProgress(league.to_string()));
        }
        let _flag = RebuildFlag(&lock.rebuilding);
        let _writer = lock.writer();
        f()
    }
}

/// Entry point for everything that reads or changes a ladder
pub struct LadderService {
    store: Arc<dyn LadderStore>,
    engine: RatingEngine,
    pagination: PaginationConfig,
    locks: LeagueLocks,
}

impl LadderService {
    pub fn new(store: Arc<dyn LadderStore>, config: &AppConfig) -> Self {
        Self {
            store,
            engine: RatingEngine::new(config.rating.clone()),
            pagination: PaginationConfig::new().with_page_size(config.storage.history_page_size),
            locks: LeagueLocks::new(),
        }
    }

    pub fn locks(&self) -> &LeagueLocks {
        &self.locks
    }

    pub fn leagues(&self) -> LadderResult<Vec<League>> {
        Ok(self.store.list_leagues()?)
    }

    /// Adds the player to the league if it is not there yet
    pub fn register_player(
        &self,
        league: &str,
        player_id: &str,
        nickname: Option<&str>,
    ) -> LadderResult<PlayerState> {
        let player_id = player_id.trim();
        if player_id.is_empty() {
            return Err(LadderError::invalid_match("player id must not be empty"));
        }

        let state = self.locks.with_writer(league, || {
            self.store.ensure_league(league)?;
            match self.store.get_player(league, player_id)? {
                Some(existing) => Ok(existing),
                None => {
                    let state = PlayerState::new(league, player_id);
                    self.store.put_player(&state)?;
                    info!("Registered player {} in league {}", player_id, league);
                    Ok(state)
                }
            }
        })?;

        if let Some(nickname) = nickname {
            self.set_nickname(league, player_id, nickname)?;
        }
        Ok(state)
    }

    pub fn set_nickname(&self, league: &str, player_id: &str, nickname: &str) -> LadderResult<()> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Ok(());
        }
        if !self.store.set_nickname(league, player_id, nickname)? {
            return Err(LadderError::player_not_found(league, player_id));
        }
        Ok(())
    }

    /// Parses a player's report and applies it
    pub fn report_match(&self, league: &str, report: &MatchReport) -> LadderResult<AppliedMatch> {
        let game = report.into_match(league)?;
        self.apply_match(&game)
    }

    /// Rates `game` and stores it together with both updated players
    pub fn apply_match(&self, game: &NewMatch) -> LadderResult<AppliedMatch> {
        game.validate()?;
        self.require_league(&game.league)?;

        let applied = self.locks.with_writer(&game.league, || {
            let winner = self.require_player(&game.league, &game.winner)?;
            let loser = self.require_player(&game.league, &game.loser)?;

            let (winner, loser) = self.engine.apply_match(game, &winner, &loser)?;
            let stored = self.store.commit_match(game, &winner, &loser)?;

            Ok(AppliedMatch {
                game: stored,
                winner,
                loser,
            })
        })?;

        info!(
            "Match {} in {}: {} {:+} ({}), {} {:+} ({})",
            applied.game.id,
            game.league,
            applied.winner.player_id,
            applied.winner.rating_change,
            applied.winner.rating,
            applied.loser.player_id,
            applied.loser.rating_change,
            applied.loser.rating,
        );
        Ok(applied)
    }

    /// Recomputes every rating of the league from its match history
    pub fn rebuild(&self, league: &str) -> LadderResult<RebuildSummary> {
        self.require_league(league)?;

        let result = self.locks.with_rebuild(league, || {
            RecalculationCoordinator::new(&self.engine, self.pagination).rebuild(self.store.as_ref(), league)
        });
        if let Err(e) = &result {
            warn!("Rebuild of league {} failed: {}", league, e);
        }
        result
    }

    pub fn leaderboard(&self, league: &str) -> LadderResult<Vec<LadderRow>> {
        self.require_league(league)?;
        let players = self.store.list_players(league)?;
        let nicknames = self.store.nicknames(league)?;
        Ok(leaderboard(players, &nicknames))
    }

    pub fn recent_matches(&self, league: &str, limit: usize) -> LadderResult<Vec<MatchResult>> {
        self.require_league(league)?;
        Ok(self.store.list_matches(league, MatchOrder::Desc, Some(limit))?)
    }

    pub fn player_summary(&self, league: &str, player_id: &str) -> LadderResult<PlayerSummary> {
        self.require_league(league)?;
        let state = self.require_player(league, player_id)?;

        let players = self.store.list_players(league)?;
        let position = rank(players)
            .into_iter()
            .find(|ranked| ranked.player.player_id == player_id)
            .map(|ranked| ranked.rank)
            .ok_or_else(|| LadderError::player_not_found(league, player_id))?;

        let nicknames = self.store.nicknames(league)?;
        let matches = self.store.list_player_matches(league, player_id)?;

        Ok(PlayerSummary {
            display_name: display_name(player_id, nicknames.get(player_id).map(String::as_str)),
            rank: position,
            state,
            matches,
        })
    }

    fn require_league(&self, league: &str) -> LadderResult<()> {
        if self.store.league_exists(league)? {
            Ok(())
        } else {
            Err(LadderError::LeagueNotFound(league.to_string()))
        }
    }

    fn require_player(&self, league: &str, player_id: &str) -> LadderResult<PlayerState> {
        self.store
            .get_player(league, player_id)?
            .ok_or_else(|| LadderError::player_not_found(league, player_id))
    }
}

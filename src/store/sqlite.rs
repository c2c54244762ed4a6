use std::collections::HashMap;

use anyhow::{Context, Result};

use super::{LadderStore, MatchCursor, MatchOrder, creation_timestamp};
use crate::database::{self, DbConn, DbPool};
use crate::domain::{League, MatchResult, NewMatch, PlayerState};
use crate::errors::store_context;

/// Store backed by an SQLite database behind an r2d2 pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Wraps the pool and makes sure the schema exists
    pub fn new(pool: DbPool) -> Result<Self> {
        let store = Self { pool };
        let conn = store.connection()?;
        database::setup::init_schema(&conn)?;
        Ok(store)
    }

    pub fn open(database_path: &str) -> Result<Self> {
        let pool = database::create_pool(database_path)?;
        Self::new(pool)
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(database::create_memory_pool()?)
    }

    /// Drops every league, player and match
    pub fn reset(&self) -> Result<()> {
        let conn = self.connection()?;
        database::setup::reset_database(&conn)
    }

    fn connection(&self) -> Result<DbConn> {
        database::get_connection(&self.pool)
    }
}

impl LadderStore for SqliteStore {
    fn ensure_league(&self, league: &str) -> Result<()> {
        let conn = self.connection()?;
        database::leagues::ensure_league(&conn, league)
    }

    fn league_exists(&self, league: &str) -> Result<bool> {
        let conn = self.connection()?;
        Ok(database::leagues::find_by_name(&conn, league)?.is_some())
    }

    fn list_leagues(&self) -> Result<Vec<League>> {
        let conn = self.connection()?;
        database::leagues::list_all(&conn)
    }

    fn get_player(&self, league: &str, player_id: &str) -> Result<Option<PlayerState>> {
        let conn = self.connection()?;
        database::players::find_player(&conn, league, player_id)
    }

    fn put_player(&self, state: &PlayerState) -> Result<()> {
        self.put_players(std::slice::from_ref(state))
    }

    fn put_players(&self, states: &[PlayerState]) -> Result<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction().context("Failed to start transaction")?;

        for state in states {
            database::leagues::ensure_league(&tx, &state.league)?;
            database::players::upsert_player(&tx, state)?;
        }

        tx.commit().context("Failed to commit player states")
    }

    fn list_players(&self, league: &str) -> Result<Vec<PlayerState>> {
        let conn = self.connection()?;
        database::players::list_by_league(&conn, league)
            .with_context(|| store_context("list players", league))
    }

    fn put_match(&self, game: &NewMatch) -> Result<MatchResult> {
        let mut conn = self.connection()?;
        let tx = conn.transaction().context("Failed to start transaction")?;

        database::leagues::ensure_league(&tx, &game.league)?;
        let stored = database::matches::insert_match(&tx, game, creation_timestamp())?;

        tx.commit().context("Failed to commit match")?;
        Ok(stored)
    }

    fn commit_match(
        &self,
        game: &NewMatch,
        winner: &PlayerState,
        loser: &PlayerState,
    ) -> Result<MatchResult> {
        let mut conn = self.connection()?;
        let tx = conn.transaction().context("Failed to start transaction")?;

        database::leagues::ensure_league(&tx, &game.league)?;
        let stored = database::matches::insert_match(&tx, game, creation_timestamp())?;
        database::players::upsert_player(&tx, winner)?;
        database::players::upsert_player(&tx, loser)?;

        tx.commit()
            .with_context(|| store_context("commit match", &game.league))?;
        Ok(stored)
    }

    fn list_matches(
        &self,
        league: &str,
        order: MatchOrder,
        limit: Option<usize>,
    ) -> Result<Vec<MatchResult>> {
        let conn = self.connection()?;
        database::matches::list_by_league(&conn, league, order, limit)
            .with_context(|| store_context("list matches", league))
    }

    fn list_matches_after(
        &self,
        league: &str,
        after: Option<MatchCursor>,
        page_size: usize,
    ) -> Result<Vec<MatchResult>> {
        let conn = self.connection()?;
        database::matches::list_page_after(&conn, league, after, page_size)
    }

    fn list_player_matches(&self, league: &str, player_id: &str) -> Result<Vec<MatchResult>> {
        let conn = self.connection()?;
        database::matches::list_by_player(&conn, league, player_id)
    }

    fn set_nickname(&self, league: &str, player_id: &str, nickname: &str) -> Result<bool> {
        let conn = self.connection()?;
        database::players::update_nickname(&conn, league, player_id, nickname)
    }

    fn nicknames(&self, league: &str) -> Result<HashMap<String, String>> {
        let conn = self.connection()?;
        database::players::list_nicknames(&conn, league)
    }
}

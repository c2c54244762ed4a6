use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::PlayerState;

const PLAYER_COLUMNS: &str = "league, player_id, rating, rating_change, wins, draws, losses, goals_for, goals_against, is_provisional";

/// Inserts the player or overwrites its rating columns; the nickname is kept
pub fn upsert_player(conn: &Connection, state: &PlayerState) -> Result<()> {
    let sql = "INSERT INTO players (league, player_id, rating, rating_change, wins, draws, losses, goals_for, goals_against, is_provisional) \
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
               ON CONFLICT (league, player_id) DO UPDATE SET \
                   rating = excluded.rating, \
                   rating_change = excluded.rating_change, \
                   wins = excluded.wins, \
                   draws = excluded.draws, \
                   losses = excluded.losses, \
                   goals_for = excluded.goals_for, \
                   goals_against = excluded.goals_against, \
                   is_provisional = excluded.is_provisional";

    conn.execute(
        sql,
        params![
            state.league,
            state.player_id,
            state.rating,
            state.rating_change,
            state.wins,
            state.draws,
            state.losses,
            state.goals_for,
            state.goals_against,
            state.is_provisional
        ],
    )
    .with_context(|| format!("Failed to upsert player {}", state.player_id))
    .map(|_| ())
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<PlayerState> {
    Ok(PlayerState {
        league: row.get(0)?,
        player_id: row.get(1)?,
        rating: row.get(2)?,
        rating_change: row.get(3)?,
        wins: row.get(4)?,
        draws: row.get(5)?,
        losses: row.get(6)?,
        goals_for: row.get(7)?,
        goals_against: row.get(8)?,
        is_provisional: row.get(9)?,
    })
}

pub fn find_player(conn: &Connection, league: &str, player_id: &str) -> Result<Option<PlayerState>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE league = ?1 AND player_id = ?2");

    conn.query_row(&sql, params![league, player_id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn list_by_league(conn: &Connection, league: &str) -> Result<Vec<PlayerState>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE league = ?1 ORDER BY player_id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![league], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn update_nickname(conn: &Connection, league: &str, player_id: &str, nickname: &str) -> Result<bool> {
    let sql = "UPDATE players SET nickname = ?3 WHERE league = ?1 AND player_id = ?2";

    let updated = conn
        .execute(sql, params![league, player_id, nickname])
        .context("Failed to update nickname")?;
    Ok(updated > 0)
}

pub fn list_nicknames(conn: &Connection, league: &str) -> Result<HashMap<String, String>> {
    let sql = "SELECT player_id, nickname FROM players WHERE league = ?1 AND nickname IS NOT NULL";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![league], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<HashMap<String, String>>>()?;

    Ok(rows)
}

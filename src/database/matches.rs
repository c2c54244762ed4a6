use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use crate::domain::{MatchResult, NewMatch};
use crate::store::{MatchCursor, MatchOrder};

const MATCH_COLUMNS: &str = "id, league, winner, loser, tie, winner_score, loser_score, winner_team, loser_team, comment, created_at_us";

pub fn insert_match(conn: &Connection, game: &NewMatch, created_at: DateTime<Utc>) -> Result<MatchResult> {
    let sql = format!(
        "INSERT INTO matches (league, winner, loser, tie, winner_score, loser_score, winner_team, loser_team, comment, created_at_us) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) RETURNING {MATCH_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            game.league,
            game.winner,
            game.loser,
            game.tie,
            game.winner_score,
            game.loser_score,
            game.winner_team,
            game.loser_team,
            game.comment,
            created_at.timestamp_micros()
        ],
        parse_match_row,
    )
    .context("Failed to insert match")
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<MatchResult> {
    let created_at_us: i64 = row.get(10)?;
    let created_at = DateTime::from_timestamp_micros(created_at_us).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            10,
            rusqlite::types::Type::Integer,
            anyhow!("timestamp out of range: {created_at_us}").into(),
        )
    })?;

    Ok(MatchResult {
        id: row.get(0)?,
        created_at,
        game: NewMatch {
            league: row.get(1)?,
            winner: row.get(2)?,
            loser: row.get(3)?,
            tie: row.get(4)?,
            winner_score: row.get(5)?,
            loser_score: row.get(6)?,
            winner_team: row.get(7)?,
            loser_team: row.get(8)?,
            comment: row.get(9)?,
        },
    })
}

pub fn list_by_league(
    conn: &Connection,
    league: &str,
    order: MatchOrder,
    limit: Option<usize>,
) -> Result<Vec<MatchResult>> {
    let direction = match order {
        MatchOrder::Asc => "ASC",
        MatchOrder::Desc => "DESC",
    };
    // LIMIT -1 means no limit in SQLite
    let limit = limit.map_or(-1, |l| l as i64);
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches WHERE league = ?1 \
         ORDER BY created_at_us {direction}, id {direction} LIMIT ?2"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![league, limit], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_page_after(
    conn: &Connection,
    league: &str,
    after: Option<MatchCursor>,
    page_size: usize,
) -> Result<Vec<MatchResult>> {
    let (after_us, after_id) = after
        .map(|c| (c.created_at.timestamp_micros(), c.id))
        .unwrap_or((i64::MIN, i64::MIN));
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches \
         WHERE league = ?1 AND (created_at_us > ?2 OR (created_at_us = ?2 AND id > ?3)) \
         ORDER BY created_at_us ASC, id ASC LIMIT ?4"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![league, after_us, after_id, page_size as i64], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read match history page")?;

    Ok(rows)
}

pub fn list_by_player(conn: &Connection, league: &str, player_id: &str) -> Result<Vec<MatchResult>> {
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches \
         WHERE league = ?1 AND (winner = ?2 OR loser = ?2) \
         ORDER BY created_at_us DESC, id DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![league, player_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

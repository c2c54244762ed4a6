use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::League;

pub fn ensure_league(conn: &Connection, name: &str) -> Result<()> {
    let sql = "INSERT INTO leagues (name, created_at) VALUES (?1, ?2) ON CONFLICT (name) DO NOTHING";

    conn.execute(sql, params![name, Utc::now()])
        .with_context(|| format!("Failed to record league {}", name))
        .map(|_| ())
}

fn parse_league_row(row: &rusqlite::Row) -> rusqlite::Result<League> {
    Ok(League {
        name: row.get(0)?,
        created_at: row.get(1)?,
    })
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<League>> {
    let sql = "SELECT name, created_at FROM leagues WHERE name = ?1";

    conn.query_row(sql, params![name], parse_league_row)
        .optional()
        .context("Failed to query league by name")
}

pub fn list_all(conn: &Connection) -> Result<Vec<League>> {
    let sql = "SELECT name, created_at FROM leagues ORDER BY name";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_league_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod pagination;
pub mod rating;
pub mod services;
pub mod store;

use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;
use log::info;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::domain::{MatchReport, MatchResult, RawScore};
use crate::rating::{ConfidenceLevel, LadderRow};
use crate::services::server::ServerService;
use crate::services::LadderService;
use crate::store::SqliteStore;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn open_service(config: &AppConfig) -> Result<LadderService> {
    let store = SqliteStore::open(&config.storage.database_path)?;
    Ok(LadderService::new(Arc::new(store), config))
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env()?;
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_init(reset: bool) -> Result<()> {
    let config = AppConfig::from_env()?;
    let store = SqliteStore::open(&config.storage.database_path)?;
    if reset {
        store.reset()?;
    }
    info!("Database ready at {}", config.storage.database_path);
    Ok(())
}

pub fn handle_join(league: &str, player_id: &str, nickname: Option<&str>) -> Result<()> {
    let service = open_service(&AppConfig::from_env()?)?;
    let state = service.register_player(league, player_id, nickname)?;
    println!("{} is registered in {}", state.player_id.bold(), league);
    Ok(())
}

pub fn handle_report(
    league: &str,
    reporter: &str,
    opponent: &str,
    outcome: &str,
    scores: (&str, &str),
    comment: Option<&str>,
) -> Result<()> {
    let service = open_service(&AppConfig::from_env()?)?;
    let report = MatchReport {
        reporter: reporter.to_string(),
        opponent: opponent.to_string(),
        outcome: outcome.to_string(),
        reporter_score: RawScore::from(scores.0),
        opponent_score: RawScore::from(scores.1),
        reporter_team: None,
        opponent_team: None,
        comment: comment.map(str::to_string),
    };

    let applied = service.report_match(league, &report)?;
    println!("Match #{} recorded", applied.game.id);
    for state in [&applied.winner, &applied.loser] {
        println!(
            "  {:<20} {:>5} {}",
            state.player_id,
            state.rating,
            format_change(state.rating_change)
        );
    }
    Ok(())
}

pub fn handle_rebuild(league: &str) -> Result<()> {
    let service = open_service(&AppConfig::from_env()?)?;
    let summary = service.rebuild(league)?;
    println!(
        "Rebuilt {}: {} players, {} matches replayed",
        summary.league, summary.players_reset, summary.matches_replayed
    );
    Ok(())
}

pub fn handle_ladder(league: &str) -> Result<()> {
    let service = open_service(&AppConfig::from_env()?)?;
    let rows = service.leaderboard(league)?;
    print_ladder(league, &rows);
    Ok(())
}

pub fn handle_player(league: &str, player_id: &str) -> Result<()> {
    let service = open_service(&AppConfig::from_env()?)?;
    let summary = service.player_summary(league, player_id)?;
    let state = &summary.state;

    println!("{} (#{} in {})", summary.display_name.bold(), summary.rank, league);
    println!(
        "  Rating {} {}  [{}]",
        state.rating,
        format_change(state.rating_change),
        ConfidenceLevel::from_provisional(state.is_provisional).as_str()
    );
    println!(
        "  W/D/L {}/{}/{}  Goals {}:{} ({:+})",
        state.wins,
        state.draws,
        state.losses,
        state.goals_for,
        state.goals_against,
        state.goal_difference()
    );
    for game in &summary.matches {
        println!("  {}", format_match(game));
    }
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

fn print_ladder(league: &str, rows: &[LadderRow]) {
    println!("{}", format!("=== {} ===", league).bold());
    println!(
        "{:>4}  {:<28} {:>6} {:>6} {:>4} {:>4} {:>4} {:>6}",
        "#", "Player", "Rating", "Change", "W", "D", "L", "GD"
    );
    for row in rows {
        let line = format!(
            "{:>4}  {:<28} {:>6} {:>6} {:>4} {:>4} {:>4} {:>+6}",
            row.rank,
            row.display_name,
            row.rating,
            format!("{:+}", row.rating_change),
            row.wins,
            row.draws,
            row.losses,
            row.goal_difference
        );
        if row.is_provisional {
            println!("{}", line.dimmed());
        } else if row.rating_change > 0 {
            println!("{}", line.green());
        } else if row.rating_change < 0 {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }
}

fn format_change(change: i32) -> colored::ColoredString {
    let text = format!("{:+}", change);
    match change {
        c if c > 0 => text.green(),
        c if c < 0 => text.red(),
        _ => text.normal(),
    }
}

fn format_match(game: &MatchResult) -> String {
    let separator = if game.game.tie { "draw" } else { "beat" };
    let mut line = format!(
        "{} {} {} {} {}-{}",
        game.created_at.format("%Y-%m-%d %H:%M"),
        game.game.winner,
        separator,
        game.game.loser,
        game.game.winner_score,
        game.game.loser_score
    );
    if let Some(comment) = &game.game.comment {
        line.push_str(&format!(" ({})", comment));
    }
    line
}

use anyhow::Result;

use game_ladder::cli::Command;
use game_ladder::{
    handle_completions, handle_init, handle_join, handle_ladder, handle_player, handle_rebuild,
    handle_report, handle_serve, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Init { reset } => handle_init(*reset),
        Command::Join {
            league,
            player_id,
            nickname,
        } => handle_join(league, player_id, nickname.as_deref()),
        Command::Report {
            league,
            reporter,
            opponent,
            outcome,
            reporter_score,
            opponent_score,
            comment,
        } => handle_report(
            league,
            reporter,
            opponent,
            outcome,
            (reporter_score.as_str(), opponent_score.as_str()),
            comment.as_deref(),
        ),
        Command::Rebuild { league } => handle_rebuild(league),
        Command::Ladder { league } => handle_ladder(league),
        Command::Player { league, player_id } => handle_player(league, player_id),
        Command::Completions { shell } => handle_completions(*shell),
    }
}

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "game-ladder rating backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Create the database schema
    Init {
        /// Drop all leagues, players and matches first
        #[arg(long)]
        reset: bool,
    },
    /// Register a player in a league
    Join {
        league: String,
        player_id: String,
        #[arg(short, long)]
        nickname: Option<String>,
    },
    /// Record a match as reported by one of its players
    Report {
        league: String,
        reporter: String,
        opponent: String,
        /// win, loss or draw, from the reporter's side
        outcome: String,
        reporter_score: String,
        opponent_score: String,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Recompute every rating of a league from its match history
    Rebuild { league: String },
    /// Print a league's leaderboard
    Ladder { league: String },
    /// Print one player's standing and matches
    Player { league: String, player_id: String },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

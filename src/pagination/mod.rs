pub mod config;
pub mod history;

pub use config::PaginationConfig;
pub use history::MatchHistory;

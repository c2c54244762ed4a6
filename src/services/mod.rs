pub mod ladder;
pub mod recalculation;
pub mod server;

pub use ladder::{AppliedMatch, LadderService, LeagueLocks, PlayerSummary};
pub use recalculation::{RebuildSummary, RecalculationCoordinator};
pub use server::ServerService;

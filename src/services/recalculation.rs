use std::collections::BTreeMap;

use log::info;
use serde::Serialize;

use crate::domain::PlayerState;
use crate::errors::{LadderError, LadderResult};
use crate::pagination::{MatchHistory, PaginationConfig};
use crate::rating::RatingEngine;
use crate::store::LadderStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildSummary {
    pub league: String,
    pub players_reset: usize,
    pub matches_replayed: usize,
}

/// Recomputes a league's ratings from scratch by replaying its match history
pub struct RecalculationCoordinator<'a> {
    engine: &'a RatingEngine,
    pagination: PaginationConfig,
}

impl<'a> RecalculationCoordinator<'a> {
    pub fn new(engine: &'a RatingEngine, pagination: PaginationConfig) -> Self {
        Self { engine, pagination }
    }

    /// Resets and replays the league, then replaces every stored player state
    /// in one write. Nothing is written if any step fails.
    pub fn rebuild(&self, store: &dyn LadderStore, league: &str) -> LadderResult<RebuildSummary> {
        info!("=== Rebuilding ratings of league {} ===", league);

        let (states, summary) = self.replay(store, league)?;
        store.put_players(&states)?;

        info!(
            "  → Replaced {} player states after {} matches",
            summary.players_reset, summary.matches_replayed
        );
        info!("=== Rebuild Complete ===");
        Ok(summary)
    }

    /// Computes the rebuilt states without writing them
    pub fn replay(
        &self,
        store: &dyn LadderStore,
        league: &str,
    ) -> LadderResult<(Vec<PlayerState>, RebuildSummary)> {
        let mut shadow = self.reset_players(store, league)?;
        let players_reset = shadow.len();
        info!("  → Reset {} players", players_reset);

        let mut matches_replayed = 0;
        for game in MatchHistory::new(store, league, self.pagination) {
            let game = game?;
            let winner = Self::take_state(&shadow, league, &game.game.winner)?;
            let loser = Self::take_state(&shadow, league, &game.game.loser)?;

            let (new_winner, new_loser) = self.engine.apply_match(&game.game, winner, loser)?;
            shadow.insert(new_winner.player_id.clone(), new_winner);
            shadow.insert(new_loser.player_id.clone(), new_loser);

            matches_replayed += 1;
            if matches_replayed % 1000 == 0 {
                info!("  Replayed {} matches", matches_replayed);
            }
        }

        let summary = RebuildSummary {
            league: league.to_string(),
            players_reset,
            matches_replayed,
        };
        Ok((shadow.into_values().collect(), summary))
    }

    fn reset_players(
        &self,
        store: &dyn LadderStore,
        league: &str,
    ) -> LadderResult<BTreeMap<String, PlayerState>> {
        let players = store.list_players(league)?;
        Ok(players
            .into_iter()
            .map(|mut state| {
                state.reset();
                (state.player_id.clone(), state)
            })
            .collect())
    }

    fn take_state<'s>(
        shadow: &'s BTreeMap<String, PlayerState>,
        league: &str,
        player_id: &str,
    ) -> LadderResult<&'s PlayerState> {
        shadow
            .get(player_id)
            .ok_or_else(|| LadderError::player_not_found(league, player_id))
    }
}

use anyhow::Result;
use log::debug;

use super::config::PaginationConfig;
use crate::domain::MatchResult;
use crate::store::{LadderStore, MatchCursor};

/// Iterator over a league's whole match history, oldest first.
///
/// Matches are fetched page by page until the store returns a short page, so
/// there is no upper bound on the history length.
pub struct MatchHistory<'a> {
    store: &'a dyn LadderStore,
    league: &'a str,
    config: PaginationConfig,
    cursor: Option<MatchCursor>,
    page: std::vec::IntoIter<MatchResult>,
    pages_fetched: usize,
    exhausted: bool,
}

impl<'a> MatchHistory<'a> {
    pub fn new(store: &'a dyn LadderStore, league: &'a str, config: PaginationConfig) -> Self {
        Self {
            store,
            league,
            config,
            cursor: None,
            page: Vec::new().into_iter(),
            pages_fetched: 0,
            exhausted: false,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_next_page(&mut self) -> Result<()> {
        let page = self
            .store
            .list_matches_after(self.league, self.cursor, self.config.page_size)?;
        self.pages_fetched += 1;
        debug!(
            "Fetched history page {} of league {} ({} matches)",
            self.pages_fetched,
            self.league,
            page.len()
        );

        self.exhausted = page.len() < self.config.page_size;
        self.page = page.into_iter();
        Ok(())
    }
}

impl Iterator for MatchHistory<'_> {
    type Item = Result<MatchResult>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(game) = self.page.next() {
                self.cursor = Some(MatchCursor::of(&game));
                return Some(Ok(game));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fetch_next_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewMatch;
    use crate::store::MemoryStore;

    fn store_with_matches(count: u32) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..count {
            store
                .put_match(&NewMatch::new("fifadev", "a", "b", i, 0))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_walks_every_page() {
        let store = store_with_matches(1203);
        let mut history = MatchHistory::new(&store, "fifadev", PaginationConfig::new().with_page_size(100));

        let scores: Vec<u32> = history
            .by_ref()
            .map(|m| m.unwrap().game.winner_score)
            .collect();

        assert_eq!(scores.len(), 1203);
        assert!(scores.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(history.pages_fetched(), 13);
    }

    #[test]
    fn test_exact_multiple_of_page_size_ends_with_empty_page() {
        let store = store_with_matches(4);
        let mut history = MatchHistory::new(&store, "fifadev", PaginationConfig::new().with_page_size(2));

        assert_eq!(history.by_ref().count(), 4);
        assert_eq!(history.pages_fetched(), 3);
    }

    #[test]
    fn test_empty_league() {
        let store = MemoryStore::new();
        let history = MatchHistory::new(&store, "fifadev", PaginationConfig::default());
        assert_eq!(history.count(), 0);
    }
}

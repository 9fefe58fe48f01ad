//! Leaderboard of finished runs
//!
//! Keeps the ten best scores, highest first. Persisted through a [`Store`].

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceError, Store, load_or_default};
use crate::sim::RunSummary;

/// Entries kept on the board
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level reached when the run ended
    pub level: u32,
    /// Distance covered in pixels
    pub distance: f32,
    /// Unix time (seconds)
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insertion index for `score`; ties rank below earlier entries
    fn slot_for(&self, score: u64) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }

    /// 1-based rank the score would get, `None` if it would not make the board
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let slot = self.slot_for(score);
        (slot < MAX_HIGH_SCORES).then_some(slot + 1)
    }

    pub fn qualifies(&self, score: u64) -> bool {
        self.potential_rank(score).is_some()
    }

    /// Record a finished run. Returns its 1-based rank if it made the board.
    pub fn record(&mut self, score: u64, summary: &RunSummary, timestamp: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                level: summary.level,
                distance: summary.distance,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("New high score {score} at rank {rank}");
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn load<S: Store<HighScores> + ?Sized>(store: &S) -> Self {
        let scores: HighScores = load_or_default(store);
        log::info!("Leaderboard has {} entries", scores.entries.len());
        scores
    }

    pub fn save<S: Store<HighScores> + ?Sized>(&self, store: &mut S) -> Result<(), PersistenceError> {
        store.save(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn summary(level: u32) -> RunSummary {
        RunSummary {
            level,
            distance: 1234.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_sorted_descending() {
        let mut board = HighScores::new();
        assert_eq!(board.record(100, &summary(1), 1), Some(1));
        assert_eq!(board.record(300, &summary(3), 2), Some(1));
        assert_eq!(board.record(200, &summary(2), 3), Some(2));
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);
        assert_eq!(board.top_score(), Some(300));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let board = HighScores::new();
        assert!(!board.qualifies(0));
        assert!(board.qualifies(1));
    }

    #[test]
    fn test_board_is_capped() {
        let mut board = HighScores::new();
        for score in 1..=MAX_HIGH_SCORES as u64 {
            board.record(score * 10, &summary(1), score);
        }
        assert!(!board.qualifies(5));
        // Tie with the lowest entry does not displace it
        assert!(!board.qualifies(10));
        assert_eq!(board.record(55, &summary(4), 99), Some(6));
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_persisted_through_store() {
        let mut store = MemoryStore::new();
        let mut board = HighScores::load(&store);
        assert!(board.is_empty());
        board.record(420, &summary(5), 7);
        board.save(&mut store).unwrap();
        let reloaded = HighScores::load(&store);
        assert_eq!(reloaded, board);
        assert_eq!(reloaded.entries[0].level, 5);
    }
}

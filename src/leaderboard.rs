//! Per-game leaderboards
//!
//! Persisted to the key-value store, one document per game, top 10 scores.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::game::{GameId, UnknownGame};
use crate::persistence::{self, keys};
use crate::platform::KeyValueStore;
use crate::platform::time::MS_PER_DAY;

/// Maximum number of entries kept per game
pub const MAX_ENTRIES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Score (higher is better)
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub date: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moves: Option<u32>,
}

impl LeaderboardEntry {
    pub fn new(score: u64, date: f64) -> Self {
        Self {
            score,
            date,
            level: None,
            moves: None,
        }
    }
}

/// Where a submitted entry landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// 1-based rank, `None` if the entry fell off the board
    pub rank: Option<usize>,
    pub is_top_score: bool,
    pub is_top3: bool,
    pub is_top10: bool,
}

impl Placement {
    fn from_rank(rank: Option<usize>) -> Self {
        Self {
            rank,
            is_top_score: rank == Some(1),
            is_top3: rank.is_some_and(|r| r <= 3),
            is_top10: rank.is_some_and(|r| r <= MAX_ENTRIES),
        }
    }
}

/// One game's leaderboard, sorted descending by score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// True if the score would take first place
    pub fn is_top_score(&self, score: u64) -> bool {
        self.entries.first().is_none_or(|e| score > e.score)
    }

    /// Check if a score would make it onto the board (zero never does)
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Insert an entry, keep the top 10 and report its placement
    ///
    /// Ties rank below entries already on the board. The rank is taken from
    /// the insertion index, never by searching for an equal entry afterwards.
    pub fn submit(&mut self, entry: LeaderboardEntry) -> Placement {
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);

        let rank = (pos < MAX_ENTRIES).then_some(pos + 1);
        Placement::from_rank(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Re-establish ordering and size after loading a hand-edited document
    fn normalize(&mut self) {
        // Stable sort keeps earlier submissions ahead on ties
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }
}

/// Persisted leaderboards for every game
pub struct LeaderboardStore {
    store: Rc<dyn KeyValueStore>,
}

impl LeaderboardStore {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load a game's leaderboard (empty when missing or corrupt)
    pub fn leaderboard(&self, game: GameId) -> Leaderboard {
        let mut board: Leaderboard =
            persistence::load_or_default(self.store.as_ref(), &keys::leaderboard(game));
        board.normalize();
        board
    }

    pub fn entries(&self, game: GameId) -> Vec<LeaderboardEntry> {
        self.leaderboard(game).entries
    }

    /// Add an entry and persist the trimmed board
    pub fn submit(&self, game: GameId, entry: LeaderboardEntry) -> Placement {
        let mut board = self.leaderboard(game);
        let placement = board.submit(entry);
        persistence::save_logged(self.store.as_ref(), &keys::leaderboard(game), &board);
        log::info!(
            "{} leaderboard: rank {:?} ({} entries)",
            game,
            placement.rank,
            board.len()
        );
        placement
    }

    /// Submit by string id; unknown ids change nothing
    pub fn submit_named(
        &self,
        game: &str,
        entry: LeaderboardEntry,
    ) -> Result<Placement, UnknownGame> {
        let game: GameId = game
            .parse()
            .inspect_err(|e| log::warn!("Not submitting score: {e}"))?;
        Ok(self.submit(game, entry))
    }

    pub fn is_top_score(&self, game: GameId, score: u64) -> bool {
        self.leaderboard(game).is_top_score(score)
    }

    pub fn qualifies(&self, game: GameId, score: u64) -> bool {
        self.leaderboard(game).qualifies(score)
    }

    /// Empty a game's leaderboard
    pub fn clear(&self, game: GameId) -> bool {
        match self.store.remove(&keys::leaderboard(game)) {
            Ok(()) => {
                log::info!("{game} leaderboard cleared");
                true
            }
            Err(e) => {
                log::error!("Failed to clear {game} leaderboard: {e}");
                false
            }
        }
    }
}

/// Format a timestamp as a relative date string
pub fn format_date(timestamp: f64, now: f64) -> String {
    let diff_secs = (now - timestamp) / 1000.0;
    let diff_mins = diff_secs / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = (now - timestamp) / MS_PER_DAY;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else if days < 30 {
            format!("{} weeks ago", days / 7)
        } else {
            format!("{} months ago", days / 30)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn test_submit_ranks() {
        let mut board = Leaderboard::new();
        assert_eq!(board.submit(LeaderboardEntry::new(100, 1.0)).rank, Some(1));
        assert_eq!(board.submit(LeaderboardEntry::new(50, 2.0)).rank, Some(2));
        let p = board.submit(LeaderboardEntry::new(200, 3.0));
        assert_eq!(p.rank, Some(1));
        assert!(p.is_top_score && p.is_top3 && p.is_top10);
        assert_eq!(
            board.entries.iter().map(|e| e.score).collect::<Vec<_>>(),
            vec![200, 100, 50]
        );
    }

    #[test]
    fn test_ties_rank_after_earlier_entries() {
        let mut board = Leaderboard::new();
        board.submit(LeaderboardEntry::new(100, 1.0));
        // Same score and same timestamp still gets its own rank
        let p = board.submit(LeaderboardEntry::new(100, 1.0));
        assert_eq!(p.rank, Some(2));
        assert!(!p.is_top_score);
    }

    #[test]
    fn test_truncated_entry_has_no_rank() {
        let mut board = Leaderboard::new();
        for i in 0..MAX_ENTRIES {
            board.submit(LeaderboardEntry::new(100 + i as u64, i as f64));
        }
        assert!(!board.qualifies(100));
        let p = board.submit(LeaderboardEntry::new(100, 99.0));
        assert_eq!(p.rank, None);
        assert!(!p.is_top10 && !p.is_top3 && !p.is_top_score);
        assert_eq!(board.len(), MAX_ENTRIES);
    }

    #[test]
    fn test_top_score_checks() {
        let mut board = Leaderboard::new();
        assert!(board.is_top_score(0));
        assert!(!board.qualifies(0));
        assert!(board.qualifies(1));
        board.submit(LeaderboardEntry::new(40, 0.0));
        assert!(!board.is_top_score(40));
        assert!(board.is_top_score(41));
    }

    #[test]
    fn test_store_persists_and_clears() {
        let store = LeaderboardStore::new(Rc::new(MemoryStore::new()));
        let mut entry = LeaderboardEntry::new(300, 5.0);
        entry.level = Some(2);
        store.submit(GameId::Tetris, entry.clone());
        assert_eq!(store.entries(GameId::Tetris), vec![entry]);
        assert!(store.entries(GameId::Snake).is_empty());
        assert!(store.clear(GameId::Tetris));
        assert!(store.entries(GameId::Tetris).is_empty());
    }

    #[test]
    fn test_unknown_game_submit_is_noop() {
        let mem = Rc::new(MemoryStore::new());
        let store = LeaderboardStore::new(mem.clone());
        assert!(store.submit_named("solitaire", LeaderboardEntry::new(1, 0.0)).is_err());
        assert!(mem.is_empty());
    }

    #[test]
    fn test_corrupt_board_reads_empty() {
        let mem = Rc::new(MemoryStore::new());
        mem.set(&keys::leaderboard(GameId::Pong), "nope").unwrap();
        let store = LeaderboardStore::new(mem);
        assert!(store.leaderboard(GameId::Pong).is_empty());
    }

    #[test]
    fn test_format_date() {
        let now = 10.0 * MS_PER_DAY;
        assert_eq!(format_date(now - 10_000.0, now), "Just now");
        assert_eq!(format_date(now - 60_000.0, now), "1 min ago");
        assert_eq!(format_date(now - 3.0 * 3_600_000.0, now), "3 hours ago");
        assert_eq!(format_date(now - MS_PER_DAY, now), "Yesterday");
        assert_eq!(format_date(now - 3.0 * MS_PER_DAY, now), "3 days ago");
    }

    proptest! {
        #[test]
        fn prop_board_sorted_and_bounded(scores in prop::collection::vec(0u64..1000, 0..40)) {
            let mut board = Leaderboard::new();
            for (i, s) in scores.iter().enumerate() {
                board.submit(LeaderboardEntry::new(*s, i as f64));
            }
            prop_assert!(board.len() <= MAX_ENTRIES);
            prop_assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));

            let mut expected = scores.clone();
            expected.sort_unstable_by(|a, b| b.cmp(a));
            expected.truncate(MAX_ENTRIES);
            let got: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
            prop_assert_eq!(got, expected);
        }
    }
}

//! Lifetime statistics aggregate
//!
//! One JSON document holds the totals plus a per-game entry. The layout
//! (`totalGamesPlayed`, `totalPlaytime`, `gamesStats`) is what the web build
//! has always written, so existing saves keep loading.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::game::{GameFamily, GameId, UnknownGame};
use crate::persistence::{self, keys};
use crate::platform::KeyValueStore;

/// `bestMoves` value meaning "no game finished yet"
pub const UNSET_BEST_MOVES: u32 = 999;

/// Result of one finished session, reported by a game machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOutcome {
    pub game: GameId,
    pub score: Option<u64>,
    pub won: Option<bool>,
    pub draw: bool,
    pub moves: Option<u32>,
    pub level: Option<u32>,
    pub lines_cleared: Option<u32>,
    pub max_tile: Option<u32>,
}

impl GameOutcome {
    /// Outcome with no fields set
    pub fn new(game: GameId) -> Self {
        Self {
            game,
            score: None,
            won: None,
            draw: false,
            moves: None,
            level: None,
            lines_cleared: None,
            max_tile: None,
        }
    }

    pub fn scored(game: GameId, score: u64) -> Self {
        Self {
            score: Some(score),
            ..Self::new(game)
        }
    }

    pub fn decided(game: GameId, won: bool) -> Self {
        Self {
            won: Some(won),
            ..Self::new(game)
        }
    }

    pub fn drawn(game: GameId) -> Self {
        Self {
            draw: true,
            ..Self::new(game)
        }
    }

    pub fn with_moves(game: GameId, moves: u32) -> Self {
        Self {
            moves: Some(moves),
            ..Self::new(game)
        }
    }
}

/// Per-game counters
///
/// Which fields are present depends on the game's family; absent fields are
/// treated as "not recorded" by every reader.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub played: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_score: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wins: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub losses: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draws: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_moves: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_moves: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines_cleared: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tile: Option<u32>,
}

impl GameStats {
    /// Fresh counters for a game
    pub fn for_game(game: GameId) -> Self {
        let mut stats = Self::default();
        match game.family() {
            GameFamily::Score => {
                stats.high_score = Some(0);
                stats.total_score = Some(0);
            }
            GameFamily::Outcome => {
                stats.wins = Some(0);
                stats.losses = Some(0);
            }
            GameFamily::Moves => {
                stats.best_moves = Some(UNSET_BEST_MOVES);
                stats.total_moves = Some(0);
            }
        }
        match game {
            GameId::TicTacToe => stats.draws = Some(0),
            GameId::Tetris => {
                stats.lines_cleared = Some(0);
                stats.max_level = Some(0);
            }
            GameId::Game2048 => stats.max_tile = Some(0),
            _ => {}
        }
        stats
    }

    /// Fold one outcome into the counters
    fn apply(&mut self, outcome: &GameOutcome) {
        self.played += 1;

        if let Some(score) = outcome.score {
            self.total_score = Some(self.total_score.unwrap_or(0) + score);
            self.high_score = Some(self.high_score.unwrap_or(0).max(score));
        }

        if let Some(won) = outcome.won {
            self.wins = Some(self.wins.unwrap_or(0) + u32::from(won));
            self.losses = Some(self.losses.unwrap_or(0) + u32::from(!won));
        }

        if outcome.draw {
            self.draws = Some(self.draws.unwrap_or(0) + 1);
        }

        if let Some(moves) = outcome.moves {
            self.total_moves = Some(self.total_moves.unwrap_or(0) + u64::from(moves));
            self.best_moves = Some(self.best_moves.unwrap_or(UNSET_BEST_MOVES).min(moves));
        }

        if let Some(lines) = outcome.lines_cleared {
            self.lines_cleared = Some(self.lines_cleared.unwrap_or(0) + u64::from(lines));
        }
        if let Some(level) = outcome.level {
            self.max_level = Some(self.max_level.unwrap_or(0).max(level));
        }
        if let Some(tile) = outcome.max_tile {
            self.max_tile = Some(self.max_tile.unwrap_or(0).max(tile));
        }
    }

    /// Best move count, `None` while still at the "unset" sentinel
    pub fn best_moves_set(&self) -> Option<u32> {
        self.best_moves.filter(|&m| m < UNSET_BEST_MOVES)
    }

    /// Wins / decided games, `None` before the first decided game
    pub fn win_rate(&self) -> Option<f64> {
        let wins = self.wins?;
        let decided = wins + self.losses.unwrap_or(0);
        (decided > 0).then(|| f64::from(wins) / f64::from(decided))
    }

    pub fn average_score(&self) -> Option<f64> {
        let total = self.total_score?;
        (self.played > 0).then(|| total as f64 / f64::from(self.played))
    }
}

/// Full statistics aggregate at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSnapshot {
    pub total_games_played: u32,
    #[serde(rename = "totalPlaytime")]
    pub total_playtime_seconds: u64,
    #[serde(rename = "gamesStats", deserialize_with = "known_games")]
    pub per_game: BTreeMap<GameId, GameStats>,
}

/// Decode `gamesStats`, dropping entries for ids this build does not know
fn known_games<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<GameId, GameStats>, D::Error> {
    let raw = BTreeMap::<String, GameStats>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, stats)| match key.parse::<GameId>() {
            Ok(game) => Some((game, stats)),
            Err(e) => {
                log::warn!("Dropping stats entry: {e}");
                None
            }
        })
        .collect())
}

impl Default for StatsSnapshot {
    fn default() -> Self {
        Self {
            total_games_played: 0,
            total_playtime_seconds: 0,
            per_game: GameId::ALL
                .into_iter()
                .map(|g| (g, GameStats::for_game(g)))
                .collect(),
        }
    }
}

impl StatsSnapshot {
    pub fn game(&self, game: GameId) -> Option<&GameStats> {
        self.per_game.get(&game)
    }

    /// Fold a finished session into the aggregate
    pub fn record(&mut self, outcome: &GameOutcome, elapsed_seconds: u64) {
        self.total_games_played += 1;
        self.total_playtime_seconds += elapsed_seconds;
        self.per_game
            .entry(outcome.game)
            .or_insert_with(|| GameStats::for_game(outcome.game))
            .apply(outcome);
    }

    /// Number of games played at least once
    pub fn games_tried(&self) -> usize {
        self.per_game.values().filter(|g| g.played > 0).count()
    }

    pub fn average_session_seconds(&self) -> Option<u64> {
        (self.total_games_played > 0)
            .then(|| self.total_playtime_seconds / u64::from(self.total_games_played))
    }

    /// Re-add entries missing from an older or hand-edited document
    fn fill_missing_games(&mut self) {
        for game in GameId::ALL {
            self.per_game
                .entry(game)
                .or_insert_with(|| GameStats::for_game(game));
        }
    }
}

/// Persisted statistics
pub struct StatsStore {
    store: Rc<dyn KeyValueStore>,
}

impl StatsStore {
    /// Open the stats document, writing a fresh one if none exists
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        if persistence::load::<StatsSnapshot>(store.as_ref(), keys::STATS).is_none() {
            log::info!("No stats found, starting fresh");
            persistence::save_logged(store.as_ref(), keys::STATS, &StatsSnapshot::default());
        }
        Self { store }
    }

    /// Current aggregate (default when missing or corrupt)
    pub fn snapshot(&self) -> StatsSnapshot {
        let mut snapshot: StatsSnapshot =
            persistence::load_or_default(self.store.as_ref(), keys::STATS);
        snapshot.fill_missing_games();
        snapshot
    }

    /// Record a finished session and return the updated aggregate
    pub fn record(&self, outcome: &GameOutcome, elapsed_seconds: u64) -> StatsSnapshot {
        let mut snapshot = self.snapshot();
        snapshot.record(outcome, elapsed_seconds);
        persistence::save_logged(self.store.as_ref(), keys::STATS, &snapshot);
        log::debug!(
            "Recorded {} session ({}s), {} games total",
            outcome.game,
            elapsed_seconds,
            snapshot.total_games_played
        );
        snapshot
    }

    /// Record by string id; unknown ids change nothing
    pub fn record_named(
        &self,
        game: &str,
        outcome: GameOutcome,
        elapsed_seconds: u64,
    ) -> Result<StatsSnapshot, UnknownGame> {
        let game: GameId = game.parse().inspect_err(|e| log::warn!("Not recording: {e}"))?;
        Ok(self.record(&GameOutcome { game, ..outcome }, elapsed_seconds))
    }

    pub fn game_stats(&self, game: GameId) -> GameStats {
        self.snapshot()
            .per_game
            .remove(&game)
            .unwrap_or_else(|| GameStats::for_game(game))
    }

    /// Reset all statistics to zero
    pub fn reset_all(&self) {
        persistence::save_logged(self.store.as_ref(), keys::STATS, &StatsSnapshot::default());
        log::info!("Stats reset");
    }
}

//! Session bookkeeping shared by every game
//!
//! The host builds one `Hub` over its key-value store and hands it every
//! finished session. The hub records stats, submits to the leaderboard and
//! evaluates achievements, in that order, each step persisting its whole
//! document before the next one reads.

use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;

use crate::achievements::{Achievement, AchievementStore};
use crate::game::{GameId, UnknownGame};
use crate::leaderboard::{LeaderboardEntry, LeaderboardStore, Placement};
use crate::platform::{KeyValueStore, StorageError};
use crate::settings::Settings;
use crate::sim::GameSession;
use crate::stats::{GameOutcome, StatsSnapshot, StatsStore};

/// Memory Match ranks fewer moves higher; entries store `MOVES_CEILING - moves`
pub const MOVES_CEILING: u64 = 1000;

#[derive(Debug, Error)]
pub enum HubError {
    #[error(transparent)]
    UnknownGame(#[from] UnknownGame),
    #[error("{0} session is still running")]
    NotOver(GameId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Everything a finished session changed
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub outcome: GameOutcome,
    pub snapshot: StatsSnapshot,
    /// `None` when the outcome carries nothing to rank
    pub placement: Option<Placement>,
    pub unlocked: Vec<Achievement>,
}

pub struct Hub {
    store: Rc<dyn KeyValueStore>,
    pub stats: StatsStore,
    pub leaderboards: LeaderboardStore,
    pub achievements: AchievementStore,
    settings: Settings,
}

impl Hub {
    pub fn new(store: Rc<dyn KeyValueStore>, now: f64) -> Self {
        let settings = Settings::load(store.as_ref());
        Self {
            stats: StatsStore::new(store.clone()),
            leaderboards: LeaderboardStore::new(store.clone()),
            achievements: AchievementStore::new(store.clone(), now),
            settings,
            store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change settings and persist them
    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings);
        self.settings.save(self.store.as_ref());
    }

    /// Record a finished session
    pub fn finish(
        &self,
        session: &dyn GameSession,
        elapsed_seconds: u64,
        now: f64,
    ) -> Result<SessionReport, HubError> {
        let outcome = session.outcome().ok_or(HubError::NotOver(session.game_id()))?;
        Ok(self.record(outcome, elapsed_seconds, now))
    }

    /// Record an outcome reported under a string game id
    ///
    /// Unknown ids are rejected before anything is written.
    pub fn finish_named(
        &self,
        game: &str,
        outcome: GameOutcome,
        elapsed_seconds: u64,
        now: f64,
    ) -> Result<SessionReport, HubError> {
        let game: GameId = game
            .parse()
            .inspect_err(|e| log::warn!("Discarding session: {e}"))?;
        Ok(self.record(GameOutcome { game, ..outcome }, elapsed_seconds, now))
    }

    pub fn record(&self, outcome: GameOutcome, elapsed_seconds: u64, now: f64) -> SessionReport {
        let snapshot = self.stats.record(&outcome, elapsed_seconds);
        let placement = leaderboard_entry(&outcome, now)
            .map(|entry| self.leaderboards.submit(outcome.game, entry));
        let unlocked = self.achievements.check(&snapshot, now);
        SessionReport {
            outcome,
            snapshot,
            placement,
            unlocked,
        }
    }

    /// Wipe stats, unlocks and every leaderboard (settings and install date stay)
    pub fn reset_progress(&self) -> Result<(), HubError> {
        self.stats.reset_all();
        self.achievements.reset_all();
        for game in GameId::ALL {
            if !self.leaderboards.clear(game) {
                return Err(StorageError::Rejected {
                    key: crate::persistence::keys::leaderboard(game),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Leaderboard entry for an outcome with a non-zero score or a move count
/// under `MOVES_CEILING`
fn leaderboard_entry(outcome: &GameOutcome, now: f64) -> Option<LeaderboardEntry> {
    if let Some(moves) = outcome.moves {
        let score = MOVES_CEILING.saturating_sub(u64::from(moves));
        return (score > 0).then(|| LeaderboardEntry {
            moves: Some(moves),
            ..LeaderboardEntry::new(score, now)
        });
    }
    let score = outcome.score.filter(|&s| s > 0)?;
    Some(LeaderboardEntry {
        level: outcome.level,
        ..LeaderboardEntry::new(score, now)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use crate::sim::{Mark, TicTacToeState};

    const NOW: f64 = 1_700_000_000_000.0;

    fn hub() -> Hub {
        Hub::new(Rc::new(MemoryStore::new()), NOW)
    }

    #[test]
    fn test_first_snake_game_unlocks_novice() {
        let hub = hub();
        let report = hub.record(GameOutcome::scored(GameId::Snake, 50), 30, NOW);
        assert_eq!(report.snapshot.total_games_played, 1);
        assert_eq!(report.snapshot.game(GameId::Snake).and_then(|g| g.high_score), Some(50));
        let ids: Vec<_> = report.unlocked.iter().map(|a| a.id).collect();
        assert!(ids.contains(&"snakeNovice"));
        assert!(ids.contains(&"firstGame"));
        assert_eq!(report.placement.and_then(|p| p.rank), Some(1));

        let again = hub.record(GameOutcome::scored(GameId::Snake, 50), 30, NOW);
        assert!(again.unlocked.iter().all(|a| a.id != "snakeNovice"));
        assert_eq!(again.placement.and_then(|p| p.rank), Some(2));
    }

    #[test]
    fn test_unfinished_session_rejected() {
        let hub = hub();
        let game = TicTacToeState::new();
        assert!(matches!(
            hub.finish(&game, 5, NOW),
            Err(HubError::NotOver(GameId::TicTacToe))
        ));
        assert_eq!(hub.stats.snapshot().total_games_played, 0);
    }

    #[test]
    fn test_finish_outcome_game() {
        let hub = hub();
        let mut game = TicTacToeState::new();
        for cell in [0, 3, 1, 4, 2] {
            game.place(cell);
        }
        assert_eq!(game.winner, Some(Mark::X));
        let report = hub.finish(&game, 12, NOW).unwrap();
        assert!(report.placement.is_none());
        let stats = hub.stats.game_stats(GameId::TicTacToe);
        assert_eq!(stats.wins, Some(1));
        assert_eq!(stats.losses, Some(0));
    }

    #[test]
    fn test_memory_ranks_fewer_moves_higher() {
        let hub = hub();
        hub.record(GameOutcome::with_moves(GameId::Memory, 20), 60, NOW);
        let report = hub.record(GameOutcome::with_moves(GameId::Memory, 12), 60, NOW);
        assert_eq!(report.placement.and_then(|p| p.rank), Some(1));
        let entries = hub.leaderboards.entries(GameId::Memory);
        assert_eq!(entries[0].moves, Some(12));
        assert_eq!(entries[0].score, 988);
    }

    #[test]
    fn test_zero_scores_stay_off_the_board() {
        let hub = hub();
        let report = hub.record(GameOutcome::scored(GameId::Snake, 0), 5, NOW);
        assert!(report.placement.is_none());
        assert_eq!(report.snapshot.game(GameId::Snake).map(|g| g.played), Some(1));
        assert!(hub.leaderboards.entries(GameId::Snake).is_empty());

        let report = hub.record(GameOutcome::with_moves(GameId::Memory, 1200), 600, NOW);
        assert!(report.placement.is_none());
        assert!(hub.leaderboards.entries(GameId::Memory).is_empty());
        let memory = hub.stats.game_stats(GameId::Memory);
        assert_eq!(memory.total_moves, Some(1200));
    }

    #[test]
    fn test_unknown_game_writes_nothing() {
        let hub = hub();
        let err = hub
            .finish_named("chess", GameOutcome::scored(GameId::Snake, 10), 1, NOW)
            .unwrap_err();
        assert!(matches!(err, HubError::UnknownGame(_)));
        assert_eq!(hub.stats.snapshot().total_games_played, 0);
        assert!(hub.leaderboards.entries(GameId::Snake).is_empty());

        let report = hub
            .finish_named("2048", GameOutcome::scored(GameId::Snake, 10), 1, NOW)
            .unwrap();
        assert_eq!(report.outcome.game, GameId::Game2048);
    }

    #[test]
    fn test_settings_persist() {
        let mem = Rc::new(MemoryStore::new());
        let mut hub = Hub::new(mem.clone(), NOW);
        hub.update_settings(|s| s.set_volume(0.2));
        let reopened = Hub::new(mem, NOW);
        assert_eq!(reopened.settings().volume, 0.2);
    }

    #[test]
    fn test_reset_progress() {
        let hub = hub();
        hub.record(GameOutcome::scored(GameId::Snake, 50), 30, NOW);
        hub.reset_progress().unwrap();
        assert_eq!(hub.stats.snapshot().total_games_played, 0);
        assert!(hub.achievements.unlocked().is_empty());
        assert!(hub.leaderboards.entries(GameId::Snake).is_empty());
        assert!(hub.achievements.installed_at().is_some());
    }
}

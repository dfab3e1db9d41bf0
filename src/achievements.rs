//! Achievement catalog and unlock evaluation
//!
//! `evaluate` is a pure function of the catalog, the already-unlocked ids,
//! a stats snapshot and the clock. `AchievementStore` persists what it
//! returns so each achievement unlocks at most once.

use std::collections::BTreeSet;
use std::rc::Rc;

use serde::Serialize;

use crate::game::GameId;
use crate::persistence::{self, keys};
use crate::platform::KeyValueStore;
use crate::platform::time::MS_PER_DAY;
use crate::stats::{GameStats, StatsSnapshot, UNSET_BEST_MOVES};

/// Days after install during which `EarlyAdopter` can unlock
pub const EARLY_ADOPTER_DAYS: f64 = 7.0;

/// Games that must all have a high score for `AllHighScores`
pub const HIGH_SCORE_GAMES: [GameId; 4] = [
    GameId::Snake,
    GameId::Tetris,
    GameId::Game2048,
    GameId::Breakout,
];

/// Rule used to match an achievement against the stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConditionKind {
    GamesPlayed,
    UniqueGames,
    /// High score in the given game
    HighScore(GameId),
    TetrisLines,
    TetrisLevel,
    /// Wins in the given game
    Wins(GameId),
    MaxTile,
    MemoryMoves,
    Playtime,
    AllHighScores,
    EarlyAdopter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: &'static str,
    pub requirement: u64,
    pub kind: ConditionKind,
}

const fn achievement(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    icon: &'static str,
    category: &'static str,
    requirement: u64,
    kind: ConditionKind,
) -> Achievement {
    Achievement {
        id,
        title,
        description,
        icon,
        category,
        requirement,
        kind,
    }
}

/// Every achievement, in display and evaluation order
#[rustfmt::skip]
pub const CATALOG: [Achievement; 17] = [
    achievement("firstGame", "First Steps", "Play your first game", "🎮", "beginner", 1, ConditionKind::GamesPlayed),
    achievement("gameExplorer", "Game Explorer", "Try all 7 games", "🗺️", "beginner", 7, ConditionKind::UniqueGames),
    achievement("snakeNovice", "Snake Novice", "Score 50 points in Snake", "🐍", "snake", 50, ConditionKind::HighScore(GameId::Snake)),
    achievement("snakeMaster", "Snake Master", "Score 200 points in Snake", "🏆", "snake", 200, ConditionKind::HighScore(GameId::Snake)),
    achievement("tetrisBuilder", "Tetris Builder", "Clear 10 lines in Tetris", "🧱", "tetris", 10, ConditionKind::TetrisLines),
    achievement("tetrisExpert", "Tetris Expert", "Reach level 5 in Tetris", "⭐", "tetris", 5, ConditionKind::TetrisLevel),
    achievement("ticTacWinner", "Tic-Tac Winner", "Win 5 Tic-Tac-Toe games", "⭕", "tictactoe", 5, ConditionKind::Wins(GameId::TicTacToe)),
    achievement("pongChampion", "Pong Champion", "Win 3 Pong matches", "🏓", "pong", 3, ConditionKind::Wins(GameId::Pong)),
    achievement("puzzle2048", "2048 Achiever", "Reach 2048 tile", "🔢", "2048", 2048, ConditionKind::MaxTile),
    achievement("puzzle1024", "Halfway There", "Reach 1024 tile", "📈", "2048", 1024, ConditionKind::MaxTile),
    achievement("memorySharp", "Sharp Memory", "Complete Memory Match in 20 moves or less", "🧩", "memory", 20, ConditionKind::MemoryMoves),
    achievement("breakoutDestroyer", "Brick Destroyer", "Score 500 points in Breakout", "🎯", "breakout", 500, ConditionKind::HighScore(GameId::Breakout)),
    achievement("dedicated", "Dedicated Player", "Play 50 games total", "💪", "milestone", 50, ConditionKind::GamesPlayed),
    achievement("veteran", "Veteran Gamer", "Play 100 games total", "🎖️", "milestone", 100, ConditionKind::GamesPlayed),
    achievement("marathoner", "Marathon Player", "Play for 1 hour total", "⏱️", "milestone", 3600, ConditionKind::Playtime),
    achievement("perfectionist", "Perfectionist", "Get high score in all games", "✨", "special", 7, ConditionKind::AllHighScores),
    achievement("earlyBird", "Early Bird", "Play within first week of installing", "🐦", "special", 1, ConditionKind::EarlyAdopter),
];

/// Look up a catalog entry by id
pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

/// Inputs that are not part of the stats snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    /// Current time (Unix ms)
    pub now: f64,
    /// First launch time (Unix ms), `None` if never recorded
    pub installed_at: Option<f64>,
}

fn game_field<T>(
    stats: &StatsSnapshot,
    game: GameId,
    field: impl Fn(&GameStats) -> Option<T>,
) -> Option<T> {
    stats.game(game).and_then(field)
}

/// Whether a single achievement's condition holds
///
/// Fields missing from the snapshot never satisfy a condition.
pub fn is_satisfied(achievement: &Achievement, stats: &StatsSnapshot, clock: Clock) -> bool {
    let req = achievement.requirement;
    match achievement.kind {
        ConditionKind::GamesPlayed => u64::from(stats.total_games_played) >= req,
        ConditionKind::UniqueGames => stats.games_tried() as u64 >= req,
        ConditionKind::HighScore(game) => {
            game_field(stats, game, |g| g.high_score).is_some_and(|s| s >= req)
        }
        ConditionKind::TetrisLines => {
            game_field(stats, GameId::Tetris, |g| g.lines_cleared).is_some_and(|l| l >= req)
        }
        ConditionKind::TetrisLevel => game_field(stats, GameId::Tetris, |g| g.max_level)
            .is_some_and(|l| u64::from(l) >= req),
        ConditionKind::Wins(game) => {
            game_field(stats, game, |g| g.wins).is_some_and(|w| u64::from(w) >= req)
        }
        ConditionKind::MaxTile => game_field(stats, GameId::Game2048, |g| g.max_tile)
            .is_some_and(|t| u64::from(t) >= req),
        ConditionKind::MemoryMoves => game_field(stats, GameId::Memory, |g| g.best_moves)
            .is_some_and(|m| m > 0 && m < UNSET_BEST_MOVES && u64::from(m) <= req),
        ConditionKind::Playtime => stats.total_playtime_seconds >= req,
        ConditionKind::AllHighScores => HIGH_SCORE_GAMES
            .iter()
            .all(|&g| game_field(stats, g, |s| s.high_score).is_some_and(|s| s > 0)),
        ConditionKind::EarlyAdopter => clock
            .installed_at
            .is_some_and(|t| (clock.now - t) / MS_PER_DAY <= EARLY_ADOPTER_DAYS),
    }
}

/// Achievements newly satisfied, in catalog order, excluding `unlocked`
pub fn evaluate<'a>(
    catalog: &'a [Achievement],
    unlocked: &BTreeSet<String>,
    stats: &StatsSnapshot,
    clock: Clock,
) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| !unlocked.contains(a.id))
        .filter(|a| is_satisfied(a, stats, clock))
        .collect()
}

/// Unlock progress summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub unlocked: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent
    pub percentage: u32,
}

/// Persisted unlocked set and install date
pub struct AchievementStore {
    store: Rc<dyn KeyValueStore>,
}

impl AchievementStore {
    /// Open the store, recording `now` as the install date on first launch
    pub fn new(store: Rc<dyn KeyValueStore>, now: f64) -> Self {
        let this = Self { store };
        if this.installed_at().is_none() {
            if let Err(e) = this.store.set(keys::INSTALL_DATE, &format!("{}", now.floor() as i64)) {
                log::error!("Failed to record install date: {e}");
            }
        }
        this
    }

    pub fn installed_at(&self) -> Option<f64> {
        self.store
            .get(keys::INSTALL_DATE)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|t| t.is_finite())
    }

    /// Persisted unlocked ids (empty when missing or corrupt)
    pub fn unlocked(&self) -> BTreeSet<String> {
        let ids: Vec<String> = persistence::load_or_default(self.store.as_ref(), keys::UNLOCKED);
        ids.into_iter().collect()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked().contains(id)
    }

    /// Evaluate against `stats`, persist and return what newly unlocked
    pub fn check(&self, stats: &StatsSnapshot, now: f64) -> Vec<Achievement> {
        let mut unlocked = self.unlocked();
        let clock = Clock {
            now,
            installed_at: self.installed_at(),
        };
        let fresh: Vec<Achievement> = evaluate(&CATALOG, &unlocked, stats, clock)
            .into_iter()
            .copied()
            .collect();
        if fresh.is_empty() {
            return fresh;
        }

        for a in &fresh {
            log::info!("Achievement unlocked: {} {}", a.icon, a.title);
            unlocked.insert(a.id.to_string());
        }
        self.save_unlocked(&unlocked);
        fresh
    }

    pub fn progress(&self) -> Progress {
        let unlocked = self.unlocked().iter().filter(|id| find(id).is_some()).count();
        let total = CATALOG.len();
        Progress {
            unlocked,
            total,
            percentage: ((unlocked as f64 / total as f64) * 100.0).round() as u32,
        }
    }

    /// Clear every unlock (the install date is kept)
    pub fn reset_all(&self) {
        self.save_unlocked(&BTreeSet::new());
        log::info!("Achievements reset");
    }

    fn save_unlocked(&self, unlocked: &BTreeSet<String>) {
        let ids: Vec<&String> = unlocked.iter().collect();
        persistence::save_logged(self.store.as_ref(), keys::UNLOCKED, &ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use crate::stats::GameOutcome;
    use proptest::prelude::*;

    const NOW: f64 = 1_700_000_000_000.0;

    fn clock() -> Clock {
        Clock {
            now: NOW,
            installed_at: Some(NOW - 30.0 * MS_PER_DAY),
        }
    }

    fn ids(found: &[&Achievement]) -> Vec<&'static str> {
        found.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_catalog_ids_unique() {
        let set: BTreeSet<_> = CATALOG.iter().map(|a| a.id).collect();
        assert_eq!(set.len(), CATALOG.len());
    }

    #[test]
    fn test_snake_fifty_unlocks_novice_once() {
        let mut stats = StatsSnapshot::default();
        assert_eq!(stats.game(GameId::Snake).unwrap().high_score, Some(0));
        stats.record(&GameOutcome::scored(GameId::Snake, 50), 0);
        assert_eq!(stats.game(GameId::Snake).unwrap().high_score, Some(50));
        assert_eq!(stats.total_games_played, 1);

        let mut unlocked = BTreeSet::new();
        let found = evaluate(&CATALOG, &unlocked, &stats, clock());
        assert_eq!(ids(&found), vec!["firstGame", "snakeNovice"]);

        for a in &found {
            unlocked.insert(a.id.to_string());
        }
        assert!(evaluate(&CATALOG, &unlocked, &stats, clock()).is_empty());
    }

    #[test]
    fn test_memory_moves_sentinel_never_counts() {
        let mut stats = StatsSnapshot::default();
        let memory = find("memorySharp").unwrap();
        assert!(!is_satisfied(memory, &stats, clock()));

        stats.record(&GameOutcome::with_moves(GameId::Memory, 999), 0);
        assert!(!is_satisfied(memory, &stats, clock()));
        stats.record(&GameOutcome::with_moves(GameId::Memory, 21), 0);
        assert!(!is_satisfied(memory, &stats, clock()));
        stats.record(&GameOutcome::with_moves(GameId::Memory, 20), 0);
        assert!(is_satisfied(memory, &stats, clock()));
    }

    #[test]
    fn test_missing_fields_are_unsatisfied() {
        let mut stats = StatsSnapshot::default();
        stats.per_game.clear();
        let unlocked = BTreeSet::new();
        let found = evaluate(&CATALOG, &unlocked, &stats, clock());
        assert!(found.is_empty());
    }

    #[test]
    fn test_tetris_conditions_use_cumulative_lines_and_max_level() {
        let mut stats = StatsSnapshot::default();
        let mut outcome = GameOutcome::scored(GameId::Tetris, 500);
        outcome.lines_cleared = Some(6);
        outcome.level = Some(5);
        stats.record(&outcome, 0);
        outcome.level = Some(1);
        stats.record(&outcome, 0);

        assert!(is_satisfied(find("tetrisBuilder").unwrap(), &stats, clock()));
        assert!(is_satisfied(find("tetrisExpert").unwrap(), &stats, clock()));
    }

    #[test]
    fn test_all_high_scores_needs_four_games() {
        let mut stats = StatsSnapshot::default();
        let perfectionist = find("perfectionist").unwrap();
        for game in [GameId::Snake, GameId::Tetris, GameId::Game2048] {
            stats.record(&GameOutcome::scored(game, 10), 0);
        }
        assert!(!is_satisfied(perfectionist, &stats, clock()));
        stats.record(&GameOutcome::scored(GameId::Breakout, 10), 0);
        assert!(is_satisfied(perfectionist, &stats, clock()));
    }

    #[test]
    fn test_unique_games_and_wins() {
        let mut stats = StatsSnapshot::default();
        for game in GameId::ALL {
            stats.record(&GameOutcome::new(game), 0);
        }
        assert!(is_satisfied(find("gameExplorer").unwrap(), &stats, clock()));

        for _ in 0..3 {
            stats.record(&GameOutcome::decided(GameId::Pong, true), 0);
        }
        assert!(is_satisfied(find("pongChampion").unwrap(), &stats, clock()));
        assert!(!is_satisfied(find("ticTacWinner").unwrap(), &stats, clock()));
    }

    #[test]
    fn test_early_adopter_window() {
        let stats = StatsSnapshot::default();
        let bird = find("earlyBird").unwrap();
        let fresh = Clock {
            now: NOW,
            installed_at: Some(NOW - 6.9 * MS_PER_DAY),
        };
        assert!(is_satisfied(bird, &stats, fresh));
        let exactly = Clock {
            now: NOW,
            installed_at: Some(NOW - 7.0 * MS_PER_DAY),
        };
        assert!(is_satisfied(bird, &stats, exactly));
        assert!(!is_satisfied(bird, &stats, clock()));
        let unknown = Clock {
            now: NOW,
            installed_at: None,
        };
        assert!(!is_satisfied(bird, &stats, unknown));
    }

    #[test]
    fn test_store_unlocks_once_and_survives_late_checks() {
        let store = AchievementStore::new(Rc::new(MemoryStore::new()), NOW);
        assert_eq!(store.installed_at(), Some(NOW));

        let mut stats = StatsSnapshot::default();
        stats.record(&GameOutcome::scored(GameId::Snake, 60), 10);
        let first = store.check(&stats, NOW);
        let first_ids: Vec<_> = first.iter().map(|a| a.id).collect();
        assert_eq!(first_ids, vec!["firstGame", "snakeNovice", "earlyBird"]);

        // A month later the early-bird window is closed but the unlock stays
        assert!(store.check(&stats, NOW + 30.0 * MS_PER_DAY).is_empty());
        assert!(store.is_unlocked("earlyBird"));

        let progress = store.progress();
        assert_eq!(progress.unlocked, 3);
        assert_eq!(progress.total, 17);
        assert_eq!(progress.percentage, 18);

        store.reset_all();
        assert!(store.unlocked().is_empty());
        assert_eq!(store.installed_at(), Some(NOW));
    }

    #[test]
    fn test_corrupt_unlocked_list_reads_empty() {
        let mem = Rc::new(MemoryStore::new());
        mem.set(keys::UNLOCKED, "{oops").unwrap();
        let store = AchievementStore::new(mem, NOW);
        assert!(store.unlocked().is_empty());
    }

    proptest! {
        #[test]
        fn prop_evaluate_never_repeats(scores in prop::collection::vec(0u64..300, 1..30)) {
            let mut stats = StatsSnapshot::default();
            let mut unlocked = BTreeSet::new();
            let mut seen = 0usize;
            for s in scores {
                stats.record(&GameOutcome::scored(GameId::Snake, s), 60);
                let found = evaluate(&CATALOG, &unlocked, &stats, clock());
                for a in &found {
                    prop_assert!(unlocked.insert(a.id.to_string()));
                }
                seen += found.len();
                prop_assert!(evaluate(&CATALOG, &unlocked, &stats, clock()).is_empty());
            }
            prop_assert_eq!(seen, unlocked.len());
        }
    }
}

//! Growgame - seven classic arcade and puzzle games
//!
//! Core modules:
//! - `sim`: Deterministic game state machines (Snake, Tetris, 2048, Pong,
//!   Breakout, Memory Match, Tic-Tac-Toe)
//! - `stats`: Per-game statistics aggregate
//! - `leaderboard`: Top-10 score lists per game
//! - `achievements`: Badge catalog and unlock evaluation
//! - `hub`: Records finished sessions into all of the above
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Whole-document JSON load/save
//! - `settings`: Preferences and difficulty tuning

pub mod achievements;
pub mod demo;
pub mod game;
pub mod hub;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod stats;

pub use achievements::{Achievement, AchievementStore};
pub use game::{GameId, UnknownGame};
pub use hub::{Hub, HubError, SessionReport};
pub use leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardStore, Placement};
pub use settings::{Difficulty, Settings};
pub use sim::{GameEvent, GamePhase, GameSession, SoundCue};
pub use stats::{GameOutcome, GameStats, StatsSnapshot, StatsStore};

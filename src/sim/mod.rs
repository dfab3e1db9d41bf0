//! Deterministic game simulations
//!
//! Every game is a state machine advanced by an external scheduler:
//! - Fixed-interval ticks (Snake, Tetris gravity)
//! - One tick per rendered frame (Pong, Breakout)
//! - Discrete player input only (2048, Memory Match, Tic-Tac-Toe)
//!
//! Machines never touch timers, audio or storage. A step mutates the state
//! and returns the events the host should react to. Seeded RNG only.

pub mod breakout;
pub mod game2048;
pub mod memory;
pub mod pong;
pub mod snake;
pub mod tetris;
pub mod tictactoe;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::game::GameId;
use crate::stats::GameOutcome;

pub use breakout::{BreakoutConfig, BreakoutInput, BreakoutState};
pub use game2048::{Game2048Input, Game2048State, SlideDirection};
pub use memory::{MemoryInput, MemoryState};
pub use pong::{Opponent, PongConfig, PongInput, PongState};
pub use snake::{SnakeConfig, SnakeInput, SnakeState};
pub use tetris::{TetrisConfig, TetrisInput, TetrisState};
pub use tictactoe::{Mark, Tally, TicTacToeState};

/// Maximum catch-up ticks per host frame to prevent spiral of death
pub const MAX_SUBSTEPS: u32 = 8;

/// Frame period of the continuous-motion games (60 Hz)
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// How a finished game ended, from the local player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ending {
    Won,
    Lost,
    Draw,
}

/// Current phase of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Waiting for the start input (or for the next serve)
    Ready,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Session ended
    Over(Ending),
}

impl GamePhase {
    pub fn is_over(&self) -> bool {
        matches!(self, GamePhase::Over(_))
    }

    /// Flip between `Playing` and `Paused`; other phases are unchanged
    pub fn toggle_pause(&mut self) -> bool {
        match *self {
            GamePhase::Playing => *self = GamePhase::Paused,
            GamePhase::Paused => *self = GamePhase::Playing,
            _ => return false,
        }
        true
    }
}

/// Sound the presentation layer may play; the core never plays audio itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundCue {
    Click,
    Success,
    Error,
    Eat,
    Coin,
    Hit,
    Win,
    Lose,
    PowerUp,
}

/// Something that happened during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    /// Points gained by the local player
    Scored(u32),
    Sound(SoundCue),
    /// Tick interval changed (Snake speed-up, Tetris level-up)
    IntervalChanged { interval_ms: u32 },
    LevelUp(u32),
    /// Session reached a terminal state
    Ended(Ending),
}

/// Common view over every game machine, used by the host to record sessions
pub trait GameSession {
    fn game_id(&self) -> GameId;
    fn phase(&self) -> GamePhase;
    fn score(&self) -> u64;
    /// Final result, `None` until the session is over
    fn outcome(&self) -> Option<GameOutcome>;

    fn is_over(&self) -> bool {
        self.phase().is_over()
    }
}

/// Seeded RNG for a session
pub fn session_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Converts host elapsed time into a number of fixed ticks
#[derive(Debug, Clone, Copy, Default)]
pub struct Ticker {
    accumulator_ms: f64,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add elapsed time and return how many ticks of `interval_ms` are due
    ///
    /// At most `MAX_SUBSTEPS` ticks are returned; excess time is dropped.
    pub fn advance(&mut self, elapsed_ms: f64, interval_ms: f64) -> u32 {
        if interval_ms <= 0.0 || !elapsed_ms.is_finite() {
            return 0;
        }
        self.accumulator_ms += elapsed_ms.max(0.0);
        let mut ticks = 0;
        while self.accumulator_ms >= interval_ms && ticks < MAX_SUBSTEPS {
            self.accumulator_ms -= interval_ms;
            ticks += 1;
        }
        if ticks == MAX_SUBSTEPS {
            self.accumulator_ms = self.accumulator_ms.min(interval_ms);
        }
        ticks
    }

    pub fn reset(&mut self) {
        self.accumulator_ms = 0.0;
    }
}

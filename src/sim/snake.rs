//! Snake: grid movement on a fixed interval
//!
//! The host calls `step(SnakeInput::Tick)` every `interval_ms`. Walls kill,
//! there is no wrap-around.

use std::collections::VecDeque;

use glam::IVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::{Ending, GameEvent, GamePhase, GameSession, SoundCue, session_rng};
use crate::game::GameId;
use crate::settings::Difficulty;
use crate::stats::GameOutcome;

/// Cells per side
pub const GRID_SIZE: i32 = 30;
pub const FOOD_POINTS: u32 = 10;
/// Speed increases each time the score reaches a multiple of this
pub const SPEEDUP_EVERY: u64 = 50;
pub const SPEEDUP_STEP_MS: u32 = 20;
pub const MIN_INTERVAL_MS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Grid step (y grows downward)
    pub fn delta(&self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn is_perpendicular_to(&self, other: Direction) -> bool {
        self.is_horizontal() != other.is_horizontal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnakeConfig {
    pub grid_size: i32,
    pub initial_interval_ms: u32,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}

impl SnakeConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Self {
            grid_size: GRID_SIZE,
            initial_interval_ms: difficulty.snake_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeInput {
    /// Advance one grid step
    Tick,
    /// Arrow key; the first one starts the game
    Turn(Direction),
    /// Space; starts the game when ready
    TogglePause,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnakeState {
    pub config: SnakeConfig,
    /// Body cells, head first
    pub segments: VecDeque<IVec2>,
    /// Direction applied on the next tick
    pub direction: Direction,
    /// Direction of the last completed step
    pub heading: Direction,
    pub food: IVec2,
    pub interval_ms: u32,
    pub score: u64,
    pub phase: GamePhase,
    #[serde(skip)]
    rng: Pcg32,
}

impl SnakeState {
    pub fn new(config: SnakeConfig, seed: u64) -> Self {
        let center = config.grid_size / 2;
        let mut state = Self {
            config,
            segments: VecDeque::from([IVec2::new(center, center)]),
            direction: Direction::Right,
            heading: Direction::Right,
            food: IVec2::ZERO,
            interval_ms: config.initial_interval_ms,
            score: 0,
            phase: GamePhase::Ready,
            rng: session_rng(seed),
        };
        state.place_food();
        state
    }

    pub fn head(&self) -> IVec2 {
        self.segments[0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn in_bounds(&self, cell: IVec2) -> bool {
        let n = self.config.grid_size;
        (0..n).contains(&cell.x) && (0..n).contains(&cell.y)
    }

    /// Put food on a uniformly random free cell; `false` if the board is full
    fn place_food(&mut self) -> bool {
        let n = self.config.grid_size;
        let free: Vec<IVec2> = (0..n)
            .flat_map(|y| (0..n).map(move |x| IVec2::new(x, y)))
            .filter(|c| !self.segments.contains(c))
            .collect();
        if free.is_empty() {
            return false;
        }
        self.food = free[self.rng.random_range(0..free.len())];
        true
    }

    fn end(&mut self, ending: Ending, events: &mut Vec<GameEvent>) {
        self.phase = GamePhase::Over(ending);
        let cue = if ending == Ending::Won { SoundCue::Win } else { SoundCue::Lose };
        events.push(GameEvent::Sound(cue));
        events.push(GameEvent::Ended(ending));
        log::debug!("Snake over: score {} length {}", self.score, self.len());
    }

    /// Apply one input
    pub fn step(&mut self, input: SnakeInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match (self.phase, input) {
            (GamePhase::Over(_), _) => {}
            (GamePhase::Ready, SnakeInput::Turn(_) | SnakeInput::TogglePause) => {
                self.phase = GamePhase::Playing;
                events.push(GameEvent::Sound(SoundCue::Click));
            }
            (GamePhase::Ready, SnakeInput::Tick) => {}
            (_, SnakeInput::TogglePause) => {
                if self.phase.toggle_pause() {
                    events.push(GameEvent::Sound(SoundCue::Click));
                }
            }
            (GamePhase::Playing, SnakeInput::Turn(dir)) => {
                // No 180° turns, checked against the last step actually taken
                if dir.is_perpendicular_to(self.heading) {
                    self.direction = dir;
                    events.push(GameEvent::Sound(SoundCue::Click));
                }
            }
            (GamePhase::Playing, SnakeInput::Tick) => self.advance(&mut events),
            (GamePhase::Paused, _) => {}
        }
        events
    }

    fn advance(&mut self, events: &mut Vec<GameEvent>) {
        let new_head = self.head() + self.direction.delta();

        if !self.in_bounds(new_head) || self.segments.contains(&new_head) {
            self.end(Ending::Lost, events);
            return;
        }

        self.segments.push_front(new_head);
        self.heading = self.direction;

        if new_head == self.food {
            self.score += u64::from(FOOD_POINTS);
            events.push(GameEvent::Scored(FOOD_POINTS));
            events.push(GameEvent::Sound(SoundCue::Eat));

            if self.score % SPEEDUP_EVERY == 0 {
                self.interval_ms = self
                    .interval_ms
                    .saturating_sub(SPEEDUP_STEP_MS)
                    .max(MIN_INTERVAL_MS);
                events.push(GameEvent::IntervalChanged {
                    interval_ms: self.interval_ms,
                });
                events.push(GameEvent::Sound(SoundCue::PowerUp));
            }

            if !self.place_food() {
                self.end(Ending::Won, events);
            }
        } else {
            self.segments.pop_back();
        }
    }
}

impl GameSession for SnakeState {
    fn game_id(&self) -> GameId {
        GameId::Snake
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.is_over()
            .then(|| GameOutcome::scored(GameId::Snake, self.score))
    }
}

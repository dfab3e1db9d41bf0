//! 2048: sliding and merging tiles on a 4×4 grid
//!
//! Every direction is handled by transforming the grid so the move becomes
//! "slide left", sliding each row, and transforming back.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::{Ending, GameEvent, GamePhase, GameSession, SoundCue, session_rng};
use crate::game::GameId;
use crate::stats::GameOutcome;

pub const SIZE: usize = 4;
pub const WIN_TILE: u32 = 2048;
/// Chance a spawned tile is a 4 instead of a 2
pub const FOUR_CHANCE: f64 = 0.1;

pub type Grid = [[u32; SIZE]; SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlideDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SlideDirection {
    pub const ALL: [SlideDirection; 4] = [
        SlideDirection::Left,
        SlideDirection::Right,
        SlideDirection::Up,
        SlideDirection::Down,
    ];
}

/// Slide one row toward index 0, merging equal neighbours once
///
/// Returns the new row and the points earned (sum of merged values).
pub fn slide_row(row: [u32; SIZE]) -> ([u32; SIZE], u32) {
    let tiles: Vec<u32> = row.into_iter().filter(|&v| v != 0).collect();
    let mut out = [0; SIZE];
    let mut points = 0;
    let mut n = 0;
    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            out[n] = tiles[i] * 2;
            points += out[n];
            i += 2;
        } else {
            out[n] = tiles[i];
            i += 1;
        }
        n += 1;
    }
    (out, points)
}

fn transpose(grid: &Grid) -> Grid {
    let mut out = [[0; SIZE]; SIZE];
    for (r, row) in grid.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            out[c][r] = v;
        }
    }
    out
}

fn mirror(grid: &Grid) -> Grid {
    let mut out = *grid;
    for row in out.iter_mut() {
        row.reverse();
    }
    out
}

/// Map a grid into the "slide left" orientation for `dir`
fn to_canonical(grid: &Grid, dir: SlideDirection) -> Grid {
    match dir {
        SlideDirection::Left => *grid,
        SlideDirection::Right => mirror(grid),
        SlideDirection::Up => transpose(grid),
        SlideDirection::Down => mirror(&transpose(grid)),
    }
}

fn from_canonical(grid: &Grid, dir: SlideDirection) -> Grid {
    match dir {
        SlideDirection::Left => *grid,
        SlideDirection::Right => mirror(grid),
        SlideDirection::Up => transpose(grid),
        SlideDirection::Down => transpose(&mirror(grid)),
    }
}

/// Result of sliding a whole grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide {
    pub grid: Grid,
    pub points: u32,
    pub moved: bool,
}

/// Slide the grid in a direction without spawning
pub fn slide(grid: &Grid, dir: SlideDirection) -> Slide {
    let mut canon = to_canonical(grid, dir);
    let mut points = 0;
    for row in canon.iter_mut() {
        let (slid, p) = slide_row(*row);
        *row = slid;
        points += p;
    }
    let out = from_canonical(&canon, dir);
    Slide {
        grid: out,
        points,
        moved: out != *grid,
    }
}

/// True if any empty cell or equal orthogonal neighbours remain
pub fn can_move(grid: &Grid) -> bool {
    for r in 0..SIZE {
        for c in 0..SIZE {
            let v = grid[r][c];
            if v == 0 {
                return true;
            }
            if c + 1 < SIZE && grid[r][c + 1] == v {
                return true;
            }
            if r + 1 < SIZE && grid[r + 1][c] == v {
                return true;
            }
        }
    }
    false
}

pub fn max_tile(grid: &Grid) -> u32 {
    grid.iter().flatten().copied().max().unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Game2048Input {
    Slide(SlideDirection),
    TogglePause,
}

#[derive(Debug, Clone, Serialize)]
pub struct Game2048State {
    pub grid: Grid,
    pub score: u64,
    pub phase: GamePhase,
    /// Set once the 2048 tile has appeared; play continues
    pub reached_win_tile: bool,
    #[serde(skip)]
    rng: Pcg32,
}

impl Game2048State {
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            grid: [[0; SIZE]; SIZE],
            score: 0,
            phase: GamePhase::Playing,
            reached_win_tile: false,
            rng: session_rng(seed),
        };
        state.spawn_tile();
        state.spawn_tile();
        state
    }

    /// Start from a fixed grid (puzzles, tests)
    pub fn with_grid(grid: Grid, seed: u64) -> Self {
        let mut state = Self {
            grid,
            score: 0,
            phase: GamePhase::Playing,
            reached_win_tile: max_tile(&grid) >= WIN_TILE,
            rng: session_rng(seed),
        };
        if !can_move(&state.grid) {
            state.phase = GamePhase::Over(Ending::Lost);
        }
        state
    }

    /// Place a 2 (90%) or 4 (10%) on a uniformly random empty cell
    ///
    /// Returns the value placed, `None` when the grid is full.
    fn spawn_tile(&mut self) -> Option<u32> {
        let empty: Vec<(usize, usize)> = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| self.grid[r][c] == 0)
            .collect();
        if empty.is_empty() {
            return None;
        }
        let (r, c) = empty[self.rng.random_range(0..empty.len())];
        let value = if self.rng.random_bool(FOUR_CHANCE) { 4 } else { 2 };
        self.grid[r][c] = value;
        Some(value)
    }

    pub fn max_tile(&self) -> u32 {
        max_tile(&self.grid)
    }

    pub fn step(&mut self, input: Game2048Input) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match (self.phase, input) {
            (GamePhase::Over(_), _) => {}
            (_, Game2048Input::TogglePause) => {
                if self.phase.toggle_pause() {
                    events.push(GameEvent::Sound(SoundCue::Click));
                }
            }
            (GamePhase::Playing, Game2048Input::Slide(dir)) => self.slide(dir, &mut events),
            (_, Game2048Input::Slide(_)) => {}
        }
        events
    }

    fn slide(&mut self, dir: SlideDirection, events: &mut Vec<GameEvent>) {
        let result = slide(&self.grid, dir);
        if !result.moved {
            return;
        }
        self.grid = result.grid;
        self.spawn_tile();
        self.score += u64::from(result.points);
        events.push(GameEvent::Sound(SoundCue::Click));
        if result.points > 0 {
            events.push(GameEvent::Scored(result.points));
            events.push(GameEvent::Sound(SoundCue::Coin));
        }

        if !self.reached_win_tile && self.max_tile() >= WIN_TILE {
            self.reached_win_tile = true;
            events.push(GameEvent::Sound(SoundCue::Win));
        }

        if !can_move(&self.grid) {
            self.phase = GamePhase::Over(Ending::Lost);
            events.push(GameEvent::Sound(SoundCue::Lose));
            events.push(GameEvent::Ended(Ending::Lost));
            log::debug!("2048 over: score {} max tile {}", self.score, self.max_tile());
        }
    }
}

impl GameSession for Game2048State {
    fn game_id(&self) -> GameId {
        GameId::Game2048
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.is_over().then(|| GameOutcome {
            max_tile: Some(self.max_tile()),
            ..GameOutcome::scored(GameId::Game2048, self.score)
        })
    }
}

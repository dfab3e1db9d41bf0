//! Tetris: falling tetrominoes on a 22×12 well
//!
//! Gravity is a host tick every `drop_interval_ms()`. Player moves that would
//! collide are dropped silently.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::{Ending, GameEvent, GamePhase, GameSession, SoundCue, session_rng};
use crate::game::GameId;
use crate::settings::Difficulty;
use crate::stats::GameOutcome;

pub const ROWS: usize = 22;
pub const COLS: usize = 12;
/// Points for clearing 0..=4 rows at once
pub const LINE_REWARDS: [u32; 5] = [0, 100, 300, 500, 800];
pub const LINES_PER_LEVEL: u32 = 10;
pub const MIN_DROP_MS: u32 = 100;
pub const DROP_MS_PER_LEVEL: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tetromino {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Tetromino::I,
        Tetromino::O,
        Tetromino::T,
        Tetromino::S,
        Tetromino::Z,
        Tetromino::J,
        Tetromino::L,
    ];

    /// Spawn orientation
    pub fn shape(&self) -> Shape {
        let rows: &[&[u8]] = match self {
            Tetromino::I => &[&[1, 1, 1, 1]],
            Tetromino::O => &[&[1, 1], &[1, 1]],
            Tetromino::T => &[&[0, 1, 0], &[1, 1, 1]],
            Tetromino::S => &[&[0, 1, 1], &[1, 1, 0]],
            Tetromino::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Tetromino::J => &[&[1, 0, 0], &[1, 1, 1]],
            Tetromino::L => &[&[0, 0, 1], &[1, 1, 1]],
        };
        Shape(rows.iter().map(|r| r.iter().map(|&c| c == 1).collect()).collect())
    }

    pub fn color(&self) -> &'static str {
        match self {
            Tetromino::I => "cyan",
            Tetromino::O => "yellow",
            Tetromino::T => "purple",
            Tetromino::S => "green",
            Tetromino::Z => "red",
            Tetromino::J => "blue",
            Tetromino::L => "orange",
        }
    }
}

/// Row-major occupancy matrix of a piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape(pub Vec<Vec<bool>>);

impl Shape {
    /// Clockwise rotation: transpose, then reverse each row
    pub fn rotated(&self) -> Shape {
        let rows = self.0.len();
        let cols = self.0.first().map_or(0, Vec::len);
        Shape(
            (0..cols)
                .map(|c| (0..rows).rev().map(|r| self.0[r][c]).collect())
                .collect(),
        )
    }

    /// Offsets (x, y) of filled cells
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.0.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| (x as i32, y as i32))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Piece {
    pub kind: Tetromino,
    pub shape: Shape,
    /// Top-left of the shape matrix on the board
    pub x: i32,
    pub y: i32,
}

pub type Board = [[Option<Tetromino>; COLS]; ROWS];

/// True if `shape` at (x, y) leaves the well or overlaps a settled cell
///
/// Cells above the top row are allowed.
pub fn collides(board: &Board, shape: &Shape, x: i32, y: i32) -> bool {
    shape.cells().any(|(dx, dy)| {
        let (cx, cy) = (x + dx, y + dy);
        if cx < 0 || cx >= COLS as i32 || cy >= ROWS as i32 {
            return true;
        }
        cy >= 0 && board[cy as usize][cx as usize].is_some()
    })
}

/// Remove full rows, shifting the rest down; returns rows cleared
pub fn clear_lines(board: &mut Board) -> u32 {
    let kept: Vec<[Option<Tetromino>; COLS]> = board
        .iter()
        .filter(|row| row.iter().any(Option::is_none))
        .copied()
        .collect();
    let cleared = ROWS - kept.len();
    let mut fresh = [[None; COLS]; ROWS];
    fresh[cleared..].copy_from_slice(&kept);
    *board = fresh;
    cleared as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TetrisConfig {
    pub base_drop_ms: u32,
}

impl Default for TetrisConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}

impl TetrisConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Self {
            base_drop_ms: difficulty.tetris_base_drop_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetrisInput {
    /// Gravity
    Tick,
    Left,
    Right,
    Rotate,
    /// One row down, locking if blocked
    SoftDrop,
    /// Fall to the resting row; the next tick locks
    HardDrop,
    TogglePause,
}

#[derive(Debug, Clone, Serialize)]
pub struct TetrisState {
    pub config: TetrisConfig,
    pub board: Board,
    pub current: Option<Piece>,
    pub next: Tetromino,
    pub score: u64,
    pub level: u32,
    pub lines_cleared: u32,
    pub phase: GamePhase,
    #[serde(skip)]
    rng: Pcg32,
}

impl TetrisState {
    pub fn new(config: TetrisConfig, seed: u64) -> Self {
        let mut rng = session_rng(seed);
        let next = random_piece(&mut rng);
        let mut state = Self {
            config,
            board: [[None; COLS]; ROWS],
            current: None,
            next,
            score: 0,
            level: 1,
            lines_cleared: 0,
            phase: GamePhase::Playing,
            rng,
        };
        state.spawn(&mut Vec::new());
        state
    }

    /// Gravity period for the current level
    pub fn drop_interval_ms(&self) -> u32 {
        self.config
            .base_drop_ms
            .saturating_sub((self.level - 1) * DROP_MS_PER_LEVEL)
            .max(MIN_DROP_MS)
    }

    /// Take the queued piece and place it at the top; game over if blocked
    fn spawn(&mut self, events: &mut Vec<GameEvent>) {
        let kind = self.next;
        let piece = Piece {
            kind,
            shape: kind.shape(),
            x: (COLS / 2) as i32 - 1,
            y: 0,
        };
        if collides(&self.board, &piece.shape, piece.x, piece.y) {
            self.current = None;
            self.phase = GamePhase::Over(Ending::Lost);
            events.push(GameEvent::Sound(SoundCue::Lose));
            events.push(GameEvent::Ended(Ending::Lost));
            log::debug!("Tetris over: score {} lines {}", self.score, self.lines_cleared);
            return;
        }
        self.current = Some(piece);
        self.next = random_piece(&mut self.rng);
    }

    /// Try to move the active piece; false (and no change) on collision
    fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.current.as_mut() else {
            return false;
        };
        if collides(&self.board, &piece.shape, piece.x + dx, piece.y + dy) {
            return false;
        }
        piece.x += dx;
        piece.y += dy;
        true
    }

    fn lock(&mut self, events: &mut Vec<GameEvent>) {
        let Some(piece) = self.current.take() else {
            return;
        };
        events.push(GameEvent::Sound(SoundCue::Hit));
        for (dx, dy) in piece.shape.cells() {
            let (x, y) = (piece.x + dx, piece.y + dy);
            if (0..ROWS as i32).contains(&y) && (0..COLS as i32).contains(&x) {
                self.board[y as usize][x as usize] = Some(piece.kind);
            }
        }

        let cleared = clear_lines(&mut self.board);
        if cleared > 0 {
            let points = LINE_REWARDS[cleared.min(4) as usize];
            self.score += u64::from(points);
            self.lines_cleared += cleared;
            events.push(GameEvent::Scored(points));
            events.push(GameEvent::Sound(SoundCue::Coin));

            let level = self.lines_cleared / LINES_PER_LEVEL + 1;
            if level != self.level {
                self.level = level;
                events.push(GameEvent::LevelUp(level));
                events.push(GameEvent::IntervalChanged {
                    interval_ms: self.drop_interval_ms(),
                });
                events.push(GameEvent::Sound(SoundCue::PowerUp));
            }
        }

        self.spawn(events);
    }

    fn move_down(&mut self, events: &mut Vec<GameEvent>) {
        if !self.try_shift(0, 1) {
            self.lock(events);
        }
    }

    /// Apply one input
    pub fn step(&mut self, input: TetrisInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match (self.phase, input) {
            (GamePhase::Over(_), _) => {}
            (_, TetrisInput::TogglePause) => {
                self.phase.toggle_pause();
            }
            (GamePhase::Paused | GamePhase::Ready, _) => {}
            (GamePhase::Playing, TetrisInput::Tick | TetrisInput::SoftDrop) => {
                self.move_down(&mut events)
            }
            (GamePhase::Playing, TetrisInput::Left) => {
                if self.try_shift(-1, 0) {
                    events.push(GameEvent::Sound(SoundCue::Click));
                }
            }
            (GamePhase::Playing, TetrisInput::Right) => {
                if self.try_shift(1, 0) {
                    events.push(GameEvent::Sound(SoundCue::Click));
                }
            }
            (GamePhase::Playing, TetrisInput::Rotate) => {
                if let Some(piece) = self.current.as_mut() {
                    let rotated = piece.shape.rotated();
                    if !collides(&self.board, &rotated, piece.x, piece.y) {
                        piece.shape = rotated;
                        events.push(GameEvent::Sound(SoundCue::Click));
                    }
                }
            }
            (GamePhase::Playing, TetrisInput::HardDrop) => while self.try_shift(0, 1) {},
        }
        events
    }

    /// Row the active piece would come to rest on (for a ghost preview)
    pub fn ghost_y(&self) -> Option<i32> {
        let piece = self.current.as_ref()?;
        let mut y = piece.y;
        while !collides(&self.board, &piece.shape, piece.x, y + 1) {
            y += 1;
        }
        Some(y)
    }
}

fn random_piece(rng: &mut Pcg32) -> Tetromino {
    Tetromino::ALL[rng.random_range(0..Tetromino::ALL.len())]
}

impl GameSession for TetrisState {
    fn game_id(&self) -> GameId {
        GameId::Tetris
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.is_over().then(|| GameOutcome {
            level: Some(self.level),
            lines_cleared: Some(self.lines_cleared),
            ..GameOutcome::scored(GameId::Tetris, self.score)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filled_row(except: Option<usize>) -> [Option<Tetromino>; COLS] {
        let mut row = [Some(Tetromino::O); COLS];
        if let Some(x) = except {
            row[x] = None;
        }
        row
    }

    #[test]
    fn test_rotation_is_clockwise() {
        let t = Tetromino::T.shape();
        let r = t.rotated();
        let expected = Shape(vec![vec![true, false], vec![true, true], vec![true, false]]);
        assert_eq!(r, expected);
        assert_eq!(r.rotated().rotated().rotated(), t);

        let i = Tetromino::I.shape().rotated();
        assert_eq!(i.0.len(), 4);
        assert!(i.0.iter().all(|row| row == &vec![true]));
    }

    #[test]
    fn test_collision_rules() {
        let mut board: Board = [[None; COLS]; ROWS];
        let o = Tetromino::O.shape();
        assert!(!collides(&board, &o, 0, 0));
        assert!(collides(&board, &o, -1, 0));
        assert!(collides(&board, &o, COLS as i32 - 1, 0));
        assert!(collides(&board, &o, 0, ROWS as i32 - 1));
        // Above the top is fine
        assert!(!collides(&board, &o, 0, -1));
        board[5][1] = Some(Tetromino::I);
        assert!(collides(&board, &o, 0, 4));
    }

    #[test]
    fn test_clear_lines_shifts_down() {
        let mut board: Board = [[None; COLS]; ROWS];
        board[ROWS - 1] = filled_row(None);
        board[ROWS - 2] = filled_row(Some(3));
        board[ROWS - 3] = filled_row(None);
        assert_eq!(clear_lines(&mut board), 2);
        assert_eq!(board[ROWS - 1], filled_row(Some(3)));
        assert!(board[ROWS - 2].iter().all(Option::is_none));
    }

    #[test]
    fn test_tetris_scores_800_and_levels() {
        let mut s = TetrisState::new(TetrisConfig::default(), 7);
        s.lines_cleared = 8;
        for y in ROWS - 4..ROWS {
            s.board[y] = filled_row(Some(0));
        }
        s.current = Some(Piece {
            kind: Tetromino::I,
            shape: Tetromino::I.shape().rotated(),
            x: 0,
            y: 0,
        });
        s.step(TetrisInput::HardDrop);
        let events = s.step(TetrisInput::Tick);
        assert!(events.contains(&GameEvent::Scored(800)));
        assert!(events.contains(&GameEvent::LevelUp(2)));
        assert_eq!(s.score, 800);
        assert_eq!(s.lines_cleared, 12);
        assert_eq!(s.level, 2);
        assert_eq!(s.drop_interval_ms(), 950);
    }

    #[test]
    fn test_drop_interval_floor() {
        let mut s = TetrisState::new(TetrisConfig::default(), 1);
        s.level = 30;
        assert_eq!(s.drop_interval_ms(), MIN_DROP_MS);
    }

    #[test]
    fn test_blocked_moves_are_ignored() {
        let mut s = TetrisState::new(TetrisConfig::default(), 3);
        for _ in 0..COLS {
            s.step(TetrisInput::Left);
        }
        let piece = s.current.clone().unwrap();
        assert_eq!(piece.x, 0);
        assert!(s.step(TetrisInput::Left).is_empty());
        assert_eq!(s.current.as_ref().unwrap().x, 0);
    }

    #[test]
    fn test_spawn_collision_ends_game() {
        let mut s = TetrisState::new(TetrisConfig::default(), 3);
        for y in 0..4 {
            s.board[y] = filled_row(Some(0));
        }
        s.current = Some(Piece {
            kind: Tetromino::O,
            shape: Tetromino::O.shape(),
            x: 0,
            y: -2,
        });
        let events = s.step(TetrisInput::Tick);
        assert!(events.contains(&GameEvent::Ended(Ending::Lost)));
        let outcome = s.outcome().unwrap();
        assert_eq!(outcome.level, Some(1));
        assert!(s.step(TetrisInput::Left).is_empty());
    }

    #[test]
    fn test_hard_drop_waits_for_tick() {
        let mut s = TetrisState::new(TetrisConfig::default(), 11);
        s.step(TetrisInput::HardDrop);
        let y = s.current.as_ref().unwrap().y;
        assert_eq!(Some(y), s.ghost_y());
        assert!(s.board.iter().all(|r| r.iter().all(Option::is_none)));
        s.step(TetrisInput::Tick);
        assert!(s.board[ROWS - 1].iter().any(Option::is_some));
    }

    fn input() -> impl Strategy<Value = TetrisInput> {
        prop_oneof![
            3 => Just(TetrisInput::Tick),
            1 => Just(TetrisInput::Left),
            1 => Just(TetrisInput::Right),
            1 => Just(TetrisInput::Rotate),
            1 => Just(TetrisInput::HardDrop),
        ]
    }

    proptest! {
        #[test]
        fn prop_clears_follow_reward_schedule(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input(), 0..600),
        ) {
            let mut s = TetrisState::new(TetrisConfig::default(), seed);
            for i in inputs {
                let lines_before = s.lines_cleared;
                let events = s.step(i);
                for e in &events {
                    if let GameEvent::Scored(points) = e {
                        let rows = s.lines_cleared - lines_before;
                        prop_assert_eq!(*points, LINE_REWARDS[rows as usize]);
                        prop_assert!([100, 300, 500, 800].contains(points));
                    }
                }
                prop_assert_eq!(s.level, s.lines_cleared / LINES_PER_LEVEL + 1);
                if let Some(p) = &s.current {
                    prop_assert!(!collides(&s.board, &p.shape, p.x, p.y));
                }
            }
        }
    }

    #[test]
    fn test_line_reward_table() {
        // Guard against the table drifting from the 1/2/3/4-row schedule
        assert_eq!(&LINE_REWARDS[1..], &[100, 300, 500, 800]);
    }
}

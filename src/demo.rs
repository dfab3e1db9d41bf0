//! Idle mode: simple AI players for every game
//!
//! Each driver plays one session against the simulated host clock (60 Hz
//! frames, fixed-interval ticks through `Ticker`). After `GIVE_UP_FRAMES` a
//! driver stops trying so that every session ends.

use std::collections::HashMap;

use glam::IVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::game::GameId;
use crate::hub::{Hub, SessionReport};
use crate::settings::Difficulty;
use crate::sim::breakout::{self, BreakoutConfig, BreakoutInput, BreakoutState};
use crate::sim::game2048::{self, Game2048Input, Game2048State, SlideDirection};
use crate::sim::memory::{MemoryInput, MemoryState};
use crate::sim::pong::{self, PongConfig, PongInput, PongState};
use crate::sim::snake::{Direction, SnakeConfig, SnakeInput, SnakeState};
use crate::sim::tetris::{self, Board, Shape, TetrisConfig, TetrisInput, TetrisState};
use crate::sim::tictactoe::{self, Mark, TicTacToeState};
use crate::sim::{FRAME_MS, GamePhase, GameSession, Ticker, session_rng};
use crate::stats::GameOutcome;

/// Hard cap on simulated frames per session (30 minutes)
pub const MAX_FRAMES: u64 = 60 * 60 * 30;
/// Frames after which drivers play to lose (3 minutes)
pub const GIVE_UP_FRAMES: u64 = 60 * 60 * 3;
/// Frames between discrete moves (2048, Tic-Tac-Toe)
const MOVE_EVERY: u64 = 6;

/// A finished autoplay session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoRun {
    pub outcome: GameOutcome,
    pub frames: u64,
    pub elapsed_seconds: u64,
}

/// Drive `state` one frame at a time until it reports an outcome
fn run_frames<S: GameSession>(
    state: &mut S,
    mut frame: impl FnMut(&mut S, u64),
) -> Option<DemoRun> {
    for n in 0..MAX_FRAMES {
        frame(state, n);
        if let Some(outcome) = state.outcome() {
            let frames = n + 1;
            return Some(DemoRun {
                outcome,
                frames,
                elapsed_seconds: (frames as f64 * FRAME_MS / 1000.0) as u64,
            });
        }
    }
    log::warn!("{} autoplay hit the frame cap", state.game_id());
    None
}

/// Play one session of `game`
pub fn autoplay(game: GameId, difficulty: Difficulty, seed: u64) -> Option<DemoRun> {
    let run = match game {
        GameId::Snake => play_snake(SnakeConfig::for_difficulty(difficulty), seed),
        GameId::Tetris => play_tetris(TetrisConfig::for_difficulty(difficulty), seed),
        GameId::TicTacToe => play_tictactoe(seed),
        GameId::Pong => play_pong(PongConfig::for_difficulty(difficulty), seed),
        GameId::Game2048 => play_2048(seed),
        GameId::Memory => play_memory(seed),
        GameId::Breakout => play_breakout(BreakoutConfig::for_difficulty(difficulty), seed),
    };
    if let Some(run) = &run {
        log::info!(
            "{} {} finished in {}s ({} frames)",
            game.emoji(),
            game.title(),
            run.elapsed_seconds,
            run.frames
        );
    }
    run
}

/// Play every game once and record each session through the hub
pub fn run_all(hub: &Hub, seed: u64, now: f64) -> Vec<SessionReport> {
    let difficulty = hub.settings().difficulty;
    let mut clock = now;
    GameId::ALL
        .iter()
        .enumerate()
        .filter_map(|(i, &game)| {
            let run = autoplay(game, difficulty, seed.wrapping_add(i as u64))?;
            clock += run.elapsed_seconds as f64 * 1000.0;
            Some(hub.record(run.outcome, run.elapsed_seconds, clock))
        })
        .collect()
}

// Snake: greedy toward the food, avoiding immediate collisions

fn play_snake(config: SnakeConfig, seed: u64) -> Option<DemoRun> {
    let mut ticker = Ticker::new();
    let mut state = SnakeState::new(config, seed);
    state.step(SnakeInput::TogglePause);
    run_frames(&mut state, |s, frame| {
        let due = ticker.advance(FRAME_MS, f64::from(s.interval_ms));
        for _ in 0..due {
            let dir = if frame < GIVE_UP_FRAMES { snake_choice(s) } else { s.heading };
            s.step(SnakeInput::Turn(dir));
            s.step(SnakeInput::Tick);
        }
    })
}

fn snake_choice(s: &SnakeState) -> Direction {
    let n = s.config.grid_size;
    let safe = |cell: IVec2| {
        (0..n).contains(&cell.x) && (0..n).contains(&cell.y) && !s.segments.contains(&cell)
    };
    [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        .into_iter()
        .filter(|&d| d == s.heading || d.is_perpendicular_to(s.heading))
        .filter(|d| safe(s.head() + d.delta()))
        .min_by_key(|d| {
            let next = s.head() + d.delta();
            let dist = (s.food - next).abs();
            (dist.x + dist.y, *d != s.heading)
        })
        .unwrap_or(s.heading)
}

// Tetris: one piece per gravity tick, placed by a small board heuristic

fn play_tetris(config: TetrisConfig, seed: u64) -> Option<DemoRun> {
    let mut ticker = Ticker::new();
    let mut state = TetrisState::new(config, seed);
    run_frames(&mut state, |s, frame| {
        let due = ticker.advance(FRAME_MS, f64::from(s.drop_interval_ms()));
        for _ in 0..due {
            if frame < GIVE_UP_FRAMES {
                place_best(s);
            }
            s.step(TetrisInput::HardDrop);
            s.step(TetrisInput::Tick);
        }
    })
}

/// Rotate and shift the active piece over its best landing spot
fn place_best(s: &mut TetrisState) {
    let Some(piece) = s.current.clone() else {
        return;
    };
    let mut best: Option<(i32, usize, i32)> = None;
    let mut shape = piece.shape.clone();
    for rotations in 0..4 {
        for x in -3..tetris::COLS as i32 {
            if let Some(score) = landing_score(&s.board, &shape, x) {
                if best.is_none_or(|(top, _, _)| score > top) {
                    best = Some((score, rotations, x));
                }
            }
        }
        shape = shape.rotated();
    }
    let Some((_, rotations, target_x)) = best else {
        return;
    };

    for _ in 0..rotations {
        s.step(TetrisInput::Rotate);
    }
    loop {
        let Some(x) = s.current.as_ref().map(|p| p.x) else {
            return;
        };
        let input = match x.cmp(&target_x) {
            std::cmp::Ordering::Less => TetrisInput::Right,
            std::cmp::Ordering::Greater => TetrisInput::Left,
            std::cmp::Ordering::Equal => return,
        };
        if s.step(input).is_empty() {
            // Blocked
            return;
        }
    }
}

/// Higher is better: cleared lines good, holes and height bad
fn landing_score(board: &Board, shape: &Shape, x: i32) -> Option<i32> {
    if tetris::collides(board, shape, x, 0) {
        return None;
    }
    let mut y = 0;
    while !tetris::collides(board, shape, x, y + 1) {
        y += 1;
    }
    let mut after = *board;
    for (dx, dy) in shape.cells() {
        let (cx, cy) = (x + dx, y + dy);
        if cy < 0 {
            return None;
        }
        after[cy as usize][cx as usize] = Some(tetris::Tetromino::O);
    }
    let lines = tetris::clear_lines(&mut after) as i32;

    let mut holes = 0;
    let mut height = 0;
    for col in 0..tetris::COLS {
        let top = (0..tetris::ROWS).find(|&row| after[row][col].is_some());
        if let Some(top) = top {
            height = height.max((tetris::ROWS - top) as i32);
            holes += (top..tetris::ROWS).filter(|&row| after[row][col].is_none()).count() as i32;
        }
    }
    Some(lines * 8 - holes * 5 - height)
}

// 2048: corner strategy

fn play_2048(seed: u64) -> Option<DemoRun> {
    const PREFERENCE: [SlideDirection; 4] = [
        SlideDirection::Down,
        SlideDirection::Left,
        SlideDirection::Right,
        SlideDirection::Up,
    ];
    let mut state = Game2048State::new(seed);
    run_frames(&mut state, |s, frame| {
        if frame % MOVE_EVERY != 0 {
            return;
        }
        if let Some(&dir) = PREFERENCE
            .iter()
            .find(|&&d| game2048::slide(&s.grid, d).moved)
        {
            s.step(Game2048Input::Slide(dir));
        }
    })
}

// Memory Match: perfect recall of every card seen

fn play_memory(seed: u64) -> Option<DemoRun> {
    let mut seen: HashMap<usize, &'static str> = HashMap::new();
    let mut state = MemoryState::new(seed);
    run_frames(&mut state, |s, _| {
        if s.pending.is_some() {
            s.step(MemoryInput::Elapsed(FRAME_MS));
            return;
        }
        let Some(index) = memory_choice(s, &seen) else {
            return;
        };
        s.step(MemoryInput::Flip(index));
        seen.insert(index, s.cards[index].face);
    })
}

fn memory_choice(s: &MemoryState, seen: &HashMap<usize, &'static str>) -> Option<usize> {
    let hidden = |i: &usize| !s.cards[*i].face_up && !s.cards[*i].matched;
    let known_partner = |face: &str, not: usize| {
        seen.iter()
            .find(|&(&i, &f)| i != not && f == face && hidden(&i))
            .map(|(&i, _)| i)
    };
    let unseen = (0..s.cards.len()).find(|i| !seen.contains_key(i) && hidden(i));

    if let Some(first) = s.first_pick {
        return known_partner(s.cards[first].face, first).or(unseen);
    }
    let mut known: Vec<(&usize, &&str)> = seen.iter().filter(|&(i, _)| hidden(i)).collect();
    known.sort();
    known
        .iter()
        .find_map(|&(&i, &face)| known_partner(face, i).map(|_| i))
        .or(unseen)
}

// Tic-Tac-Toe: win, block, center, otherwise a random cell

fn play_tictactoe(seed: u64) -> Option<DemoRun> {
    let mut rng = session_rng(seed);
    let mut state = TicTacToeState::new();
    run_frames(&mut state, |s, frame| {
        if frame % MOVE_EVERY == 0 {
            if let Some(cell) = tictactoe_choice(s, &mut rng) {
                s.place(cell);
            }
        }
    })
}

fn tictactoe_choice(s: &TicTacToeState, rng: &mut Pcg32) -> Option<usize> {
    let empty: Vec<usize> = s.empty_cells().collect();
    let completes = |mark: Mark| {
        empty.iter().copied().find(|&cell| {
            let mut board = s.board;
            board[cell] = Some(mark);
            tictactoe::winner(&board) == Some(mark)
        })
    };
    completes(s.next)
        .or_else(|| completes(s.next.other()))
        .or_else(|| empty.contains(&4).then_some(4))
        .or_else(|| (!empty.is_empty()).then(|| empty[rng.random_range(0..empty.len())]))
}

// Pong: the left paddle follows the ball, then dodges it after giving up

fn play_pong(config: PongConfig, seed: u64) -> Option<DemoRun> {
    let mut state = PongState::new(config, seed);
    run_frames(&mut state, |s, frame| {
        let paddle = s.left_y + pong::PADDLE_HEIGHT / 2.0;
        let ball = s.ball_pos.y + pong::BALL_SIZE / 2.0;
        // Small offset so rallies do not repeat exactly
        let offset = ((frame / 90) % 5) as f32 * 8.0 - 16.0;
        let target = if frame < GIVE_UP_FRAMES {
            ball + offset
        } else if ball < pong::HEIGHT / 2.0 {
            pong::HEIGHT
        } else {
            0.0
        };
        let dead_zone = s.config.paddle_speed;
        s.step(PongInput {
            left_up: target < paddle - dead_zone,
            left_down: target > paddle + dead_zone,
            start: s.phase == GamePhase::Ready,
            ..PongInput::default()
        });
    })
}

// Breakout: the paddle follows the ball, then dodges it after giving up

fn play_breakout(config: BreakoutConfig, seed: u64) -> Option<DemoRun> {
    let mut state = BreakoutState::new(config, seed);
    run_frames(&mut state, |s, frame| {
        let paddle = s.paddle_x + s.config.paddle_width / 2.0;
        let ball = s.ball_pos.x + breakout::BALL_SIZE / 2.0;
        let offset = ((frame / 120) % 3) as f32 * 20.0 - 20.0;
        let target = if frame < GIVE_UP_FRAMES {
            ball + offset
        } else if ball < breakout::WIDTH / 2.0 {
            breakout::WIDTH
        } else {
            0.0
        };
        let dead_zone = s.config.paddle_speed;
        s.step(BreakoutInput {
            left: target < paddle - dead_zone,
            right: target > paddle + dead_zone,
            launch: s.phase == GamePhase::Ready,
        });
    })
}

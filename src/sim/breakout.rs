//! Breakout: clear a 7×10 brick wall with three lives
//!
//! One `step` per rendered frame; velocities are in pixels per frame.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::{Ending, GameEvent, GamePhase, GameSession, SoundCue, session_rng};
use crate::game::GameId;
use crate::settings::Difficulty;
use crate::stats::GameOutcome;

pub const WIDTH: f32 = 1000.0;
pub const HEIGHT: f32 = 700.0;
pub const PADDLE_HEIGHT: f32 = 22.0;
/// Gap between the paddle and the bottom edge
pub const FLOOR_GAP: f32 = 5.0;
pub const BALL_SIZE: f32 = 16.0;
pub const BRICK_ROWS: usize = 7;
pub const BRICK_COLS: usize = 10;
pub const BRICK_WIDTH: f32 = 95.0;
pub const BRICK_HEIGHT: f32 = 30.0;
pub const BRICK_SPACING: f32 = 5.0;
pub const BRICK_ORIGIN: Vec2 = Vec2::new(35.0, 50.0);
pub const BRICK_POINTS: u32 = 10;
pub const START_LIVES: u32 = 3;
/// Ball speed cap (px/frame)
pub const MAX_BALL_SPEED: f32 = 12.0;
/// Row colors, repeated from the top when there are more rows than colors
pub const BRICK_COLORS: [&str; 5] = ["#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakoutConfig {
    pub ball_speed: f32,
    pub paddle_speed: f32,
    pub paddle_width: f32,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}

impl BreakoutConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (ball_speed, paddle_speed, paddle_width) = difficulty.breakout_tuning();
        Self {
            ball_speed,
            paddle_speed,
            paddle_width,
        }
    }
}

/// Held-key state for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakoutInput {
    pub left: bool,
    pub right: bool,
    /// Space: launch the ball
    pub launch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Brick {
    /// Top-left corner
    pub pos: Vec2,
    pub active: bool,
    pub color: &'static str,
}

impl Brick {
    fn overlaps(&self, ball: Vec2) -> bool {
        ball.x + BALL_SIZE > self.pos.x
            && ball.x < self.pos.x + BRICK_WIDTH
            && ball.y + BALL_SIZE > self.pos.y
            && ball.y < self.pos.y + BRICK_HEIGHT
    }
}

/// Full brick wall in row-major order
pub fn brick_wall() -> Vec<Brick> {
    (0..BRICK_ROWS)
        .flat_map(|row| {
            (0..BRICK_COLS).map(move |col| Brick {
                pos: BRICK_ORIGIN
                    + Vec2::new(
                        col as f32 * (BRICK_WIDTH + BRICK_SPACING),
                        row as f32 * (BRICK_HEIGHT + BRICK_SPACING),
                    ),
                active: true,
                color: BRICK_COLORS[row % BRICK_COLORS.len()],
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakoutState {
    pub config: BreakoutConfig,
    /// Left edge of the paddle
    pub paddle_x: f32,
    /// Top-left corner of the ball
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
    pub bricks: Vec<Brick>,
    pub score: u64,
    pub lives: u32,
    pub phase: GamePhase,
    #[serde(skip)]
    rng: Pcg32,
}

impl BreakoutState {
    pub fn new(config: BreakoutConfig, seed: u64) -> Self {
        let mut state = Self {
            config,
            paddle_x: (WIDTH - config.paddle_width) / 2.0,
            ball_pos: Vec2::ZERO,
            ball_vel: Vec2::ZERO,
            bricks: brick_wall(),
            score: 0,
            lives: START_LIVES,
            phase: GamePhase::Ready,
            rng: session_rng(seed),
        };
        state.serve();
        state
    }

    /// Ball above the paddle, heading up and to a random side
    fn serve(&mut self) {
        self.ball_pos = Vec2::new(WIDTH / 2.0, HEIGHT - 40.0);
        let dir = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.ball_vel = Vec2::new(dir * self.config.ball_speed, -self.config.ball_speed);
    }

    /// Top edge of the paddle
    pub fn paddle_y(&self) -> f32 {
        HEIGHT - PADDLE_HEIGHT - FLOOR_GAP
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|b| b.active).count()
    }

    fn end(&mut self, ending: Ending, events: &mut Vec<GameEvent>) {
        self.phase = GamePhase::Over(ending);
        let cue = match ending {
            Ending::Won => SoundCue::Win,
            _ => SoundCue::Lose,
        };
        events.push(GameEvent::Sound(cue));
        events.push(GameEvent::Ended(ending));
        log::debug!("Breakout over: {:?}, score {}", ending, self.score);
    }

    /// Advance one frame
    pub fn step(&mut self, input: BreakoutInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.phase {
            GamePhase::Over(_) | GamePhase::Paused => return events,
            GamePhase::Ready => {
                if input.launch {
                    self.phase = GamePhase::Playing;
                    events.push(GameEvent::Sound(SoundCue::Click));
                }
                return events;
            }
            GamePhase::Playing => {}
        }

        let width = self.config.paddle_width;
        if input.left {
            self.paddle_x -= self.config.paddle_speed;
        }
        if input.right {
            self.paddle_x += self.config.paddle_speed;
        }
        self.paddle_x = self.paddle_x.clamp(0.0, WIDTH - width);

        let mut pos = self.ball_pos + self.ball_vel;

        // Side walls and ceiling
        if pos.x <= 0.0 || pos.x >= WIDTH - BALL_SIZE {
            self.ball_vel.x = -self.ball_vel.x;
            pos.x = pos.x.clamp(0.0, WIDTH - BALL_SIZE);
            events.push(GameEvent::Sound(SoundCue::Hit));
        }
        if pos.y <= 0.0 {
            self.ball_vel.y = -self.ball_vel.y;
            pos.y = 0.0;
            events.push(GameEvent::Sound(SoundCue::Hit));
        }

        // Paddle: always bounce upward, deflect by hit position
        let paddle_y = self.paddle_y();
        if pos.y + BALL_SIZE >= paddle_y
            && pos.y <= HEIGHT - PADDLE_HEIGHT
            && pos.x + BALL_SIZE >= self.paddle_x
            && pos.x <= self.paddle_x + width
        {
            self.ball_vel.y = -self.ball_vel.y.abs();
            let hit = (pos.x - self.paddle_x) / width - 0.5;
            self.ball_vel.x += hit * 2.0;
            self.ball_vel = self.ball_vel.clamp_length_max(MAX_BALL_SPEED);
            pos.y = paddle_y - BALL_SIZE;
            events.push(GameEvent::Sound(SoundCue::Hit));
        }

        // At most one brick per frame
        if let Some(brick) = self.bricks.iter_mut().find(|b| b.active && b.overlaps(pos)) {
            brick.active = false;
            self.ball_vel.y = -self.ball_vel.y;
            self.score += u64::from(BRICK_POINTS);
            events.push(GameEvent::Scored(BRICK_POINTS));
            events.push(GameEvent::Sound(SoundCue::Coin));
        }

        if pos.y > HEIGHT {
            self.lives = self.lives.saturating_sub(1);
            events.push(GameEvent::Sound(SoundCue::Error));
            if self.lives == 0 {
                self.end(Ending::Lost, &mut events);
            } else {
                log::debug!("Breakout life lost, {} left", self.lives);
                self.serve();
                self.phase = GamePhase::Ready;
            }
            return events;
        }

        self.ball_pos = pos;
        if self.bricks_left() == 0 {
            self.end(Ending::Won, &mut events);
        }
        events
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.phase.toggle_pause()
    }
}

impl GameSession for BreakoutState {
    fn game_id(&self) -> GameId {
        GameId::Breakout
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.phase
            .is_over()
            .then(|| GameOutcome::scored(GameId::Breakout, self.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launched() -> BreakoutState {
        let mut s = BreakoutState::new(BreakoutConfig::default(), 5);
        s.step(BreakoutInput {
            launch: true,
            ..BreakoutInput::default()
        });
        assert_eq!(s.phase, GamePhase::Playing);
        s
    }

    #[test]
    fn test_brick_layout() {
        let wall = brick_wall();
        assert_eq!(wall.len(), BRICK_ROWS * BRICK_COLS);
        assert_eq!(wall[0].pos, Vec2::new(35.0, 50.0));
        assert_eq!(wall[1].pos, Vec2::new(135.0, 50.0));
        assert_eq!(wall[BRICK_COLS].pos, Vec2::new(35.0, 85.0));
        // Rows past the palette reuse colors
        assert_eq!(wall[5 * BRICK_COLS].color, BRICK_COLORS[0]);
        assert_eq!(wall[6 * BRICK_COLS].color, BRICK_COLORS[1]);
    }

    #[test]
    fn test_brick_hit_scores_once() {
        let mut s = launched();
        s.ball_pos = Vec2::new(60.0, 75.0);
        s.ball_vel = Vec2::new(0.0, -3.0);
        let events = s.step(BreakoutInput::default());
        assert!(events.contains(&GameEvent::Scored(BRICK_POINTS)));
        assert_eq!(s.score, 10);
        assert_eq!(s.bricks_left(), BRICK_ROWS * BRICK_COLS - 1);
        assert_eq!(s.ball_vel.y, 3.0);
    }

    #[test]
    fn test_paddle_bounces_up_with_deflection() {
        let mut s = launched();
        s.paddle_x = 400.0;
        let paddle_y = s.paddle_y();
        // Ball lands on the right edge of the paddle
        s.ball_pos = Vec2::new(400.0 + s.config.paddle_width - 2.0, paddle_y - BALL_SIZE - 1.0);
        s.ball_vel = Vec2::new(0.0, 2.5);
        s.step(BreakoutInput::default());
        assert!(s.ball_vel.y < 0.0);
        assert!(s.ball_vel.x > 0.0);
        assert_eq!(s.ball_pos.y, paddle_y - BALL_SIZE);
    }

    #[test]
    fn test_edge_hits_never_exceed_speed_cap() {
        let mut s = launched();
        s.paddle_x = 400.0;
        let paddle_y = s.paddle_y();
        let edge = 400.0 + s.config.paddle_width - 2.0;
        for _ in 0..40 {
            s.ball_vel.y = s.ball_vel.y.abs();
            s.ball_pos = Vec2::new(edge - s.ball_vel.x, paddle_y - BALL_SIZE - s.ball_vel.y + 1.0);
            s.step(BreakoutInput::default());
            assert!(s.ball_vel.y < 0.0);
            assert!(s.ball_vel.length() <= MAX_BALL_SPEED + 1e-4);
        }
        assert!(s.ball_vel.x > MAX_BALL_SPEED * 0.9);

        // Wall and brick reflections keep the capped speed
        let speed = s.ball_vel.length();
        s.ball_pos = Vec2::new(WIDTH - BALL_SIZE - 1.0, 400.0);
        s.step(BreakoutInput::default());
        assert!(s.ball_vel.x < 0.0);
        assert!((s.ball_vel.length() - speed).abs() < 1e-5);

        s.ball_pos = Vec2::new(60.0, 75.0);
        let events = s.step(BreakoutInput::default());
        assert!(events.contains(&GameEvent::Scored(BRICK_POINTS)));
        assert!(s.ball_vel.y > 0.0);
        assert!((s.ball_vel.length() - speed).abs() < 1e-5);
    }

    #[test]
    fn test_life_lost_returns_to_ready() {
        let mut s = launched();
        s.paddle_x = 0.0;
        s.ball_pos = Vec2::new(900.0, HEIGHT - 1.0);
        s.ball_vel = Vec2::new(0.0, 3.0);
        s.step(BreakoutInput::default());
        assert_eq!(s.lives, 2);
        assert_eq!(s.phase, GamePhase::Ready);
        assert_eq!(s.ball_pos, Vec2::new(WIDTH / 2.0, HEIGHT - 40.0));
        assert!(s.ball_vel.y < 0.0);
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut s = launched();
        s.lives = 1;
        s.score = 40;
        s.paddle_x = 0.0;
        s.ball_pos = Vec2::new(900.0, HEIGHT - 1.0);
        s.ball_vel = Vec2::new(0.0, 3.0);
        let events = s.step(BreakoutInput::default());
        assert!(events.contains(&GameEvent::Ended(Ending::Lost)));
        assert_eq!(s.outcome(), Some(GameOutcome::scored(GameId::Breakout, 40)));
    }

    #[test]
    fn test_clearing_wall_wins() {
        let mut s = launched();
        for brick in s.bricks.iter_mut().skip(1) {
            brick.active = false;
        }
        s.ball_pos = Vec2::new(60.0, 75.0);
        s.ball_vel = Vec2::new(0.0, -3.0);
        let events = s.step(BreakoutInput::default());
        assert!(events.contains(&GameEvent::Ended(Ending::Won)));
        assert_eq!(s.phase, GamePhase::Over(Ending::Won));
    }

    #[test]
    fn test_side_wall_reflects() {
        let mut s = launched();
        s.ball_pos = Vec2::new(1.0, 400.0);
        s.ball_vel = Vec2::new(-3.0, -3.0);
        s.step(BreakoutInput::default());
        assert_eq!(s.ball_vel, Vec2::new(3.0, -3.0));
        assert_eq!(s.ball_pos.x, 0.0);
    }

    #[test]
    fn test_paddle_clamped() {
        let mut s = launched();
        s.paddle_x = 5.0;
        s.ball_pos = Vec2::new(500.0, 400.0);
        s.ball_vel = Vec2::new(0.0, -1.0);
        s.step(BreakoutInput {
            left: true,
            ..BreakoutInput::default()
        });
        assert_eq!(s.paddle_x, 0.0);
    }
}

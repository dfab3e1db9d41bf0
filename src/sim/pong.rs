//! Pong: two paddles, first to 5 points
//!
//! One `step` per rendered frame. Velocities are in pixels per frame. The
//! left paddle is the local player; the right paddle is either a second
//! player or a simple tracking AI.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::{Ending, GameEvent, GamePhase, GameSession, SoundCue, session_rng};
use crate::game::GameId;
use crate::settings::Difficulty;
use crate::stats::GameOutcome;

/// Court dimensions
pub const WIDTH: f32 = 1000.0;
pub const HEIGHT: f32 = 700.0;
pub const PADDLE_WIDTH: f32 = 15.0;
pub const PADDLE_HEIGHT: f32 = 130.0;
pub const BALL_SIZE: f32 = 16.0;
pub const WIN_SCORE: u32 = 5;
/// Horizontal speed-up on every paddle hit (multiplicative)
pub const PADDLE_BOOST: f32 = 1.05;
/// Vertical deflection per pixel of offset from paddle center
pub const DEFLECTION: f32 = 0.1;
/// Ball speed cap (px/frame)
pub const MAX_BALL_SPEED: f32 = 18.0;
/// Range of the random vertical serve component
pub const SERVE_SPREAD: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Opponent {
    Human,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PongConfig {
    pub ball_speed: f32,
    pub ai_speed: f32,
    pub paddle_speed: f32,
    pub opponent: Opponent,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}

impl PongConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (ball_speed, ai_speed, paddle_speed) = difficulty.pong_speeds();
        Self {
            ball_speed,
            ai_speed,
            paddle_speed,
            opponent: Opponent::Ai,
        }
    }
}

/// Held-key state for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PongInput {
    pub left_up: bool,
    pub left_down: bool,
    /// Ignored when the opponent is the AI
    pub right_up: bool,
    pub right_down: bool,
    /// Space/Enter: start the match
    pub start: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PongState {
    pub config: PongConfig,
    /// Top edge of each paddle
    pub left_y: f32,
    pub right_y: f32,
    /// Top-left corner of the ball
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
    pub left_score: u32,
    pub right_score: u32,
    pub phase: GamePhase,
    #[serde(skip)]
    rng: Pcg32,
}

impl PongState {
    pub fn new(config: PongConfig, seed: u64) -> Self {
        let mut state = Self {
            config,
            left_y: (HEIGHT - PADDLE_HEIGHT) / 2.0,
            right_y: (HEIGHT - PADDLE_HEIGHT) / 2.0,
            ball_pos: Vec2::ZERO,
            ball_vel: Vec2::ZERO,
            left_score: 0,
            right_score: 0,
            phase: GamePhase::Ready,
            rng: session_rng(seed),
        };
        state.serve();
        state
    }

    /// Center the ball with a random horizontal side and vertical spread
    fn serve(&mut self) {
        self.ball_pos = Vec2::new(WIDTH / 2.0, HEIGHT / 2.0);
        let dir = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let vy = (self.rng.random::<f32>() - 0.5) * SERVE_SPREAD;
        self.ball_vel = Vec2::new(dir * self.config.ball_speed, vy);
    }

    fn move_paddle(y: f32, up: bool, down: bool, speed: f32) -> f32 {
        let mut y = y;
        if up {
            y -= speed;
        }
        if down {
            y += speed;
        }
        y.clamp(0.0, HEIGHT - PADDLE_HEIGHT)
    }

    /// Right paddle AI: move its center toward the ball
    fn ai_target(&self) -> (bool, bool) {
        let center = self.right_y + PADDLE_HEIGHT / 2.0;
        let ball = self.ball_pos.y + BALL_SIZE / 2.0;
        let dead_zone = self.config.ai_speed;
        (ball < center - dead_zone, ball > center + dead_zone)
    }

    /// Bounce off a paddle: reverse x away from it, speed up, deflect by offset
    fn paddle_bounce(&mut self, paddle_y: f32, away: f32) {
        let speed_x = (self.ball_vel.x.abs() * PADDLE_BOOST).min(MAX_BALL_SPEED);
        self.ball_vel.x = away * speed_x;
        self.ball_vel.y += (self.ball_pos.y - (paddle_y + PADDLE_HEIGHT / 2.0)) * DEFLECTION;
        self.ball_vel = self.ball_vel.clamp_length_max(MAX_BALL_SPEED);
    }

    fn point(&mut self, left_scored: bool, events: &mut Vec<GameEvent>) {
        events.push(GameEvent::Sound(SoundCue::Coin));
        let score = if left_scored {
            events.push(GameEvent::Scored(1));
            self.left_score += 1;
            self.left_score
        } else {
            self.right_score += 1;
            self.right_score
        };

        if score >= WIN_SCORE {
            let ending = if left_scored { Ending::Won } else { Ending::Lost };
            self.phase = GamePhase::Over(ending);
            events.push(GameEvent::Sound(SoundCue::Win));
            events.push(GameEvent::Ended(ending));
            log::debug!("Pong over: {}-{}", self.left_score, self.right_score);
        }
        self.serve();
    }

    /// Advance one frame
    pub fn step(&mut self, input: PongInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.phase {
            GamePhase::Over(_) | GamePhase::Paused => return events,
            GamePhase::Ready => {
                if input.start {
                    self.phase = GamePhase::Playing;
                    events.push(GameEvent::Sound(SoundCue::Click));
                }
                return events;
            }
            GamePhase::Playing => {}
        }

        let speed = self.config.paddle_speed;
        self.left_y = Self::move_paddle(self.left_y, input.left_up, input.left_down, speed);
        let (up, down, right_speed) = match self.config.opponent {
            Opponent::Human => (input.right_up, input.right_down, speed),
            Opponent::Ai => {
                let (up, down) = self.ai_target();
                (up, down, self.config.ai_speed)
            }
        };
        self.right_y = Self::move_paddle(self.right_y, up, down, right_speed);

        let mut pos = self.ball_pos + self.ball_vel;

        // Top/bottom walls
        if pos.y <= 0.0 || pos.y >= HEIGHT - BALL_SIZE {
            self.ball_vel.y = -self.ball_vel.y;
            pos.y = pos.y.clamp(0.0, HEIGHT - BALL_SIZE);
            events.push(GameEvent::Sound(SoundCue::Hit));
        }

        let overlaps =
            |paddle_y: f32| pos.y + BALL_SIZE >= paddle_y && pos.y <= paddle_y + PADDLE_HEIGHT;

        // No outer bound: a fast ball may cross the whole paddle in one frame
        if self.ball_vel.x < 0.0 && pos.x <= PADDLE_WIDTH && overlaps(self.left_y) {
            pos.x = PADDLE_WIDTH;
            self.ball_pos = pos;
            self.paddle_bounce(self.left_y, 1.0);
            events.push(GameEvent::Sound(SoundCue::Hit));
        } else if self.ball_vel.x > 0.0
            && pos.x >= WIDTH - PADDLE_WIDTH - BALL_SIZE
            && overlaps(self.right_y)
        {
            pos.x = WIDTH - PADDLE_WIDTH - BALL_SIZE;
            self.ball_pos = pos;
            self.paddle_bounce(self.right_y, -1.0);
            events.push(GameEvent::Sound(SoundCue::Hit));
        }

        if pos.x < 0.0 {
            self.point(false, &mut events);
        } else if pos.x > WIDTH {
            self.point(true, &mut events);
        } else {
            self.ball_pos = pos;
        }
        events
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.phase.toggle_pause()
    }

    pub fn winner(&self) -> Option<Ending> {
        match self.phase {
            GamePhase::Over(ending) => Some(ending),
            _ => None,
        }
    }
}

impl GameSession for PongState {
    fn game_id(&self) -> GameId {
        GameId::Pong
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u64 {
        u64::from(self.left_score)
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.winner()
            .map(|ending| GameOutcome::decided(GameId::Pong, ending == Ending::Won))
    }
}

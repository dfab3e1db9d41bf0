//! User preferences
//!
//! Persisted as one document in the key-value store, separately from stats.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, keys};
use crate::platform::KeyValueStore;

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    /// Snake tick interval at the start of a game (ms)
    pub fn snake_interval_ms(&self) -> u32 {
        match self {
            Difficulty::Easy => 200,
            Difficulty::Normal => 150,
            Difficulty::Hard | Difficulty::Expert => 100,
        }
    }

    /// Tetris drop interval at level 1 (ms)
    pub fn tetris_base_drop_ms(&self) -> u32 {
        match self {
            Difficulty::Easy => 1200,
            Difficulty::Normal => 1000,
            Difficulty::Hard | Difficulty::Expert => 700,
        }
    }

    /// Pong (ball speed, AI paddle speed, player paddle speed) in px/frame
    pub fn pong_speeds(&self) -> (f32, f32, f32) {
        match self {
            Difficulty::Easy => (2.0, 3.5, 8.0),
            Difficulty::Normal => (2.5, 4.5, 7.0),
            Difficulty::Hard => (3.5, 5.5, 6.0),
            Difficulty::Expert => (4.5, 7.0, 5.0),
        }
    }

    /// Breakout (ball speed px/frame, paddle speed px/frame, paddle width px)
    pub fn breakout_tuning(&self) -> (f32, f32, f32) {
        match self {
            Difficulty::Easy => (2.0, 10.0, 140.0),
            Difficulty::Normal => (2.5, 8.0, 120.0),
            Difficulty::Hard => (3.5, 7.0, 100.0),
            Difficulty::Expert => (4.5, 6.0, 80.0),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dark color scheme
    pub dark_mode: bool,
    /// Sound effects on/off
    pub sound_enabled: bool,
    /// Sound volume (0.0 - 1.0)
    pub volume: f32,
    /// UI animations
    pub show_animations: bool,
    /// Difficulty applied to every game that supports it
    pub difficulty: Difficulty,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            sound_enabled: true,
            volume: 0.5,
            show_animations: true,
            difficulty: Difficulty::Normal,
        }
    }
}

impl Settings {
    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    /// Returns the new enabled state
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    pub fn toggle_animations(&mut self) {
        self.show_animations = !self.show_animations;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.5 };
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Volume actually applied to sound cues (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.sound_enabled { self.volume } else { 0.0 }
    }

    /// Load settings, defaulting when missing or corrupt
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load::<Settings>(store, keys::SETTINGS) {
            Some(mut settings) => {
                settings.set_volume(settings.volume);
                log::info!("Loaded settings (difficulty {})", settings.difficulty.as_str());
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        persistence::save_logged(store, keys::SETTINGS, self);
        log::info!("Settings saved");
    }
}

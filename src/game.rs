//! Game identifiers and the static game catalog

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string does not name one of the seven games
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game id: {0:?}")]
pub struct UnknownGame(pub String);

/// One of the seven games in the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Snake,
    Tetris,
    #[serde(rename = "tictactoe")]
    TicTacToe,
    Pong,
    #[serde(rename = "2048")]
    Game2048,
    Memory,
    Breakout,
}

/// How a game's sessions are aggregated into statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameFamily {
    /// Sessions end with a point total (high score, total score)
    Score,
    /// Sessions end in a win, loss or draw
    Outcome,
    /// Sessions end with a move count (fewer is better)
    Moves,
}

impl GameId {
    /// All games in menu order
    pub const ALL: [GameId; 7] = [
        GameId::Snake,
        GameId::Tetris,
        GameId::TicTacToe,
        GameId::Pong,
        GameId::Game2048,
        GameId::Memory,
        GameId::Breakout,
    ];

    /// Stable id used in storage keys and serialized stats
    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Snake => "snake",
            GameId::Tetris => "tetris",
            GameId::TicTacToe => "tictactoe",
            GameId::Pong => "pong",
            GameId::Game2048 => "2048",
            GameId::Memory => "memory",
            GameId::Breakout => "breakout",
        }
    }

    pub fn family(&self) -> GameFamily {
        match self {
            GameId::TicTacToe | GameId::Pong => GameFamily::Outcome,
            GameId::Memory => GameFamily::Moves,
            GameId::Snake | GameId::Tetris | GameId::Game2048 | GameId::Breakout => {
                GameFamily::Score
            }
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameId::Snake => "Snake",
            GameId::Tetris => "Tetris",
            GameId::TicTacToe => "Tic-Tac-Toe",
            GameId::Pong => "Pong",
            GameId::Game2048 => "2048",
            GameId::Memory => "Memory Match",
            GameId::Breakout => "Breakout",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            GameId::Snake => "🐍",
            GameId::Tetris => "🟦",
            GameId::TicTacToe => "⭕",
            GameId::Pong => "🏓",
            GameId::Game2048 => "🔢",
            GameId::Memory => "🧠",
            GameId::Breakout => "🧱",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameId::Snake => "Classic snake game. Eat food, grow longer!",
            GameId::Tetris => "Stack blocks and clear lines!",
            GameId::TicTacToe => "Classic two-player strategy game!",
            GameId::Pong => "Classic arcade tennis game!",
            GameId::Game2048 => "Merge tiles to reach 2048!",
            GameId::Memory => "Find all matching pairs!",
            GameId::Breakout => "Break all the bricks with the ball!",
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameId {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameId::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| UnknownGame(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_id() {
        for game in GameId::ALL {
            assert_eq!(game.as_str().parse::<GameId>(), Ok(game));
        }
    }

    #[test]
    fn test_unknown_id_is_error() {
        let err = "chess".parse::<GameId>().unwrap_err();
        assert_eq!(err, UnknownGame("chess".to_string()));
    }

    #[test]
    fn test_serde_uses_storage_ids() {
        let json = serde_json::to_string(&GameId::Game2048).unwrap();
        assert_eq!(json, "\"2048\"");
        let back: GameId = serde_json::from_str("\"tictactoe\"").unwrap();
        assert_eq!(back, GameId::TicTacToe);
    }

    #[test]
    fn test_families() {
        assert_eq!(GameId::Pong.family(), GameFamily::Outcome);
        assert_eq!(GameId::Memory.family(), GameFamily::Moves);
        assert_eq!(GameId::Breakout.family(), GameFamily::Score);
    }
}

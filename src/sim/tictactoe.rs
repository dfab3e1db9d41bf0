//! Tic-Tac-Toe for two local players
//!
//! X always opens. The session keeps a running tally across rounds; the
//! recorded outcome is from X's point of view.

use serde::Serialize;

use super::{Ending, GameEvent, GamePhase, GameSession, SoundCue};
use crate::game::GameId;
use crate::stats::GameOutcome;

/// The 8 winning triples: rows, columns, diagonals
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

pub type Board = [Option<Mark>; 9];

/// First line in `LINES` order held by a single mark
pub fn winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| match board[a] {
        Some(mark) if board[b] == Some(mark) && board[c] == Some(mark) => Some(mark),
        _ => None,
    })
}

/// Wins and draws over the whole session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub x_wins: u32,
    pub o_wins: u32,
    pub draws: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicTacToeState {
    pub board: Board,
    pub next: Mark,
    pub winner: Option<Mark>,
    pub tally: Tally,
    pub phase: GamePhase,
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToeState {
    pub fn new() -> Self {
        Self {
            board: [None; 9],
            next: Mark::X,
            winner: None,
            tally: Tally::default(),
            phase: GamePhase::Playing,
        }
    }

    /// Clear the board for another round, keeping the tally
    pub fn new_round(&mut self) {
        self.board = [None; 9];
        self.next = Mark::X;
        self.winner = None;
        self.phase = GamePhase::Playing;
    }

    /// Place the next mark on `cell` (row-major 0..9)
    ///
    /// Occupied cells, out-of-range cells and moves after the round ended
    /// are ignored and do not pass the turn.
    pub fn place(&mut self, cell: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase.is_over() {
            return events;
        }
        match self.board.get(cell) {
            Some(None) => {}
            _ => return events,
        }

        self.board[cell] = Some(self.next);
        self.next = self.next.other();
        events.push(GameEvent::Sound(SoundCue::Click));

        if let Some(mark) = winner(&self.board) {
            self.winner = Some(mark);
            let ending = match mark {
                Mark::X => {
                    self.tally.x_wins += 1;
                    Ending::Won
                }
                Mark::O => {
                    self.tally.o_wins += 1;
                    Ending::Lost
                }
            };
            self.phase = GamePhase::Over(ending);
            events.push(GameEvent::Sound(SoundCue::Win));
            events.push(GameEvent::Ended(ending));
        } else if self.board.iter().all(Option::is_some) {
            self.tally.draws += 1;
            self.phase = GamePhase::Over(Ending::Draw);
            events.push(GameEvent::Ended(Ending::Draw));
        }
        events
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..9).filter(|&i| self.board[i].is_none())
    }
}

impl GameSession for TicTacToeState {
    fn game_id(&self) -> GameId {
        GameId::TicTacToe
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u64 {
        u64::from(self.tally.x_wins)
    }

    fn outcome(&self) -> Option<GameOutcome> {
        match self.phase {
            GamePhase::Over(Ending::Draw) => Some(GameOutcome::drawn(GameId::TicTacToe)),
            GamePhase::Over(_) => Some(GameOutcome::decided(
                GameId::TicTacToe,
                self.winner == Some(Mark::X),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    fn play(cells: &[usize]) -> TicTacToeState {
        let mut s = TicTacToeState::new();
        for &cell in cells {
            s.place(cell);
        }
        s
    }

    #[test]
    fn test_every_line_wins() {
        for line in LINES {
            for mark in [Mark::X, Mark::O] {
                let mut board: Board = [None; 9];
                for cell in line {
                    board[cell] = Some(mark);
                }
                assert_eq!(winner(&board), Some(mark), "line {:?}", line);
            }
        }
    }

    #[test]
    fn test_middle_column_fixture() {
        // O holds 1, 4, 7; no other triple is uniform
        let board = [X, O, X, X, O, O, E, O, X];
        let owners: Vec<_> = LINES
            .iter()
            .filter(|&&[a, b, c]| {
                board[a].is_some() && board[a] == board[b] && board[b] == board[c]
            })
            .collect();
        assert_eq!(owners, vec![&[1, 4, 7]]);
        assert_eq!(winner(&board), Some(Mark::O));
    }

    #[test]
    fn test_full_board_without_line() {
        // Column 1 reads O, O, X here
        let board = [X, O, X, X, O, O, O, X, X];
        assert_eq!(winner(&board), None);
    }

    #[test]
    fn test_turns_alternate_on_valid_moves_only() {
        let mut s = TicTacToeState::new();
        s.place(4);
        assert_eq!(s.next, Mark::O);
        assert!(s.place(4).is_empty());
        assert!(s.place(9).is_empty());
        assert_eq!(s.next, Mark::O);
        s.place(0);
        assert_eq!(s.board[0], O);
    }

    #[test]
    fn test_x_wins_and_tally() {
        let mut s = play(&[0, 3, 1, 4, 2]);
        assert_eq!(s.winner, Some(Mark::X));
        assert_eq!(s.phase, GamePhase::Over(Ending::Won));
        assert_eq!(s.outcome(), Some(GameOutcome::decided(GameId::TicTacToe, true)));
        // Board is frozen
        assert!(s.place(8).is_empty());

        s.new_round();
        for cell in [0, 3, 1, 4, 8, 5] {
            s.place(cell);
        }
        assert_eq!(s.outcome(), Some(GameOutcome::decided(GameId::TicTacToe, false)));
        assert_eq!(
            s.tally,
            Tally {
                x_wins: 1,
                o_wins: 1,
                draws: 0
            }
        );
    }

    #[test]
    fn test_draw() {
        let s = play(&[0, 1, 2, 4, 3, 5, 7, 6, 8]);
        assert_eq!(s.winner, None);
        assert_eq!(s.phase, GamePhase::Over(Ending::Draw));
        assert_eq!(s.tally.draws, 1);
        assert_eq!(s.outcome(), Some(GameOutcome::drawn(GameId::TicTacToe)));
    }

    proptest! {
        #[test]
        fn prop_mark_counts_stay_balanced(cells in prop::collection::vec(0usize..12, 0..30)) {
            let mut s = TicTacToeState::new();
            for cell in cells {
                s.place(cell);
                let xs = s.board.iter().filter(|&&c| c == X).count();
                let os = s.board.iter().filter(|&&c| c == O).count();
                prop_assert!(xs == os || xs == os + 1);
            }
        }
    }
}

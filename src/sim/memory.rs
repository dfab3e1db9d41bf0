//! Memory Match: find the 8 pairs in a shuffled deck of 16 cards
//!
//! Time only matters for the reveal delay after two cards are turned, so the
//! host reports elapsed milliseconds with `MemoryInput::Elapsed` instead of
//! running a fixed tick.

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::{Ending, GameEvent, GamePhase, GameSession, SoundCue, session_rng};
use crate::game::GameId;
use crate::stats::GameOutcome;

pub const FACES: [&str; 8] = ["🎮", "🎯", "🎲", "🎪", "🎨", "🎭", "🎸", "🎹"];
pub const DECK_SIZE: usize = FACES.len() * 2;
/// Delay before a matching pair is marked matched
pub const MATCH_DELAY_MS: f64 = 500.0;
/// Delay before a mismatched pair turns back over
pub const MISMATCH_DELAY_MS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Card {
    pub face: &'static str,
    pub face_up: bool,
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemoryInput {
    /// Turn the card at this deck index
    Flip(usize),
    /// Host time since the previous input
    Elapsed(f64),
}

/// Two face-up cards waiting for their reveal delay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingPair {
    pub first: usize,
    pub second: usize,
    pub is_match: bool,
    pub remaining_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryState {
    pub cards: Vec<Card>,
    /// Face-up unmatched card awaiting its partner
    pub first_pick: Option<usize>,
    pub pending: Option<PendingPair>,
    pub moves: u32,
    pub matches: u32,
    pub phase: GamePhase,
    #[serde(skip)]
    rng: Pcg32,
}

impl MemoryState {
    pub fn new(seed: u64) -> Self {
        let mut rng = session_rng(seed);
        Self {
            cards: Self::deal(&mut rng),
            first_pick: None,
            pending: None,
            moves: 0,
            matches: 0,
            phase: GamePhase::Playing,
            rng,
        }
    }

    fn deal(rng: &mut Pcg32) -> Vec<Card> {
        let mut faces: Vec<&'static str> = FACES.iter().chain(FACES.iter()).copied().collect();
        faces.shuffle(rng);
        faces
            .into_iter()
            .map(|face| Card {
                face,
                face_up: false,
                matched: false,
            })
            .collect()
    }

    /// Deal a new shuffled deck and clear the counters
    pub fn reset(&mut self) {
        self.cards = Self::deal(&mut self.rng);
        self.first_pick = None;
        self.pending = None;
        self.moves = 0;
        self.matches = 0;
        self.phase = GamePhase::Playing;
    }

    /// Number of face-up cards not yet matched (always 0, 1 or 2)
    pub fn face_up_count(&self) -> usize {
        self.cards.iter().filter(|c| c.face_up && !c.matched).count()
    }

    pub fn step(&mut self, input: MemoryInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase.is_over() {
            return events;
        }
        match input {
            MemoryInput::Flip(index) => self.flip(index, &mut events),
            MemoryInput::Elapsed(ms) => self.elapse(ms, &mut events),
        }
        events
    }

    fn flip(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        if self.pending.is_some() {
            return;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return;
        };
        if card.face_up || card.matched {
            return;
        }
        card.face_up = true;
        events.push(GameEvent::Sound(SoundCue::Click));

        let Some(first) = self.first_pick.take() else {
            self.first_pick = Some(index);
            return;
        };

        self.moves += 1;
        let is_match = self.cards[first].face == self.cards[index].face;
        events.push(GameEvent::Sound(if is_match {
            SoundCue::Success
        } else {
            SoundCue::Error
        }));
        self.pending = Some(PendingPair {
            first,
            second: index,
            is_match,
            remaining_ms: if is_match {
                MATCH_DELAY_MS
            } else {
                MISMATCH_DELAY_MS
            },
        });
    }

    fn elapse(&mut self, ms: f64, events: &mut Vec<GameEvent>) {
        let Some(mut pair) = self.pending else {
            return;
        };
        pair.remaining_ms -= ms.max(0.0);
        if pair.remaining_ms > 0.0 {
            self.pending = Some(pair);
            return;
        }
        self.pending = None;

        for index in [pair.first, pair.second] {
            let card = &mut self.cards[index];
            if pair.is_match {
                card.matched = true;
            } else {
                card.face_up = false;
            }
        }
        if !pair.is_match {
            return;
        }

        self.matches += 1;
        if self.matches as usize == FACES.len() {
            self.phase = GamePhase::Over(Ending::Won);
            events.push(GameEvent::Sound(SoundCue::Win));
            events.push(GameEvent::Ended(Ending::Won));
            log::debug!("Memory cleared in {} moves", self.moves);
        }
    }
}

impl GameSession for MemoryState {
    fn game_id(&self) -> GameId {
        GameId::Memory
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u64 {
        u64::from(self.matches)
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.phase
            .is_over()
            .then(|| GameOutcome::with_moves(GameId::Memory, self.moves))
    }
}

//! Memory card matching.
//!
//! Two face-up cards are compared once the second is flipped. A pair
//! stays visible for a short reveal before it is marked matched; a
//! mismatch stays visible a little longer before both flip back. While
//! a pair is waiting on its reveal no further card can be flipped.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::{
    ChallengeInput, ChallengeMachine, ChallengeSnapshot, ChallengeTiming, FailureReason,
    PuzzleView, Status, Verdict,
};
use crate::alarm::ChallengeKind;
use crate::difficulty::Difficulty;
use crate::timer::{Countdown, DelayQueue};

pub const CARD_FACES: [&str; 16] = [
    "🎯", "🎮", "🎨", "🎪", "🎭", "🎲", "🎸", "🎺", "🎻", "🎹", "🏆", "🏅", "⚽", "🏀", "🎾", "🏐",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryCard {
    pub face: &'static str,
    pub face_up: bool,
    pub matched: bool,
}

/// Shuffled deck holding every face exactly twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDeck {
    faces: Vec<&'static str>,
}

impl MemoryDeck {
    pub fn from_faces(faces: Vec<&'static str>) -> Self {
        assert!(faces.len() % 2 == 0, "a memory deck needs an even card count");
        Self { faces }
    }

    pub fn generate<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Self {
        let pairs = Self::pair_count(difficulty);
        assert!(pairs <= CARD_FACES.len(), "not enough card faces for {pairs} pairs");
        let mut faces: Vec<&'static str> = CARD_FACES[..pairs]
            .iter()
            .chain(CARD_FACES[..pairs].iter())
            .copied()
            .collect();
        faces.shuffle(rng);
        Self { faces }
    }

    pub fn pair_count(difficulty: Difficulty) -> usize {
        difficulty.pick(6, 8, 10)
    }

    pub fn faces(&self) -> &[&'static str] {
        &self.faces
    }

    pub fn pairs(&self) -> usize {
        self.faces.len() / 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reveal {
    Match(usize, usize),
    Mismatch(usize, usize),
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    /// `None` while the card is face down.
    pub face: Option<&'static str>,
    pub matched: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryView {
    pub cards: Vec<CardView>,
    pub matches: usize,
    pub pairs: usize,
    pub moves: u32,
}

#[derive(Debug, Clone)]
pub struct MemoryChallenge {
    difficulty: Difficulty,
    cards: Vec<MemoryCard>,
    /// Face-up cards not yet resolved (at most two).
    flipped: Vec<usize>,
    matches: usize,
    moves: u32,
    timing: ChallengeTiming,
    reveals: DelayQueue<Reveal>,
    countdown: Countdown,
    status: Status,
}

impl MemoryChallenge {
    pub fn new(difficulty: Difficulty, deck: MemoryDeck, timing: ChallengeTiming) -> Self {
        let cards = deck
            .faces
            .into_iter()
            .map(|face| MemoryCard {
                face,
                face_up: false,
                matched: false,
            })
            .collect();
        Self {
            difficulty,
            cards,
            flipped: Vec::with_capacity(2),
            matches: 0,
            moves: 0,
            timing,
            reveals: DelayQueue::new(),
            countdown: Countdown::new(Self::time_budget(difficulty)),
            status: Status::Playing,
        }
    }

    pub fn time_budget(difficulty: Difficulty) -> u32 {
        difficulty.pick(90, 105, 120)
    }

    pub fn cards(&self) -> &[MemoryCard] {
        &self.cards
    }

    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    fn pairs(&self) -> usize {
        self.cards.len() / 2
    }

    fn resolve(&mut self, reveal: Reveal) -> Verdict {
        self.flipped.clear();
        match reveal {
            Reveal::Match(a, b) => {
                self.cards[a].matched = true;
                self.cards[b].matched = true;
                self.matches += 1;
                if self.matches == self.pairs() {
                    self.countdown.cancel();
                    return self.status.record(Verdict::Success);
                }
            }
            Reveal::Mismatch(a, b) => {
                self.cards[a].face_up = false;
                self.cards[b].face_up = false;
            }
        }
        Verdict::Pending
    }
}

impl ChallengeMachine for MemoryChallenge {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Memory
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self) {}

    fn submit(&mut self, input: ChallengeInput) -> Verdict {
        if !self.status.is_playing() {
            return Verdict::Pending;
        }
        let ChallengeInput::Card(index) = input else {
            return Verdict::Pending;
        };
        let Some(card) = self.cards.get(index) else {
            debug!(index, "no such card");
            return Verdict::Pending;
        };
        if self.flipped.len() == 2 || card.face_up || card.matched {
            return Verdict::Pending;
        }

        self.countdown.start();
        self.cards[index].face_up = true;
        self.flipped.push(index);

        if let [first, second] = self.flipped[..] {
            self.moves += 1;
            if self.cards[first].face == self.cards[second].face {
                self.reveals
                    .schedule(self.timing.memory_match_reveal, Reveal::Match(first, second));
            } else {
                self.reveals.schedule(
                    self.timing.memory_mismatch_reveal,
                    Reveal::Mismatch(first, second),
                );
            }
        }
        Verdict::Pending
    }

    fn advance(&mut self, dt: Duration) -> Verdict {
        if !self.status.is_playing() {
            return Verdict::Pending;
        }
        for reveal in self.reveals.advance(dt) {
            if self.resolve(reveal) == Verdict::Success {
                return Verdict::Success;
            }
        }
        if self.countdown.advance(dt) {
            self.reveals.cancel_all();
            return self.status.record(Verdict::Failure(FailureReason::TimedOut));
        }
        Verdict::Pending
    }

    fn teardown(&mut self) {
        self.reveals.cancel_all();
        self.countdown.cancel();
        if self.status.is_playing() {
            self.status = Status::Discarded;
        }
    }

    fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    fn snapshot(&self) -> ChallengeSnapshot {
        let cards = self
            .cards
            .iter()
            .map(|card| CardView {
                face: (card.face_up || card.matched).then_some(card.face),
                matched: card.matched,
            })
            .collect();
        ChallengeSnapshot {
            kind: ChallengeKind::Memory,
            difficulty: self.difficulty,
            difficulty_label: format!("{} ({} pairs)", self.difficulty.label(), self.pairs()),
            status: self.status,
            timer: self.countdown.state(),
            remaining_secs: self.countdown.remaining_secs(),
            view: PuzzleView::Memory(MemoryView {
                cards,
                matches: self.matches,
                pairs: self.pairs(),
                moves: self.moves,
            }),
        }
    }
}

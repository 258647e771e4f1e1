//! Color-pattern recall.
//!
//! The pattern is shown for a few seconds, then hidden while the user
//! reproduces it tap by tap. Any wrong tap fails at once.
//!
//! ```text
//! Show (3/4/5s) -> Input (30s) -> Solved | Failed
//! ```

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::{
    ChallengeInput, ChallengeMachine, ChallengeSnapshot, FailureReason, PuzzleView, Status,
    Verdict,
};
use crate::alarm::ChallengeKind;
use crate::difficulty::Difficulty;
use crate::timer::Countdown;

const INPUT_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Pink,
    Orange,
    Teal,
}

impl PatternColor {
    pub const PALETTE: [PatternColor; 8] = [
        PatternColor::Red,
        PatternColor::Blue,
        PatternColor::Green,
        PatternColor::Yellow,
        PatternColor::Purple,
        PatternColor::Pink,
        PatternColor::Orange,
        PatternColor::Teal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PatternColor::Red => "red",
            PatternColor::Blue => "blue",
            PatternColor::Green => "green",
            PatternColor::Yellow => "yellow",
            PatternColor::Purple => "purple",
            PatternColor::Pink => "pink",
            PatternColor::Orange => "orange",
            PatternColor::Teal => "teal",
        }
    }

    /// Palette index for a color name, case-insensitive.
    pub fn index_of(name: &str) -> Option<usize> {
        Self::PALETTE
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternPuzzle {
    /// Palette indices, in display order.
    pattern: Vec<usize>,
    palette_size: usize,
}

impl PatternPuzzle {
    pub fn new(pattern: Vec<usize>, palette_size: usize) -> Self {
        assert!(
            palette_size <= PatternColor::PALETTE.len(),
            "palette of {palette_size} exceeds the available colors"
        );
        assert!(
            pattern.iter().all(|&c| c < palette_size),
            "pattern uses colors outside its palette"
        );
        Self {
            pattern,
            palette_size,
        }
    }

    pub fn generate<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Self {
        let length = difficulty.pick(3, 5, 7);
        let palette_size = difficulty.pick(4, 6, 8);
        let pattern = (0..length).map(|_| rng.gen_range(0..palette_size)).collect();
        Self::new(pattern, palette_size)
    }

    pub fn pattern(&self) -> &[usize] {
        &self.pattern
    }

    pub fn palette_size(&self) -> usize {
        self.palette_size
    }

    pub fn palette(&self) -> &'static [PatternColor] {
        &PatternColor::PALETTE[..self.palette_size]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternPhase {
    Show,
    Input,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternView {
    pub phase: PatternPhase,
    /// Only visible during the show phase.
    pub pattern: Option<Vec<PatternColor>>,
    pub length: usize,
    pub entered: usize,
    pub palette: Vec<PatternColor>,
}

#[derive(Debug, Clone)]
pub struct PatternChallenge {
    difficulty: Difficulty,
    puzzle: PatternPuzzle,
    phase: PatternPhase,
    entered: usize,
    countdown: Countdown,
    status: Status,
}

impl PatternChallenge {
    pub fn new(difficulty: Difficulty, puzzle: PatternPuzzle) -> Self {
        Self {
            difficulty,
            puzzle,
            phase: PatternPhase::Show,
            entered: 0,
            countdown: Countdown::new(Self::show_secs(difficulty)),
            status: Status::Playing,
        }
    }

    pub fn show_secs(difficulty: Difficulty) -> u32 {
        difficulty.pick(3, 4, 5)
    }

    /// Seconds allowed to reproduce the pattern once it is hidden.
    pub fn time_budget(_difficulty: Difficulty) -> u32 {
        INPUT_SECS
    }

    pub fn phase(&self) -> PatternPhase {
        self.phase
    }

    pub fn puzzle(&self) -> &PatternPuzzle {
        &self.puzzle
    }
}

impl ChallengeMachine for PatternChallenge {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Pattern
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self) {
        self.countdown.start();
    }

    fn submit(&mut self, input: ChallengeInput) -> Verdict {
        if !self.status.is_playing() {
            return Verdict::Pending;
        }
        let ChallengeInput::Color(color) = input else {
            return Verdict::Pending;
        };
        if self.phase != PatternPhase::Input {
            debug!(color, "tap ignored while the pattern is showing");
            return Verdict::Pending;
        }
        if color >= self.puzzle.palette_size {
            debug!(color, "tap outside the palette ignored");
            return Verdict::Pending;
        }

        if self.puzzle.pattern[self.entered] != color {
            self.countdown.cancel();
            return self.status.record(Verdict::Failure(FailureReason::WrongTap));
        }

        self.entered += 1;
        if self.entered == self.puzzle.pattern.len() {
            self.countdown.cancel();
            return self.status.record(Verdict::Success);
        }
        Verdict::Pending
    }

    fn advance(&mut self, dt: Duration) -> Verdict {
        if !self.status.is_playing() || !self.countdown.advance(dt) {
            return Verdict::Pending;
        }
        match self.phase {
            PatternPhase::Show => {
                debug!("pattern hidden, waiting for input");
                let overrun = self.countdown.overrun();
                self.phase = PatternPhase::Input;
                self.countdown.restart(INPUT_SECS);
                // Time that ran past the show phase counts against input.
                if self.countdown.advance(overrun) {
                    return self.status.record(Verdict::Failure(FailureReason::TimedOut));
                }
                Verdict::Pending
            }
            PatternPhase::Input => self.status.record(Verdict::Failure(FailureReason::TimedOut)),
        }
    }

    fn teardown(&mut self) {
        self.countdown.cancel();
        if self.status.is_playing() {
            self.status = Status::Discarded;
        }
    }

    fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    fn snapshot(&self) -> ChallengeSnapshot {
        let colors = |indices: &[usize]| -> Vec<PatternColor> {
            indices.iter().map(|&i| PatternColor::PALETTE[i]).collect()
        };
        ChallengeSnapshot {
            kind: ChallengeKind::Pattern,
            difficulty: self.difficulty,
            difficulty_label: self.difficulty.label().to_string(),
            status: self.status,
            timer: self.countdown.state(),
            remaining_secs: self.countdown.remaining_secs(),
            view: PuzzleView::Pattern(PatternView {
                phase: self.phase,
                pattern: (self.phase == PatternPhase::Show).then(|| colors(&self.puzzle.pattern)),
                length: self.puzzle.pattern.len(),
                entered: self.entered,
                palette: self.puzzle.palette().to_vec(),
            }),
        }
    }
}

//! Shared machine for challenges answered with a single number.
//!
//! The countdown starts with the machine. A numeric answer is compared
//! against the puzzle: equal is a success, anything else a failure.
//! Text that does not parse as a number is an incomplete attempt and
//! changes nothing.

use std::time::Duration;

use tracing::debug;

use super::{
    ChallengeInput, ChallengeMachine, ChallengeSnapshot, FailureReason, PuzzleView, Status,
    Verdict,
};
use crate::alarm::ChallengeKind;
use crate::difficulty::Difficulty;
use crate::timer::Countdown;

/// A generated puzzle with exactly one integer answer.
pub trait NumericPuzzle: std::fmt::Debug {
    const KIND: ChallengeKind;

    fn answer(&self) -> i64;

    /// Seconds allowed to answer at this difficulty.
    fn time_budget(difficulty: Difficulty) -> u32;

    fn view(&self) -> PuzzleView;
}

#[derive(Debug, Clone)]
pub struct AnswerChallenge<P> {
    difficulty: Difficulty,
    puzzle: P,
    countdown: Countdown,
    status: Status,
}

impl<P: NumericPuzzle> AnswerChallenge<P> {
    pub fn new(difficulty: Difficulty, puzzle: P) -> Self {
        Self {
            difficulty,
            puzzle,
            countdown: Countdown::new(P::time_budget(difficulty)),
            status: Status::Playing,
        }
    }

    pub fn puzzle(&self) -> &P {
        &self.puzzle
    }
}

/// Parse a typed answer. Surrounding whitespace and a leading `+` are
/// accepted; anything else that is not an integer is rejected.
pub(crate) fn parse_answer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .parse::<i64>()
        .ok()
}

impl<P: NumericPuzzle> ChallengeMachine for AnswerChallenge<P> {
    fn kind(&self) -> ChallengeKind {
        P::KIND
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
        let kind = P::KIND;
        let text = match input {
            ChallengeInput::Answer(text) => text,
            other => {
                debug!(%kind, input = ?other, "ignoring input of the wrong shape");
                return Verdict::Pending;
            }
        };
        let Some(value) = parse_answer(&text) else {
            debug!(%kind, text = %text, "ignoring non-numeric answer");
            return Verdict::Pending;
        };

        let verdict = if value == self.puzzle.answer() {
            Verdict::Success
        } else {
            Verdict::Failure(FailureReason::WrongAnswer)
        };
        self.countdown.cancel();
        self.status.record(verdict)
    }

    fn advance(&mut self, dt: Duration) -> Verdict {
        if !self.status.is_playing() {
            return Verdict::Pending;
        }
        if self.countdown.advance(dt) {
            return self.status.record(Verdict::Failure(FailureReason::TimedOut));
        }
        Verdict::Pending
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
        ChallengeSnapshot {
            kind: P::KIND,
            difficulty: self.difficulty,
            difficulty_label: self.difficulty.label().to_string(),
            status: self.status,
            timer: self.countdown.state(),
            remaining_secs: self.countdown.remaining_secs(),
            view: self.puzzle.view(),
        }
    }
}

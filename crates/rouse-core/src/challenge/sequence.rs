//! Next-term-of-the-sequence puzzles.

use rand::Rng;
use serde::Serialize;

use super::answer::{AnswerChallenge, NumericPuzzle};
use super::PuzzleView;
use crate::alarm::ChallengeKind;
use crate::difficulty::Difficulty;

pub type SequenceChallenge = AnswerChallenge<SequencePuzzle>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceFamily {
    Arithmetic,
    Geometric,
    Fibonacci,
}

impl SequenceFamily {
    pub fn hint(self) -> &'static str {
        match self {
            SequenceFamily::Arithmetic => "Look for a constant difference",
            SequenceFamily::Geometric => "Look for a constant ratio",
            SequenceFamily::Fibonacci => "Each number is the sum of previous numbers",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePuzzle {
    terms: Vec<i64>,
    answer: i64,
    family: SequenceFamily,
}

impl SequencePuzzle {
    /// `len` terms starting at `start`, stepping by `step`; the answer is
    /// the term after the last one shown.
    pub fn arithmetic(start: i64, step: i64, len: usize) -> Self {
        let terms = (0..len as i64).map(|i| start + i * step).collect();
        Self {
            terms,
            answer: start + len as i64 * step,
            family: SequenceFamily::Arithmetic,
        }
    }

    pub fn geometric(start: i64, ratio: i64, len: usize) -> Self {
        let mut terms = Vec::with_capacity(len);
        let mut term = start;
        for _ in 0..len {
            terms.push(term);
            term *= ratio;
        }
        Self {
            terms,
            answer: term,
            family: SequenceFamily::Geometric,
        }
    }

    /// `[a, b, a+b, a+2b, 2a+3b]`, next `3a+5b`.
    pub fn fibonacci(a: i64, b: i64) -> Self {
        let mut terms = vec![a, b];
        while terms.len() < 5 {
            let n = terms.len();
            terms.push(terms[n - 1] + terms[n - 2]);
        }
        let n = terms.len();
        Self {
            answer: terms[n - 1] + terms[n - 2],
            terms,
            family: SequenceFamily::Fibonacci,
        }
    }

    pub fn generate<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Self {
        match difficulty {
            Difficulty::Easy => {
                Self::arithmetic(rng.gen_range(1..=10), rng.gen_range(1..=5), 4)
            }
            Difficulty::Medium => {
                if rng.gen_bool(0.5) {
                    Self::arithmetic(rng.gen_range(2..=16), rng.gen_range(2..=9), 5)
                } else {
                    Self::geometric(2, 2, 4)
                }
            }
            Difficulty::Hard => {
                if rng.gen_bool(0.4) {
                    Self::fibonacci(rng.gen_range(1..=3), rng.gen_range(2..=4))
                } else {
                    Self::geometric(rng.gen_range(2..=5), 3, 4)
                }
            }
        }
    }

    pub fn terms(&self) -> &[i64] {
        &self.terms
    }

    pub fn family(&self) -> SequenceFamily {
        self.family
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SequenceView {
    pub terms: Vec<i64>,
    pub family: SequenceFamily,
    pub hint: &'static str,
}

impl NumericPuzzle for SequencePuzzle {
    const KIND: ChallengeKind = ChallengeKind::Sequence;

    fn answer(&self) -> i64 {
        self.answer
    }

    fn time_budget(difficulty: Difficulty) -> u32 {
        difficulty.pick(30, 30, 45)
    }

    fn view(&self) -> PuzzleView {
        PuzzleView::Sequence(SequenceView {
            terms: self.terms.clone(),
            family: self.family,
            hint: self.family.hint(),
        })
    }
}

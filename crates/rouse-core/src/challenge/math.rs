//! Arithmetic problems.
//!
//! - Easy: single-digit addition or subtraction, never negative
//! - Medium: two-digit addition/subtraction, or a small multiplication
//! - Hard: `(a + b) × c`

use std::fmt;

use rand::Rng;
use serde::Serialize;

use super::answer::{AnswerChallenge, NumericPuzzle};
use super::PuzzleView;
use crate::alarm::ChallengeKind;
use crate::difficulty::Difficulty;

pub type MathChallenge = AnswerChallenge<MathPuzzle>;

/// Expression shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    Add { a: i64, b: i64 },
    Sub { a: i64, b: i64 },
    Mul { a: i64, b: i64 },
    /// `(a + b) × c`
    SumTimes { a: i64, b: i64, c: i64 },
}

impl Expr {
    pub fn evaluate(self) -> i64 {
        match self {
            Expr::Add { a, b } => a + b,
            Expr::Sub { a, b } => a - b,
            Expr::Mul { a, b } => a * b,
            Expr::SumTimes { a, b, c } => (a + b) * c,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Add { a, b } => write!(f, "{a} + {b}"),
            Expr::Sub { a, b } => write!(f, "{a} - {b}"),
            Expr::Mul { a, b } => write!(f, "{a} × {b}"),
            Expr::SumTimes { a, b, c } => write!(f, "({a} + {b}) × {c}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathPuzzle {
    expr: Expr,
    answer: i64,
}

impl MathPuzzle {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            answer: expr.evaluate(),
        }
    }

    pub fn generate<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Self {
        let expr = match difficulty {
            Difficulty::Easy => {
                let a = rng.gen_range(1..=9);
                let b = rng.gen_range(1..=9);
                if rng.gen_bool(0.5) {
                    Expr::Add { a, b }
                } else {
                    Expr::Sub {
                        a: a.max(b),
                        b: a.min(b),
                    }
                }
            }
            Difficulty::Medium => match rng.gen_range(0..3) {
                0 => Expr::Add {
                    a: rng.gen_range(10..=59),
                    b: rng.gen_range(5..=24),
                },
                1 => Expr::Sub {
                    a: rng.gen_range(10..=59),
                    b: rng.gen_range(5..=24),
                },
                _ => Expr::Mul {
                    a: rng.gen_range(2..=13),
                    b: rng.gen_range(2..=13),
                },
            },
            Difficulty::Hard => Expr::SumTimes {
                a: rng.gen_range(5..=24),
                b: rng.gen_range(2..=11),
                c: rng.gen_range(1..=10),
            },
        };
        Self::new(expr)
    }

    pub fn expr(&self) -> Expr {
        self.expr
    }

    pub fn question(&self) -> String {
        self.expr.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MathView {
    pub question: String,
    pub expr: Expr,
}

impl NumericPuzzle for MathPuzzle {
    const KIND: ChallengeKind = ChallengeKind::Math;

    fn answer(&self) -> i64 {
        self.answer
    }

    fn time_budget(difficulty: Difficulty) -> u32 {
        difficulty.pick(30, 30, 45)
    }

    fn view(&self) -> PuzzleView {
        PuzzleView::Math(MathView {
            question: self.question(),
            expr: self.expr,
        })
    }
}

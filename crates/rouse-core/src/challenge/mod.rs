//! Wake-up challenges.
//!
//! Each challenge kind pairs a puzzle generator (a pure function of the
//! difficulty and an injected RNG) with a state machine implementing
//! [`ChallengeMachine`]. Machines never regenerate themselves: a failure
//! is reported once and the session controller replaces the machine.
//!
//! ## Timers
//!
//! Math, sequence and pattern count down from the moment they are
//! started. The remaining kinds stay armed until the first interaction.

mod answer;
mod matching;
mod math;
mod memory;
mod pattern;
mod sequence;
mod shake;
mod tictactoe;

use std::fmt;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::Serialize;

use crate::alarm::ChallengeKind;
use crate::difficulty::Difficulty;
use crate::timer::CountdownState;

pub use answer::{AnswerChallenge, NumericPuzzle};
pub use matching::{
    MatchChallenge, MatchItem, MatchItemView, MatchPuzzle, MatchView, CATEGORY_POOL,
};
pub use math::{Expr, MathChallenge, MathPuzzle, MathView};
pub use memory::{CardView, MemoryCard, MemoryChallenge, MemoryDeck, MemoryView, CARD_FACES};
pub use pattern::{PatternChallenge, PatternColor, PatternPhase, PatternPuzzle, PatternView};
pub use sequence::{SequenceChallenge, SequenceFamily, SequencePuzzle, SequenceView};
pub use shake::{ShakeChallenge, ShakeView};
pub use tictactoe::{
    opponent_move, outcome, to_move, winner, Board, Mark, MoveOutcome, TicTacToeChallenge,
    TicTacToeView,
};

/// RNG used by machines that need randomness after construction.
pub type ChallengeRng = Mcg128Xsl64;

/// One user interaction, routed to the active machine.
///
/// Inputs of the wrong shape for the active kind are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeInput {
    /// Typed answer for math and sequence challenges.
    Answer(String),
    /// Palette index tapped in the pattern challenge.
    Color(usize),
    /// Board cell (0-8, row-major) in tic-tac-toe.
    Cell(usize),
    /// Card position in the memory challenge.
    Card(usize),
    /// Item position in the match-objects challenge.
    Item(usize),
    /// One shake stimulus, whatever its source.
    Stimulus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    WrongAnswer,
    WrongTap,
    TimedOut,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureReason::WrongAnswer => "wrong answer",
            FailureReason::WrongTap => "wrong tap",
            FailureReason::TimedOut => "time ran out",
        })
    }
}

/// Side effect of feeding a machine input or time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    /// Nothing decided yet (also returned for ignored input).
    Pending,
    Success,
    Failure(FailureReason),
}

/// Lifecycle of a single machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Playing,
    Solved,
    Failed(FailureReason),
    /// Torn down before it was decided.
    Discarded,
}

impl Status {
    pub fn is_playing(self) -> bool {
        self == Status::Playing
    }

    /// Record a decisive verdict. Pending verdicts leave the status alone.
    pub(crate) fn record(&mut self, verdict: Verdict) -> Verdict {
        match verdict {
            Verdict::Pending => {}
            Verdict::Success => *self = Status::Solved,
            Verdict::Failure(reason) => *self = Status::Failed(reason),
        }
        verdict
    }
}

/// Display delays used by machines that animate a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeTiming {
    /// How long a matched memory pair stays face up before it is marked.
    pub memory_match_reveal: Duration,
    /// How long a mismatched memory pair stays face up before flipping back.
    pub memory_mismatch_reveal: Duration,
}

impl Default for ChallengeTiming {
    fn default() -> Self {
        Self {
            memory_match_reveal: Duration::from_millis(500),
            memory_mismatch_reveal: Duration::from_millis(1000),
        }
    }
}

/// Kind-specific read-only projection of a machine's state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PuzzleView {
    Math(MathView),
    Sequence(SequenceView),
    Pattern(PatternView),
    TicTacToe(TicTacToeView),
    Memory(MemoryView),
    Match(MatchView),
    Shake(ShakeView),
}

/// Read-only projection shared by every challenge kind.
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeSnapshot {
    pub kind: ChallengeKind,
    pub difficulty: Difficulty,
    pub difficulty_label: String,
    pub status: Status,
    pub timer: CountdownState,
    pub remaining_secs: u32,
    pub view: PuzzleView,
}

/// Capability every challenge state machine provides to the controller.
pub trait ChallengeMachine: fmt::Debug {
    fn kind(&self) -> ChallengeKind;

    fn difficulty(&self) -> Difficulty;

    fn status(&self) -> Status;

    /// Called once, right after the controller installs the machine.
    fn start(&mut self);

    /// Apply one user interaction.
    fn submit(&mut self, input: ChallengeInput) -> Verdict;

    /// Feed elapsed time to the countdown and any pending display delays.
    fn advance(&mut self, dt: Duration) -> Verdict;

    /// Cancel every timer. The machine accepts nothing afterwards.
    fn teardown(&mut self);

    fn remaining_secs(&self) -> u32;

    fn snapshot(&self) -> ChallengeSnapshot;
}

/// Seconds allowed to solve `kind` at `difficulty`. For the pattern
/// challenge this is the input phase, which follows the show phase.
pub fn time_budget(kind: ChallengeKind, difficulty: Difficulty) -> u32 {
    match kind {
        ChallengeKind::Math => MathPuzzle::time_budget(difficulty),
        ChallengeKind::Sequence => SequencePuzzle::time_budget(difficulty),
        ChallengeKind::Pattern => PatternChallenge::time_budget(difficulty),
        ChallengeKind::TicTacToe => TicTacToeChallenge::time_budget(difficulty),
        ChallengeKind::Memory => MemoryChallenge::time_budget(difficulty),
        ChallengeKind::Match => MatchChallenge::time_budget(difficulty),
        ChallengeKind::Shake => ShakeChallenge::time_budget(difficulty),
    }
}

/// `true` for kinds whose countdown waits for the first interaction.
pub fn starts_on_first_input(kind: ChallengeKind) -> bool {
    !matches!(
        kind,
        ChallengeKind::Math | ChallengeKind::Sequence | ChallengeKind::Pattern
    )
}

/// Generate a puzzle and construct the machine for `kind`.
pub fn build<R: Rng + ?Sized>(
    kind: ChallengeKind,
    difficulty: Difficulty,
    timing: &ChallengeTiming,
    rng: &mut R,
) -> Box<dyn ChallengeMachine> {
    match kind {
        ChallengeKind::Math => Box::new(MathChallenge::new(
            difficulty,
            MathPuzzle::generate(difficulty, rng),
        )),
        ChallengeKind::Sequence => Box::new(SequenceChallenge::new(
            difficulty,
            SequencePuzzle::generate(difficulty, rng),
        )),
        ChallengeKind::Pattern => Box::new(PatternChallenge::new(
            difficulty,
            PatternPuzzle::generate(difficulty, rng),
        )),
        ChallengeKind::TicTacToe => Box::new(TicTacToeChallenge::new(
            difficulty,
            ChallengeRng::seed_from_u64(rng.gen()),
        )),
        ChallengeKind::Memory => Box::new(MemoryChallenge::new(
            difficulty,
            MemoryDeck::generate(difficulty, rng),
            *timing,
        )),
        ChallengeKind::Match => Box::new(MatchChallenge::new(
            difficulty,
            MatchPuzzle::generate(difficulty, rng),
        )),
        ChallengeKind::Shake => Box::new(ShakeChallenge::new(difficulty)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_constructs_every_kind() {
        let mut rng = ChallengeRng::seed_from_u64(11);
        for kind in ChallengeKind::ALL {
            for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
                let machine = build(kind, difficulty, &ChallengeTiming::default(), &mut rng);
                assert_eq!(machine.kind(), kind);
                assert_eq!(machine.difficulty(), difficulty);
                assert!(machine.status().is_playing());
                assert!(machine.remaining_secs() > 0);
            }
        }
    }

    #[test]
    fn lazy_kinds_stay_armed_after_start() {
        let mut rng = ChallengeRng::seed_from_u64(5);
        for kind in ChallengeKind::ALL {
            let mut machine = build(kind, Difficulty::Easy, &ChallengeTiming::default(), &mut rng);
            machine.start();
            let armed = machine.snapshot().timer == CountdownState::Armed;
            assert_eq!(armed, starts_on_first_input(kind), "{kind}");
        }
    }

    #[test]
    fn budgets_follow_difficulty() {
        assert_eq!(time_budget(ChallengeKind::Math, Difficulty::Hard), 45);
        assert_eq!(time_budget(ChallengeKind::Memory, Difficulty::Medium), 105);
        assert_eq!(time_budget(ChallengeKind::Match, Difficulty::Hard), 90);
        assert_eq!(time_budget(ChallengeKind::TicTacToe, Difficulty::Easy), 120);
        assert_eq!(time_budget(ChallengeKind::Pattern, Difficulty::Easy), 30);
    }

    #[test]
    fn status_records_decisive_verdicts_only() {
        let mut status = Status::Playing;
        assert_eq!(status.record(Verdict::Pending), Verdict::Pending);
        assert_eq!(status, Status::Playing);
        status.record(Verdict::Failure(FailureReason::TimedOut));
        assert_eq!(status, Status::Failed(FailureReason::TimedOut));
    }

    #[test]
    fn verdict_serializes_with_reason() {
        let json = serde_json::to_value(Verdict::Failure(FailureReason::WrongTap)).unwrap();
        assert_eq!(json["verdict"], "failure");
        assert_eq!(json["reason"], "wrong_tap");
    }
}

//! Shake-to-stop.
//!
//! Motion sensing lives outside the engine: every shake arrives as a
//! `ChallengeInput::Stimulus`, whatever produced it.

use std::time::Duration;

use serde::Serialize;

use super::{
    ChallengeInput, ChallengeMachine, ChallengeSnapshot, FailureReason, PuzzleView, Status,
    Verdict,
};
use crate::alarm::ChallengeKind;
use crate::difficulty::Difficulty;
use crate::timer::Countdown;

#[derive(Debug, Clone, Serialize)]
pub struct ShakeView {
    pub count: u32,
    pub target: u32,
    pub progress_pct: u8,
}

#[derive(Debug, Clone)]
pub struct ShakeChallenge {
    difficulty: Difficulty,
    count: u32,
    target: u32,
    countdown: Countdown,
    status: Status,
}

impl ShakeChallenge {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            count: 0,
            target: Self::target(difficulty),
            countdown: Countdown::new(Self::time_budget(difficulty)),
            status: Status::Playing,
        }
    }

    pub fn target(difficulty: Difficulty) -> u32 {
        difficulty.pick(15, 25, 35)
    }

    pub fn time_budget(difficulty: Difficulty) -> u32 {
        difficulty.pick(45, 60, 75)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn progress_pct(&self) -> u8 {
        let pct = (u64::from(self.count) * 100) / u64::from(self.target.max(1));
        pct.min(100) as u8
    }
}

impl ChallengeMachine for ShakeChallenge {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Shake
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self) {}

    fn submit(&mut self, input: ChallengeInput) -> Verdict {
        if !self.status.is_playing() || input != ChallengeInput::Stimulus {
            return Verdict::Pending;
        }
        self.countdown.start();
        self.count += 1;
        if self.count >= self.target {
            self.countdown.cancel();
            return self.status.record(Verdict::Success);
        }
        Verdict::Pending
    }

    fn advance(&mut self, dt: Duration) -> Verdict {
        if self.status.is_playing() && self.countdown.advance(dt) {
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
            kind: ChallengeKind::Shake,
            difficulty: self.difficulty,
            difficulty_label: format!("{} ({} shakes)", self.difficulty.label(), self.target),
            status: self.status,
            timer: self.countdown.state(),
            remaining_secs: self.countdown.remaining_secs(),
            view: PuzzleView::Shake(ShakeView {
                count: self.count,
                target: self.target,
                progress_pct: self.progress_pct(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::CountdownState;

    fn shake(challenge: &mut ShakeChallenge, times: u32) -> Vec<Verdict> {
        (0..times)
            .map(|_| challenge.submit(ChallengeInput::Stimulus))
            .collect()
    }

    #[test]
    fn each_stimulus_counts_once() {
        let mut challenge = ShakeChallenge::new(Difficulty::Easy);
        shake(&mut challenge, 3);
        assert_eq!(challenge.count(), 3);
        assert_eq!(challenge.progress_pct(), 20);
    }

    #[test]
    fn reaching_target_succeeds_exactly_once() {
        let mut challenge = ShakeChallenge::new(Difficulty::Easy);
        let verdicts = shake(&mut challenge, 20);
        let successes = verdicts.iter().filter(|v| **v == Verdict::Success).count();
        assert_eq!(successes, 1);
        assert_eq!(verdicts[14], Verdict::Success);
        assert_eq!(challenge.count(), 15);
    }

    #[test]
    fn other_input_is_ignored() {
        let mut challenge = ShakeChallenge::new(Difficulty::Medium);
        assert_eq!(challenge.submit(ChallengeInput::Cell(1)), Verdict::Pending);
        assert_eq!(challenge.count(), 0);
        assert_eq!(challenge.snapshot().timer, CountdownState::Armed);
    }

    #[test]
    fn timer_starts_with_first_stimulus() {
        let mut challenge = ShakeChallenge::new(Difficulty::Hard);
        challenge.start();
        assert_eq!(challenge.advance(Duration::from_secs(300)), Verdict::Pending);
        shake(&mut challenge, 1);
        assert_eq!(challenge.advance(Duration::from_secs(74)), Verdict::Pending);
        assert_eq!(
            challenge.advance(Duration::from_secs(1)),
            Verdict::Failure(FailureReason::TimedOut)
        );
    }

    #[test]
    fn label_names_the_target() {
        let challenge = ShakeChallenge::new(Difficulty::Medium);
        assert_eq!(challenge.snapshot().difficulty_label, "Medium (25 shakes)");
    }
}

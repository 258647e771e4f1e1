//! Whole-second countdown driven by caller-supplied deltas.
//!
//! Like the rest of the engine, the countdown has no thread of its own.
//! The caller feeds elapsed time through `advance()`; sub-second
//! remainders are carried so that many small deltas add up to the same
//! number of seconds as one large delta.
//!
//! ## State Transitions
//!
//! ```text
//! Armed -> Running -> Expired
//!   \________\________> Cancelled
//! ```

use std::time::Duration;

use serde::Serialize;

const ONE_SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    /// Budget set, not yet counting.
    Armed,
    Running,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    budget_secs: u32,
    remaining_secs: u32,
    carry: Duration,
    /// Time fed past expiry, kept until the next `restart()`.
    overrun: Duration,
    state: CountdownState,
}

impl Countdown {
    pub fn new(budget_secs: u32) -> Self {
        Self {
            budget_secs,
            remaining_secs: budget_secs,
            carry: Duration::ZERO,
            overrun: Duration::ZERO,
            state: CountdownState::Armed,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn budget_secs(&self) -> u32 {
        self.budget_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == CountdownState::Expired
    }

    /// Elapsed time left unconsumed by the `advance()` call that expired
    /// the countdown. Zero before expiry.
    pub fn overrun(&self) -> Duration {
        self.overrun
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin counting. Returns `false` if the countdown was not armed.
    pub fn start(&mut self) -> bool {
        if self.state != CountdownState::Armed {
            return false;
        }
        self.state = CountdownState::Running;
        true
    }

    /// Replace the budget and start counting from it immediately.
    pub fn restart(&mut self, budget_secs: u32) {
        self.budget_secs = budget_secs;
        self.remaining_secs = budget_secs;
        self.carry = Duration::ZERO;
        self.overrun = Duration::ZERO;
        self.state = CountdownState::Running;
    }

    /// Stop for good. Later `advance()` calls are no-ops.
    pub fn cancel(&mut self) {
        if matches!(self.state, CountdownState::Armed | CountdownState::Running) {
            self.state = CountdownState::Cancelled;
        }
    }

    /// Feed elapsed time. Returns `true` exactly once, on the call that
    /// brings the remaining time to zero.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.state != CountdownState::Running {
            return false;
        }

        self.carry = self.carry.saturating_add(dt);
        while self.carry >= ONE_SECOND && self.remaining_secs > 0 {
            self.carry -= ONE_SECOND;
            self.remaining_secs -= 1;
        }

        if self.remaining_secs == 0 {
            self.state = CountdownState::Expired;
            self.overrun = std::mem::take(&mut self.carry);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armed_countdown_does_not_tick() {
        let mut countdown = Countdown::new(5);
        assert!(!countdown.advance(Duration::from_secs(10)));
        assert_eq!(countdown.remaining_secs(), 5);
        assert_eq!(countdown.state(), CountdownState::Armed);
    }

    #[test]
    fn decrements_once_per_second() {
        let mut countdown = Countdown::new(3);
        assert!(countdown.start());
        assert!(!countdown.advance(Duration::from_secs(1)));
        assert_eq!(countdown.remaining_secs(), 2);
        assert!(!countdown.advance(Duration::from_millis(600)));
        assert_eq!(countdown.remaining_secs(), 2);
        assert!(!countdown.advance(Duration::from_millis(600)));
        assert_eq!(countdown.remaining_secs(), 1);
        assert!(countdown.advance(Duration::from_secs(1)));
        assert!(countdown.is_expired());
    }

    #[test]
    fn expiry_is_reported_once() {
        let mut countdown = Countdown::new(1);
        countdown.start();
        assert!(countdown.advance(Duration::from_secs(5)));
        assert!(!countdown.advance(Duration::from_secs(5)));
    }

    #[test]
    fn cancelled_countdown_never_expires() {
        let mut countdown = Countdown::new(2);
        countdown.start();
        countdown.cancel();
        assert!(!countdown.advance(Duration::from_secs(60)));
        assert_eq!(countdown.state(), CountdownState::Cancelled);
        assert!(!countdown.start());
    }

    #[test]
    fn expiry_keeps_the_unconsumed_time() {
        let mut countdown = Countdown::new(3);
        countdown.start();
        assert!(countdown.advance(Duration::from_millis(40_250)));
        assert_eq!(countdown.overrun(), Duration::from_millis(37_250));
        countdown.restart(30);
        assert_eq!(countdown.overrun(), Duration::ZERO);
    }

    #[test]
    fn restart_replaces_budget() {
        let mut countdown = Countdown::new(3);
        countdown.start();
        countdown.advance(Duration::from_secs(3));
        countdown.restart(30);
        assert!(countdown.is_running());
        assert_eq!(countdown.remaining_secs(), 30);
        assert_eq!(countdown.budget_secs(), 30);
    }
}

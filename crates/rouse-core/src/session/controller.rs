//! Session controller.
//!
//! Owns the attempt counter and the active challenge machine for one
//! fired alarm. A failure tears the machine down, counts an attempt and
//! installs a freshly generated challenge of the same kind at the
//! escalated difficulty. A success waits out the settle delay and then
//! runs the dismiss callback, once.
//!
//! Like the machines it drives, the controller has no thread of its
//! own: callers feed input through `submit()` and elapsed time through
//! `advance()`.
//!
//! ## State Transitions
//!
//! ```text
//! Awaiting -> Active <-> Escalating
//!               |
//!               v
//!           Succeeded
//!
//! any non-terminal state -> Aborted
//! ```

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::alarm::AlarmRef;
use crate::challenge::{
    self, ChallengeInput, ChallengeMachine, ChallengeRng, ChallengeSnapshot, ChallengeTiming,
    Verdict,
};
use crate::difficulty::{next_difficulty, Difficulty};
use crate::error::Result;
use crate::events::Event;
use crate::timer::DelayQueue;

/// Progress credited per failed attempt, capped below completion.
const PROGRESS_PER_ATTEMPT: u32 = 20;
const PROGRESS_CAP: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Alarm fired, no challenge installed yet.
    Awaiting,
    Active,
    /// Failed challenge torn down, replacement not yet installed.
    Escalating,
    Succeeded,
    Aborted,
}

/// Timing and randomness for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Pause between success and the dismiss callback.
    pub settle_delay: Duration,
    /// Pause between a failure and the replacement challenge.
    pub regenerate_delay: Duration,
    /// Fixed seed for reproducible puzzles; entropy when `None`.
    pub seed: Option<u64>,
    pub timing: ChallengeTiming,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(2000),
            regenerate_delay: Duration::ZERO,
            seed: None,
            timing: ChallengeTiming::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub alarm: AlarmRef,
    pub state: SessionState,
    pub attempts: u32,
    pub difficulty: Difficulty,
    pub progress_pct: u8,
    pub dismissed: bool,
    pub challenge: Option<ChallengeSnapshot>,
}

impl SessionSnapshot {
    /// Single-line JSON, as streamed by `rouse play --json`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControllerTask {
    Settle,
    Regenerate,
}

pub struct ChallengeController<F: FnOnce()> {
    session_id: Uuid,
    alarm: AlarmRef,
    config: SessionConfig,
    state: SessionState,
    attempts: u32,
    difficulty: Difficulty,
    machine: Option<Box<dyn ChallengeMachine>>,
    rng: ChallengeRng,
    tasks: DelayQueue<ControllerTask>,
    on_dismiss: Option<F>,
    dismissed: bool,
    events: Vec<Event>,
}

impl<F: FnOnce()> ChallengeController<F> {
    pub fn new(alarm: AlarmRef, config: SessionConfig, on_dismiss: F) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            session_id: Uuid::new_v4(),
            alarm,
            config,
            state: SessionState::Awaiting,
            attempts: 0,
            difficulty: next_difficulty(0),
            machine: None,
            rng: ChallengeRng::seed_from_u64(seed),
            tasks: DelayQueue::new(),
            on_dismiss: Some(on_dismiss),
            dismissed: false,
            events: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn alarm(&self) -> &AlarmRef {
        &self.alarm
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// `true` once the dismiss callback has run.
    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Rough wake-up progress: credit for each failed attempt, full on success.
    pub fn progress_pct(&self) -> u8 {
        if self.state == SessionState::Succeeded {
            return 100;
        }
        self.attempts
            .saturating_mul(PROGRESS_PER_ATTEMPT)
            .min(PROGRESS_CAP) as u8
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            alarm: self.alarm.clone(),
            state: self.state,
            attempts: self.attempts,
            difficulty: self.difficulty,
            progress_pct: self.progress_pct(),
            dismissed: self.dismissed,
            challenge: self.machine.as_ref().map(|m| m.snapshot()),
        }
    }

    /// Take every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Install the first challenge. Only valid while awaiting.
    pub fn begin(&mut self) -> bool {
        if self.state != SessionState::Awaiting {
            return false;
        }
        info!(
            session = %self.session_id,
            alarm = %self.alarm.id,
            kind = %self.alarm.challenge,
            "challenge session started"
        );
        self.events.push(Event::SessionStarted {
            session_id: self.session_id,
            alarm_id: self.alarm.id.clone(),
            kind: self.alarm.challenge,
            at: Utc::now(),
        });
        self.install();
        true
    }

    /// Route one user interaction to the active challenge.
    ///
    /// Input outside the `Active` state is rejected with `Pending`.
    pub fn submit(&mut self, input: ChallengeInput) -> Verdict {
        if self.state != SessionState::Active {
            debug!(state = ?self.state, "input rejected");
            return Verdict::Pending;
        }
        let verdict = match self.machine.as_mut() {
            Some(machine) => machine.submit(input),
            None => Verdict::Pending,
        };
        self.handle(verdict);
        verdict
    }

    /// Feed elapsed time to pending controller tasks and the active
    /// challenge. Returns the challenge's verdict for this interval.
    pub fn advance(&mut self, dt: Duration) -> Verdict {
        let mut installed = false;
        for task in self.tasks.advance(dt) {
            match task {
                ControllerTask::Settle => self.complete(),
                ControllerTask::Regenerate => {
                    self.install();
                    installed = true;
                }
            }
        }
        // A challenge installed during this interval starts from zero.
        if installed || self.state != SessionState::Active {
            return Verdict::Pending;
        }
        let verdict = match self.machine.as_mut() {
            Some(machine) => machine.advance(dt),
            None => Verdict::Pending,
        };
        self.handle(verdict);
        verdict
    }

    /// Replace the active challenge with a new one at the current
    /// difficulty without counting an attempt.
    pub fn restart(&mut self) -> bool {
        if !matches!(self.state, SessionState::Active | SessionState::Escalating) {
            return false;
        }
        self.tasks.cancel_all();
        if let Some(machine) = self.machine.as_mut() {
            machine.teardown();
        }
        info!(session = %self.session_id, difficulty = %self.difficulty, "challenge restarted");
        self.events.push(Event::ChallengeRestarted {
            difficulty: self.difficulty,
            at: Utc::now(),
        });
        self.install();
        true
    }

    /// Cancel the session from outside. The dismiss callback never runs.
    pub fn abort(&mut self) -> bool {
        if self.state == SessionState::Aborted || self.dismissed {
            return false;
        }
        self.tasks.cancel_all();
        if let Some(machine) = self.machine.as_mut() {
            machine.teardown();
        }
        self.on_dismiss = None;
        self.state = SessionState::Aborted;
        warn!(session = %self.session_id, attempts = self.attempts, "challenge session aborted");
        self.events.push(Event::SessionAborted {
            session_id: self.session_id,
            at: Utc::now(),
        });
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn install(&mut self) {
        self.difficulty = next_difficulty(self.attempts);
        let mut machine = challenge::build(
            self.alarm.challenge,
            self.difficulty,
            &self.config.timing,
            &mut self.rng,
        );
        machine.start();
        info!(
            kind = %self.alarm.challenge,
            difficulty = %self.difficulty,
            attempt = self.attempts + 1,
            "challenge installed"
        );
        self.events.push(Event::ChallengeStarted {
            kind: self.alarm.challenge,
            difficulty: self.difficulty,
            attempt: self.attempts + 1,
            remaining_secs: machine.remaining_secs(),
            at: Utc::now(),
        });
        self.machine = Some(machine);
        self.state = SessionState::Active;
    }

    fn handle(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Pending => {}
            Verdict::Success => self.succeed(),
            Verdict::Failure(reason) => {
                if let Some(machine) = self.machine.as_mut() {
                    machine.teardown();
                }
                self.attempts += 1;
                info!(%reason, attempts = self.attempts, "challenge failed");
                self.events.push(Event::ChallengeFailed {
                    reason,
                    attempts: self.attempts,
                    at: Utc::now(),
                });

                let next = next_difficulty(self.attempts);
                if next != self.difficulty {
                    info!(from = %self.difficulty, to = %next, "difficulty escalated");
                    self.events.push(Event::DifficultyEscalated {
                        from: self.difficulty,
                        to: next,
                        at: Utc::now(),
                    });
                    self.difficulty = next;
                }

                if self.config.regenerate_delay.is_zero() {
                    self.install();
                } else {
                    self.state = SessionState::Escalating;
                    self.tasks
                        .schedule(self.config.regenerate_delay, ControllerTask::Regenerate);
                }
            }
        }
    }

    fn succeed(&mut self) {
        if let Some(machine) = self.machine.as_mut() {
            machine.teardown();
        }
        self.state = SessionState::Succeeded;
        info!(attempts = self.attempts, "challenge solved");
        self.events.push(Event::ChallengeSucceeded {
            attempts: self.attempts,
            at: Utc::now(),
        });
        if self.config.settle_delay.is_zero() {
            self.complete();
        } else {
            self.tasks.schedule(self.config.settle_delay, ControllerTask::Settle);
        }
    }

    fn complete(&mut self) {
        let Some(dismiss) = self.on_dismiss.take() else {
            return;
        };
        dismiss();
        self.dismissed = true;
        info!(session = %self.session_id, attempts = self.attempts, "alarm dismissed");
        self.events.push(Event::SessionCompleted {
            session_id: self.session_id,
            attempts: self.attempts,
            at: Utc::now(),
        });
    }
}

impl<F: FnOnce()> fmt::Debug for ChallengeController<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChallengeController")
            .field("session_id", &self.session_id)
            .field("alarm", &self.alarm)
            .field("state", &self.state)
            .field("attempts", &self.attempts)
            .field("difficulty", &self.difficulty)
            .field("machine", &self.machine)
            .field("dismissed", &self.dismissed)
            .finish_non_exhaustive()
    }
}

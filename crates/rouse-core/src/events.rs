use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::alarm::ChallengeKind;
use crate::challenge::FailureReason;
use crate::difficulty::Difficulty;

/// Every controller state change produces an Event.
/// Presentation layers drain them after each input or tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        alarm_id: String,
        kind: ChallengeKind,
        at: DateTime<Utc>,
    },
    /// A freshly generated challenge was installed and started.
    ChallengeStarted {
        kind: ChallengeKind,
        difficulty: Difficulty,
        attempt: u32,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    ChallengeFailed {
        reason: FailureReason,
        attempts: u32,
        at: DateTime<Utc>,
    },
    DifficultyEscalated {
        from: Difficulty,
        to: Difficulty,
        at: DateTime<Utc>,
    },
    /// Manual reset: same difficulty, no attempt counted.
    ChallengeRestarted {
        difficulty: Difficulty,
        at: DateTime<Utc>,
    },
    ChallengeSucceeded {
        attempts: u32,
        at: DateTime<Utc>,
    },
    /// The settle delay elapsed and the dismiss callback ran.
    SessionCompleted {
        session_id: Uuid,
        attempts: u32,
        at: DateTime<Utc>,
    },
    SessionAborted {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SessionStarted { at, .. }
            | Event::ChallengeStarted { at, .. }
            | Event::ChallengeFailed { at, .. }
            | Event::DifficultyEscalated { at, .. }
            | Event::ChallengeRestarted { at, .. }
            | Event::ChallengeSucceeded { at, .. }
            | Event::SessionCompleted { at, .. }
            | Event::SessionAborted { at, .. } => *at,
        }
    }
}

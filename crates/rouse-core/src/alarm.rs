//! Alarm descriptor handed to the challenge engine.
//!
//! Alarms are created, stored and scheduled elsewhere. The engine only
//! sees an immutable reference to the alarm that fired.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The mini-game an alarm requires before it can be dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Math,
    Sequence,
    Pattern,
    TicTacToe,
    Memory,
    Match,
    Shake,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 7] = [
        ChallengeKind::Math,
        ChallengeKind::Sequence,
        ChallengeKind::Pattern,
        ChallengeKind::TicTacToe,
        ChallengeKind::Memory,
        ChallengeKind::Match,
        ChallengeKind::Shake,
    ];

    /// Stable lowercase identifier, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeKind::Math => "math",
            ChallengeKind::Sequence => "sequence",
            ChallengeKind::Pattern => "pattern",
            ChallengeKind::TicTacToe => "tictactoe",
            ChallengeKind::Memory => "memory",
            ChallengeKind::Match => "match",
            ChallengeKind::Shake => "shake",
        }
    }

    /// Human-readable title
    pub fn title(self) -> &'static str {
        match self {
            ChallengeKind::Math => "Math Problem",
            ChallengeKind::Sequence => "Number Sequence",
            ChallengeKind::Pattern => "Color Pattern",
            ChallengeKind::TicTacToe => "Tic-Tac-Toe",
            ChallengeKind::Memory => "Memory Cards",
            ChallengeKind::Match => "Match Objects",
            ChallengeKind::Shake => "Shake to Stop",
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ChallengeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownChallengeKind(s.to_string()))
    }
}

/// Read-only view of the alarm that started a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRef {
    pub id: String,
    pub time: NaiveTime,
    pub label: String,
    pub challenge: ChallengeKind,
}

impl AlarmRef {
    pub fn new(
        id: impl Into<String>,
        time: NaiveTime,
        label: impl Into<String>,
        challenge: ChallengeKind,
    ) -> Self {
        Self {
            id: id.into(),
            time,
            label: label.into(),
            challenge,
        }
    }

    /// Parse an `HH:MM` time of day.
    pub fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
        NaiveTime::parse_from_str(value.trim(), "%H:%M")
            .map_err(|_| ValidationError::InvalidTime(value.to_string()))
    }
}

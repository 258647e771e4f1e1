//! # Rouse Core Library
//!
//! This library provides the challenge engine behind the Rouse alarm
//! clock: an alarm can only be dismissed by completing a mini-game, and
//! every failed attempt makes the next one harder.
//!
//! ## Architecture
//!
//! - **Difficulty Policy**: maps the attempt count to Easy/Medium/Hard
//! - **Challenges**: seven puzzle generators and the state machines that
//!   play them (math, sequence, pattern, tic-tac-toe, memory, match, shake)
//! - **Timers**: caller-driven countdowns and delayed tasks; nothing in
//!   the engine owns a thread
//! - **Session**: the controller that escalates on failure and dismisses
//!   the alarm on success
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`ChallengeController`]: Session state machine
//! - [`ChallengeMachine`]: Trait implemented by every challenge kind
//! - [`Config`]: Application configuration management

pub mod alarm;
pub mod challenge;
pub mod difficulty;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod timer;

pub use alarm::{AlarmRef, ChallengeKind};
pub use challenge::{
    ChallengeInput, ChallengeMachine, ChallengeSnapshot, ChallengeTiming, FailureReason,
    PuzzleView, Status, Verdict,
};
pub use difficulty::{next_difficulty, Difficulty};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use session::{ChallengeController, SessionConfig, SessionSnapshot, SessionState};
pub use storage::Config;
pub use timer::{Countdown, CountdownState, DelayQueue};

//! Challenge session: from the alarm firing to its dismissal.

mod controller;

pub use controller::{ChallengeController, SessionConfig, SessionSnapshot, SessionState};

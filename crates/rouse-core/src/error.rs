//! Core error types for rouse-core.
//!
//! Challenge failures are game outcomes and never surface here; these
//! types cover configuration I/O and parsing of externally supplied
//! descriptors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rouse-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Key is not part of the configuration schema
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors for externally supplied values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Challenge kind string not recognised
    #[error("Unknown challenge kind '{0}' (expected one of: math, sequence, pattern, tictactoe, memory, match, shake)")]
    UnknownChallengeKind(String),

    /// Difficulty level outside 1..=3
    #[error("Difficulty level {0} out of range (expected 1-3)")]
    DifficultyOutOfRange(u8),

    /// Alarm time could not be parsed
    #[error("Invalid alarm time '{0}' (expected HH:MM)")]
    InvalidTime(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_validation_errors() {
        let err: CoreError = ValidationError::DifficultyOutOfRange(4).into();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn config_errors_name_the_key() {
        let err = ConfigError::UnknownKey("session.nope".into());
        assert_eq!(err.to_string(), "Unknown configuration key: session.nope");
    }
}

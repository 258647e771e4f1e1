//! TOML-based application configuration.
//!
//! Stores session tuning:
//! - Settle and regeneration delays
//! - Optional fixed seed for reproducible puzzles
//! - Memory card reveal delays
//! - Default log filter
//!
//! Configuration is stored at `~/.config/rouse/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::challenge::ChallengeTiming;
use crate::error::ConfigError;
use crate::session::SessionConfig;

/// Session timing and randomness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default)]
    pub regenerate_delay_ms: u64,
    /// Fixed puzzle seed. Unset means a fresh seed per session. Limited
    /// to the TOML integer range (at most `i64::MAX`).
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Memory challenge reveal delays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_match_reveal_ms")]
    pub match_reveal_ms: u64,
    #[serde(default = "default_mismatch_reveal_ms")]
    pub mismatch_reveal_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/rouse/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_settle_delay_ms() -> u64 {
    2000
}
fn default_match_reveal_ms() -> u64 {
    500
}
fn default_mismatch_reveal_ms() -> u64 {
    1000
}
fn default_log_filter() -> String {
    "warn".into()
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            regenerate_delay_ms: 0,
            seed: None,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            match_reveal_ms: default_match_reveal_ms(),
            mismatch_reveal_ms: default_mismatch_reveal_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Parse a non-negative integer that TOML can store.
    fn parse_integer(value: &str) -> Result<serde_json::Value, String> {
        let n = value
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("cannot parse '{value}' as number"))?;
        if n > i64::MAX as u64 {
            return Err(format!("{n} exceeds the largest TOML integer ({})", i64::MAX));
        }
        Ok(serde_json::Value::Number(n.into()))
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    // `null` unsets optionals; required keys reject it below.
                    serde_json::Value::Number(_) if value.trim() == "null" => {
                        serde_json::Value::Null
                    }
                    serde_json::Value::Number(_) => Self::parse_integer(value).map_err(invalid)?,
                    // Unset optionals take whatever JSON the value spells.
                    serde_json::Value::Null => match serde_json::from_str(value) {
                        Ok(serde_json::Value::Number(_)) => {
                            Self::parse_integer(value).map_err(invalid)?
                        }
                        Ok(parsed) => parsed,
                        Err(_) => serde_json::Value::String(value.into()),
                    },
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("not a leaf key".into()));
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn collect_keys(prefix: &str, value: &serde_json::Value, keys: &mut Vec<String>) {
        match value {
            serde_json::Value::Object(map) => {
                for (name, child) in map {
                    let path = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}.{name}")
                    };
                    Self::collect_keys(&path, child, keys);
                }
            }
            _ => keys.push(prefix.to_string()),
        }
    }

    /// Default config file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, keeping its type.
    /// The change stays in memory until saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be
    /// parsed as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Every leaf key in dot notation, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            Self::collect_keys("", &json, &mut keys);
        }
        keys.sort();
        keys
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            settle_delay: Duration::from_millis(self.session.settle_delay_ms),
            regenerate_delay: Duration::from_millis(self.session.regenerate_delay_ms),
            seed: self.session.seed,
            timing: ChallengeTiming {
                memory_match_reveal: Duration::from_millis(self.memory.match_reveal_ms),
                memory_mismatch_reveal: Duration::from_millis(self.memory.mismatch_reveal_ms),
            },
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.session.settle_delay_ms, 2000);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let parsed: Config = toml::from_str("[session]\nseed = 7\n").unwrap();
        assert_eq!(parsed.session.seed, Some(7));
        assert_eq!(parsed.session.settle_delay_ms, 2000);
        assert_eq!(parsed.memory.mismatch_reveal_ms, 1000);
        assert_eq!(parsed.logging.filter, "warn");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("session.settle_delay_ms").as_deref(), Some("2000"));
        assert_eq!(cfg.get("logging.filter").as_deref(), Some("warn"));
        assert_eq!(cfg.get("session.seed").as_deref(), Some("null"));
        assert!(cfg.get("session.missing_key").is_none());
        assert!(cfg.get("session").is_none());
    }

    #[test]
    fn set_updates_number_and_string() {
        let mut cfg = Config::default();
        cfg.set("memory.match_reveal_ms", "250").unwrap();
        cfg.set("logging.filter", "rouse_core=debug").unwrap();
        assert_eq!(cfg.memory.match_reveal_ms, 250);
        assert_eq!(cfg.logging.filter, "rouse_core=debug");
    }

    #[test]
    fn set_fills_unset_seed() {
        let mut cfg = Config::default();
        cfg.set("session.seed", "99").unwrap();
        assert_eq!(cfg.session.seed, Some(99));
    }

    #[test]
    fn seed_stays_within_toml_integer_range() {
        let mut cfg = Config::default();
        let err = cfg.set("session.seed", "18446744073709551615").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(cfg.session.seed, None);

        cfg.set("session.seed", &i64::MAX.to_string()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        cfg.save_to(&path).unwrap();
        assert_eq!(
            Config::load_from(&path).unwrap().session.seed,
            Some(i64::MAX as u64)
        );
        assert!(cfg.set("memory.match_reveal_ms", "9223372036854775808").is_err());
    }

    #[test]
    fn null_unsets_seed_but_not_required_keys() {
        let mut cfg = Config::default();
        cfg.set("session.seed", "5").unwrap();
        cfg.set("session.seed", "null").unwrap();
        assert_eq!(cfg.session.seed, None);
        assert!(matches!(
            cfg.set("session.settle_delay_ms", "null"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.session.settle_delay_ms, 2000);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("session.nonexistent_key", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        let err = cfg.set("session.settle_delay_ms", "soon").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(cfg.set("session.seed", "tomorrow").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn keys_lists_every_leaf() {
        let keys = Config::default().keys();
        assert!(keys.contains(&"session.seed".to_string()));
        assert!(keys.contains(&"memory.match_reveal_ms".to_string()));
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn session_config_converts_milliseconds() {
        let mut cfg = Config::default();
        cfg.session.regenerate_delay_ms = 750;
        let session = cfg.session_config();
        assert_eq!(session.settle_delay, Duration::from_secs(2));
        assert_eq!(session.regenerate_delay, Duration::from_millis(750));
        assert_eq!(session.timing, ChallengeTiming::default());
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_to_then_load_from_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("session.seed", "12").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().session.seed, Some(12));
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "session = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}

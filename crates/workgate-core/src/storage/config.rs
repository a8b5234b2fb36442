//! TOML-based application configuration.
//!
//! Stores:
//! - Timer target and tick period
//! - Notification display and fade durations
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;

/// Timer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Seconds that must elapse before the work form unlocks.
    #[serde(default = "default_target_seconds")]
    pub target_seconds: u64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// How long a notification stays visible.
    #[serde(default = "default_display_ms")]
    pub display_ms: u64,
    /// Fade-out window after a notification is cleared. Presentation only.
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_target_seconds() -> u64 {
    90 * 60
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_display_ms() -> u64 {
    5000
}
fn default_fade_ms() -> u64 {
    300
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            target_seconds: default_target_seconds(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            display_ms: default_display_ms(),
            fade_ms: default_fade_ms(),
        }
    }
}

impl TimerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl NotificationsConfig {
    pub fn display(&self) -> chrono::Duration {
        millis_to_delta(self.display_ms)
    }

    pub fn fade(&self) -> chrono::Duration {
        millis_to_delta(self.fade_ms)
    }
}

/// Saturates at `TimeDelta::MAX` instead of wrapping.
fn millis_to_delta(ms: u64) -> chrono::Duration {
    i64::try_from(ms)
        .ok()
        .and_then(chrono::Duration::try_milliseconds)
        .unwrap_or(chrono::Duration::MAX)
}

/// Upper bound for every millisecond setting: one day.
pub const MAX_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

impl Config {
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
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(unknown());
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::path()?)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::path()?)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Reject values the timer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.target_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.target_seconds".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        let bounded = [
            ("timer.tick_interval_ms", self.timer.tick_interval_ms),
            ("notifications.display_ms", self.notifications.display_ms),
            ("notifications.fade_ms", self.notifications.fade_ms),
        ];
        for (key, ms) in bounded {
            if ms > MAX_DURATION_MS {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("must be at most {MAX_DURATION_MS} ms"),
                });
            }
        }
        Ok(())
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

    /// Update a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation. `self` is untouched on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
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
        assert_eq!(parsed.timer.target_seconds, 5400);
        assert_eq!(parsed.notifications.display_ms, 5000);
        assert_eq!(parsed.notifications.fade_ms, 300);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timer]\ntarget_seconds = 60\n").unwrap();
        assert_eq!(parsed.timer.target_seconds, 60);
        assert_eq!(parsed.timer.tick_interval_ms, 1000);
        assert_eq!(parsed.notifications, NotificationsConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.target_seconds").as_deref(), Some("5400"));
        assert_eq!(cfg.get("notifications.fade_ms").as_deref(), Some("300"));
        assert!(cfg.get("timer").is_none());
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("timer.target_seconds", "120").unwrap();
        assert_eq!(cfg.timer.target_seconds, 120);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.set("timer.target_seconds", "ninety");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.timer.target_seconds, 5400);
    }

    #[test]
    fn set_rejects_zero_target() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.target_seconds", "0").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_oversized_durations() {
        let mut cfg = Config::default();
        let result = cfg.set("notifications.display_ms", "9000000000000000000");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert!(cfg.set("notifications.fade_ms", "86400001").is_err());
        assert!(cfg.set("timer.tick_interval_ms", "86400001").is_err());
        assert_eq!(cfg, Config::default());

        cfg.set("notifications.display_ms", "86400000").unwrap();
        assert_eq!(cfg.notifications.display(), chrono::Duration::days(1));
    }

    #[test]
    fn duration_conversion_saturates() {
        let cfg = NotificationsConfig {
            display_ms: u64::MAX,
            fade_ms: 300,
        };
        assert_eq!(cfg.display(), chrono::Duration::MAX);
        assert_eq!(cfg.fade(), chrono::Duration::milliseconds(300));
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\ntick_interval_ms = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        std::fs::write(&path, "[notifications]\ndisplay_ms = 9000000000000000000\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("notifications.display_ms", "2500").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }
}

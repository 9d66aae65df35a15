//! TOML-based application configuration.
//!
//! Stores:
//! - Timer durations (countdown, pomodoro work and break)
//! - The user id sessions are recorded under
//! - A seed list of labels and their productivity class
//! - The default log level
//!
//! Configuration is stored at `~/.config/studytrack/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::productivity::LabelProductivityMap;

/// Timer durations, in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_countdown_minutes")]
    pub countdown_minutes: u32,
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

/// A label to create in the store when it is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSeed {
    pub text: String,
    #[serde(default = "default_true")]
    pub productive: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studytrack/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default = "default_labels")]
    pub labels: Vec<LabelSeed>,
    /// Filter directive used when STUDYTRACK_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_countdown_minutes() -> u32 {
    25
}
fn default_work_minutes() -> u32 {
    25
}
fn default_break_minutes() -> u32 {
    5
}
fn default_user_id() -> String {
    "local".into()
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".into()
}
fn default_labels() -> Vec<LabelSeed> {
    vec![
        LabelSeed {
            text: "Study".into(),
            productive: true,
        },
        LabelSeed {
            text: "Break".into(),
            productive: false,
        },
    ]
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            countdown_minutes: default_countdown_minutes(),
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
        }
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            user: UserConfig::default(),
            labels: default_labels(),
            log_level: default_log_level(),
        }
    }
}

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
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if key.is_empty() {
            return Err(invalid("config key is empty".into()));
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| invalid("unknown config key".into()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| invalid("unknown config key".into()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| invalid("unknown config key".into()))?;
        }

        Err(invalid("unknown config key".into()))
    }

    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("~/.config/studytrack"),
                message: e.to_string(),
            })
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string())),
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

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
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
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. Returns error if key is
    /// unknown or the value does not fit the field.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Durations must be positive; zero-minute timers are refused by the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("timer.countdown_minutes", self.timer.countdown_minutes),
            ("timer.work_minutes", self.timer.work_minutes),
            ("timer.break_minutes", self.timer.break_minutes),
        ];
        for (key, minutes) in durations {
            if minutes == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be at least 1 minute".into(),
                });
            }
        }
        Ok(())
    }

    /// Seed labels as a classification map.
    pub fn label_map(&self) -> LabelProductivityMap {
        self.labels
            .iter()
            .map(|seed| (seed.text.clone(), seed.productive))
            .collect()
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
        assert_eq!(parsed.timer.countdown_minutes, 25);
        assert_eq!(parsed.labels, cfg.labels);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let parsed: Config = toml::from_str("[user]\nid = \"ana\"\n").unwrap();
        assert_eq!(parsed.user.id, "ana");
        assert_eq!(parsed.timer.break_minutes, 5);
        assert_eq!(parsed.log_level, "warn");
        assert_eq!(parsed.labels.len(), 2);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.work_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("user.id").as_deref(), Some("local"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_number_and_string() {
        let mut cfg = Config::default();
        cfg.apply("timer.countdown_minutes", "50").unwrap();
        cfg.apply("log_level", "debug").unwrap();
        assert_eq!(cfg.timer.countdown_minutes, 50);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn apply_replaces_label_list_from_json() {
        let mut cfg = Config::default();
        cfg.apply("labels", r#"[{"text":"Math","productive":true}]"#)
            .unwrap();
        let map = cfg.label_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Math"), Some(true));
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.nonexistent", "3"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer.work_minutes", "soon").is_err());
        assert_eq!(cfg.timer.work_minutes, 25);
    }

    #[test]
    fn apply_rejects_zero_duration() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer.break_minutes", "0").is_err());
        assert_eq!(cfg.timer.break_minutes, 5);
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.user.id, "local");

        let mut changed = cfg.clone();
        changed.user.id = "ana".into();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().user.id, "ana");
    }

    #[test]
    fn load_from_reports_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}

//! Session settings.
//!
//! Settings live in memory for the session. They can be seeded from a TOML
//! file, which is only ever read:
//!
//! ```toml
//! volume = 70
//! snooze_minutes = 10
//! alarm_duration_secs = 120
//! theme = "light"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::alarm::RingOptions;
use crate::error::{ConfigError, ValidationError};
use crate::ringer::RingerConfig;
use crate::tone::Volume;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub volume: Volume,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,
    #[serde(default = "default_alarm_duration_secs")]
    pub alarm_duration_secs: u32,
    #[serde(default)]
    pub theme: Theme,
}

pub const SNOOZE_MINUTES_RANGE: std::ops::RangeInclusive<u32> = 1..=30;
pub const ALARM_DURATION_RANGE: std::ops::RangeInclusive<u32> = 10..=300;

fn default_snooze_minutes() -> u32 {
    5
}
fn default_alarm_duration_secs() -> u32 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: Volume::default(),
            snooze_minutes: default_snooze_minutes(),
            alarm_duration_secs: default_alarm_duration_secs(),
            theme: Theme::Dark,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !SNOOZE_MINUTES_RANGE.contains(&self.snooze_minutes) {
            return Err(ValidationError::invalid(
                "snooze_minutes",
                format!("must be between 1 and 30 (got {})", self.snooze_minutes),
            ));
        }
        if !ALARM_DURATION_RANGE.contains(&self.alarm_duration_secs) {
            return Err(ValidationError::invalid(
                "alarm_duration_secs",
                format!("must be between 10 and 300 (got {})", self.alarm_duration_secs),
            ));
        }
        Ok(())
    }

    /// Parse and validate TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds invalid values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn ring_options(&self) -> RingOptions {
        RingOptions {
            volume: self.volume,
            ringer: RingerConfig::for_duration(Duration::from_secs(u64::from(
                self.alarm_duration_secs,
            ))),
        }
    }

    /// Get a setting as a string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a setting by key. Nothing changes if the key is unknown or the
    /// value is out of range.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(key, e))?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Number(_) => value
                .trim()
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(key, format!("cannot parse '{value}' as number")))?,
            _ => serde_json::Value::String(value.trim().to_ascii_lowercase()),
        };
        obj.insert(key.to_string(), new_value);

        let updated: Settings = serde_json::from_value(json).map_err(|e| invalid(key, e))?;
        updated.validate().map_err(|e| invalid(key, e))?;
        *self = updated;
        Ok(())
    }
}

fn invalid(key: &str, message: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

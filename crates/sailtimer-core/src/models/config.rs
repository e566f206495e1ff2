//! Application configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

use super::{StartDuration, TimerMode};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimerConfig {
    pub default_duration: StartDuration,
    pub default_mode: TimerMode,
    /// How often the session re-evaluates the clock, in milliseconds.
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub audio_alerts: bool,
    pub notifications: bool,
    pub log_level: String,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.timer.validate()?;
        self.ui.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            timer: TimerConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl TimerConfig {
    pub const MIN_TICK_MS: u64 = 50;
    pub const MAX_TICK_MS: u64 = 1000;

    /// Validate timer configuration
    pub fn validate(&self) -> Result<()> {
        self.default_duration.validate()?;

        if !(Self::MIN_TICK_MS..=Self::MAX_TICK_MS).contains(&self.tick_interval_ms) {
            return Err(Error::Validation(format!(
                "Tick interval must be between {} and {} ms, got {}",
                Self::MIN_TICK_MS,
                Self::MAX_TICK_MS,
                self.tick_interval_ms
            )));
        }

        Ok(())
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_duration: StartDuration::ThreeMinutes,
            default_mode: TimerMode::CountdownThenStop,
            tick_interval_ms: 250,
        }
    }
}

impl UiConfig {
    /// Validate UI configuration
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            audio_alerts: true,
            notifications: true,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.timer.default_duration, StartDuration::ThreeMinutes);
        assert_eq!(config.timer.default_mode, TimerMode::CountdownThenStop);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timer_config_validation() {
        let mut config = TimerConfig::default();
        assert!(config.validate().is_ok());

        config.tick_interval_ms = 10;
        assert!(config.validate().is_err());

        config.tick_interval_ms = 5000;
        assert!(config.validate().is_err());

        config.tick_interval_ms = 1000;
        config.default_duration = StartDuration::Custom(0);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_ui_config_validation() {
        let mut config = UiConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"version":"1.0.0","timer":{"default_duration":"five_minutes"}}"#,
        )
        .unwrap();

        assert_eq!(config.timer.default_duration, StartDuration::FiveMinutes);
        assert_eq!(config.timer.tick_interval_ms, 250);
        assert!(config.ui.audio_alerts);
    }
}

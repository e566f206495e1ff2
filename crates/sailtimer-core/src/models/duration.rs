//! Start sequence lengths

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Length of one countdown cycle.
///
/// The watch offers the two standard start sequences; `Custom` covers other
/// race-committee procedures and is validated before it reaches an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartDuration {
    #[default]
    ThreeMinutes,
    FiveMinutes,
    /// Length in whole seconds.
    Custom(u64),
}

impl StartDuration {
    /// Longest accepted cycle (24 hours).
    pub const MAX_SECS: u64 = 24 * 60 * 60;

    /// Build a custom duration from a possibly fractional number of seconds.
    pub fn custom_secs(secs: f64) -> Result<Self> {
        if !secs.is_finite() {
            return Err(Error::InvalidDuration(format!(
                "duration must be finite, got {}",
                secs
            )));
        }

        let whole = secs.round();
        if whole < 1.0 {
            return Err(Error::InvalidDuration(format!(
                "duration must be at least one second, got {}",
                secs
            )));
        }

        let duration = Self::Custom(whole as u64);
        duration.validate()?;
        Ok(duration)
    }

    pub fn as_secs(&self) -> u64 {
        match self {
            StartDuration::ThreeMinutes => 180,
            StartDuration::FiveMinutes => 300,
            StartDuration::Custom(secs) => *secs,
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.as_secs())
    }

    pub fn validate(&self) -> Result<()> {
        if self.as_secs() == 0 {
            return Err(Error::InvalidDuration(
                "duration must be greater than 0".to_string(),
            ));
        }
        if self.as_secs() > Self::MAX_SECS {
            return Err(Error::InvalidDuration(format!(
                "duration too long (max {} seconds)",
                Self::MAX_SECS
            )));
        }
        Ok(())
    }

    /// Short badge text: minutes for whole-minute lengths, `M:SS` otherwise.
    pub fn label(&self) -> String {
        let secs = self.as_secs();
        if secs % 60 == 0 {
            (secs / 60).to_string()
        } else {
            crate::format::time_string(secs)
        }
    }

    /// Cycle between the two standard sequences; a custom length falls back to three minutes.
    pub fn toggle(&self) -> Self {
        match self {
            StartDuration::ThreeMinutes => StartDuration::FiveMinutes,
            StartDuration::FiveMinutes | StartDuration::Custom(_) => StartDuration::ThreeMinutes,
        }
    }
}

impl TryFrom<u64> for StartDuration {
    type Error = Error;

    /// Parse a length in minutes.
    fn try_from(minutes: u64) -> Result<Self> {
        match minutes {
            0 => Err(Error::InvalidDuration(
                "duration must be at least one minute".to_string(),
            )),
            3 => Ok(StartDuration::ThreeMinutes),
            5 => Ok(StartDuration::FiveMinutes),
            n => {
                let duration = StartDuration::Custom(n.saturating_mul(60));
                duration.validate()?;
                Ok(duration)
            }
        }
    }
}

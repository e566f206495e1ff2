use serde::{Deserialize, Serialize};

use super::StartDuration;

/// What happens when the count reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Count down to zero and halt.
    #[default]
    CountdownThenStop,
    /// Count down to zero, re-arm to the full length and keep going.
    CountdownThenRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub remaining_seconds: u64,
    pub display: String,
    pub state: TimerState,
    pub mode: TimerMode,
    pub duration: StartDuration,
    pub locked: bool,
    pub cycles_completed: u64,
}

impl TimerMode {
    pub fn toggle(&self) -> Self {
        match self {
            TimerMode::CountdownThenStop => TimerMode::CountdownThenRepeat,
            TimerMode::CountdownThenRepeat => TimerMode::CountdownThenStop,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::CountdownThenStop => "Up/Down",
            TimerMode::CountdownThenRepeat => "Repeat",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TimerMode::CountdownThenStop => "⇅",
            TimerMode::CountdownThenRepeat => "⟳",
        }
    }

    pub fn is_repeat(&self) -> bool {
        matches!(self, TimerMode::CountdownThenRepeat)
    }
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "Idle",
            TimerState::Running => "Running",
            TimerState::Stopped => "Stopped",
        }
    }
}

impl TimerSnapshot {
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }
}

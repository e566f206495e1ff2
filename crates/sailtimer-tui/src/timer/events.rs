//! Timer events

use chrono::{DateTime, Utc};
use sailtimer_core::models::{StartDuration, TimerMode};
use serde::{Deserialize, Serialize};

/// Event emitted by a timer session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerEvent {
    pub event_type: TimerEventType,
    pub timestamp: DateTime<Utc>,
}

/// Types of timer events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEventType {
    /// Timer started or resumed
    Started { remaining_seconds: u64 },
    /// Timer stopped, value frozen
    Stopped { remaining_seconds: u64 },
    /// Timer re-armed to the full duration
    Reset { remaining_seconds: u64 },
    /// Count rounded down to the minute
    Synced { remaining_seconds: u64 },
    DurationSelected { duration: StartDuration },
    ModeChanged { mode: TimerMode },
    LockChanged { locked: bool },
    /// Displayed second changed
    Tick { remaining_seconds: u64 },
    /// Repeat cycle wrapped and re-armed
    CycleRearmed { cycle: u64 },
    /// Countdown reached zero and halted
    CountdownCompleted,
}

impl TimerEvent {
    pub fn new(event_type: TimerEventType) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
        }
    }

    pub fn tick(remaining_seconds: u64) -> Self {
        Self::new(TimerEventType::Tick { remaining_seconds })
    }

    pub fn is_tick(&self) -> bool {
        matches!(self.event_type, TimerEventType::Tick { .. })
    }
}

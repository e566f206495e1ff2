pub mod config;
pub mod duration;
pub mod timer;

pub use config::{Config, TimerConfig, UiConfig};
pub use duration::StartDuration;
pub use timer::{TimerMode, TimerSnapshot, TimerState};

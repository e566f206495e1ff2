//! Application state management

use crate::timer::{SessionError, TimerEvent, TimerEventType, TimerSession};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use sailtimer_core::models::{TimerSnapshot, UiConfig};
use sailtimer_core::{Clock, SystemClock};
use std::sync::Arc;

/// A user intent, decoded from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartStop,
    Reset,
    Sync,
    CycleDuration,
    ToggleMode,
    ToggleLock,
    ToggleHelp,
    Quit,
}

/// Something the terminal should signal to the sailor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// A whole minute remains.
    MinuteMark(u64),
    /// The countdown finished.
    Start,
    /// A repeat cycle finished and the next one began.
    CycleStart(u64),
}

impl Action {
    pub fn from_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Self> {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
            KeyCode::Char(' ') | KeyCode::Enter => Some(Action::StartStop),
            KeyCode::Char('r') => Some(Action::Reset),
            KeyCode::Char('s') => Some(Action::Sync),
            KeyCode::Char('d') => Some(Action::CycleDuration),
            KeyCode::Char('m') => Some(Action::ToggleMode),
            KeyCode::Char('l') => Some(Action::ToggleLock),
            KeyCode::Char('?') => Some(Action::ToggleHelp),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }

    /// Actions that still work while input is locked.
    pub fn allowed_while_locked(&self) -> bool {
        matches!(self, Action::ToggleLock | Action::Quit)
    }
}

pub struct App<C: Clock = SystemClock> {
    pub session: Arc<TimerSession<C>>,
    pub snapshot: TimerSnapshot,
    pub show_help: bool,
    pub should_quit: bool,
    pub status_message: String,
    pub audio_alerts_enabled: bool,
    pub notifications_enabled: bool,
}

impl<C: Clock> App<C> {
    pub async fn new(session: Arc<TimerSession<C>>, ui: &UiConfig) -> Self {
        let snapshot = session.snapshot().await;
        Self {
            session,
            snapshot,
            show_help: false,
            should_quit: false,
            status_message: "Ready".to_string(),
            audio_alerts_enabled: ui.audio_alerts,
            notifications_enabled: ui.notifications,
        }
    }

    pub async fn refresh_timer(&mut self) {
        self.snapshot = self.session.snapshot().await;
    }

    pub fn is_running(&self) -> bool {
        self.snapshot.is_running()
    }

    /// Apply a user intent, honouring the input lock and the running-state guards.
    pub async fn handle_action(&mut self, action: Action) -> Result<()> {
        if self.snapshot.locked && !action.allowed_while_locked() {
            self.status_message = "🔒 Locked - press [l] to unlock".to_string();
            return Ok(());
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::StartStop => {
                if self.is_running() {
                    if self.session.stop().await {
                        self.status_message = "Timer stopped".to_string();
                    }
                } else if self.session.start().await {
                    self.status_message = "Timer started".to_string();
                } else {
                    self.status_message = "Countdown finished - press [r] to reset".to_string();
                }
            }
            Action::Reset => {
                if self.is_running() {
                    self.status_message = "Stop the timer before resetting".to_string();
                } else {
                    self.session.reset().await;
                    self.status_message = "Timer reset".to_string();
                }
            }
            Action::Sync => {
                let seconds = self.session.sync().await;
                self.status_message = format!(
                    "Synced to {}",
                    sailtimer_core::format::time_string(seconds)
                );
            }
            Action::CycleDuration => match self.session.cycle_duration().await {
                Ok(duration) => {
                    self.status_message = format!("{} minute sequence", duration.label());
                }
                Err(e) => self.report_guarded(e),
            },
            Action::ToggleMode => match self.session.toggle_mode().await {
                Ok(mode) => self.status_message = format!("Mode: {}", mode.as_str()),
                Err(e) => self.report_guarded(e),
            },
            Action::ToggleLock => {
                let locked = self.session.toggle_lock().await;
                self.status_message = if locked {
                    "🔒 Input locked".to_string()
                } else {
                    "🔓 Input unlocked".to_string()
                };
            }
        }

        self.refresh_timer().await;
        Ok(())
    }

    /// Update from a session event; returns the alert to raise, if any.
    pub async fn on_timer_event(&mut self, event: &TimerEvent) -> Option<Alert> {
        self.refresh_timer().await;

        match event.event_type {
            TimerEventType::Tick { remaining_seconds } => {
                let full_cycle = self.snapshot.duration.as_secs();
                if self.is_running()
                    && remaining_seconds > 0
                    && remaining_seconds % 60 == 0
                    && remaining_seconds < full_cycle
                {
                    Some(Alert::MinuteMark(remaining_seconds / 60))
                } else {
                    None
                }
            }
            TimerEventType::CountdownCompleted => {
                self.status_message = "🏁 START! 🏁".to_string();
                Some(Alert::Start)
            }
            TimerEventType::CycleRearmed { cycle } => {
                self.status_message = format!("🏁 Cycle {} complete - next sequence running", cycle);
                Some(Alert::CycleStart(cycle))
            }
            _ => None,
        }
    }

    fn report_guarded(&mut self, error: SessionError) {
        tracing::debug!("Rejected while running: {}", error);
        self.status_message = match error {
            SessionError::Core(sailtimer_core::Error::TimerRunning) => {
                "Stop the timer to change settings".to_string()
            }
            other => format!("Error: {}", other),
        };
    }
}

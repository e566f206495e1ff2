//! Shared timer session: serialises every engine call and drives the periodic tick.

use sailtimer_core::models::{StartDuration, TimerMode, TimerSnapshot};
use sailtimer_core::{Clock, SystemClock, TickOutcome, TimerEngine};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{interval, Duration, MissedTickBehavior};

use super::events::{TimerEvent, TimerEventType};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Core error: {0}")]
    Core(#[from] sailtimer_core::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

struct SessionState<C: Clock> {
    engine: TimerEngine<C>,
    /// Last whole-second value announced with a `Tick`.
    last_second: u64,
}

pub struct TimerSession<C: Clock = SystemClock> {
    state: Mutex<SessionState<C>>,
    event_tx: broadcast::Sender<TimerEvent>,
    tick_interval: Duration,
}

impl<C: Clock> TimerSession<C> {
    pub fn new(engine: TimerEngine<C>, tick_interval: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let last_second = engine.snapshot().remaining_seconds;
        Self {
            state: Mutex::new(SessionState {
                engine,
                last_second,
            }),
            event_tx,
            tick_interval,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        let state = self.state.lock().await;
        state.engine.snapshot()
    }

    pub async fn start(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.engine.start() {
            return false;
        }

        let remaining_seconds = state.engine.snapshot().remaining_seconds;
        state.last_second = remaining_seconds;
        self.emit(TimerEventType::Started { remaining_seconds });
        true
    }

    pub async fn stop(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.engine.stop() {
            return false;
        }

        let remaining_seconds = state.engine.snapshot().remaining_seconds;
        state.last_second = remaining_seconds;
        self.emit(TimerEventType::Stopped { remaining_seconds });
        if state.engine.is_finished() {
            self.emit(TimerEventType::CountdownCompleted);
        }
        true
    }

    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.engine.reset();

        let remaining_seconds = state.engine.snapshot().remaining_seconds;
        state.last_second = remaining_seconds;
        self.emit(TimerEventType::Reset { remaining_seconds });
    }

    pub async fn sync(&self) -> u64 {
        let mut state = self.state.lock().await;
        let was_finished = state.engine.is_finished();
        let remaining_seconds = state.engine.sync();
        state.last_second = remaining_seconds;
        self.emit(TimerEventType::Synced { remaining_seconds });
        if !was_finished && state.engine.is_finished() {
            self.emit(TimerEventType::CountdownCompleted);
        }
        remaining_seconds
    }

    pub async fn select_duration(&self, duration: StartDuration) -> Result<()> {
        let mut state = self.state.lock().await;
        state.engine.select_duration(duration)?;
        state.last_second = duration.as_secs();
        self.emit(TimerEventType::DurationSelected { duration });
        Ok(())
    }

    /// Switch between the two standard sequence lengths.
    pub async fn cycle_duration(&self) -> Result<StartDuration> {
        let next = {
            let state = self.state.lock().await;
            state.engine.duration().toggle()
        };
        self.select_duration(next).await?;
        Ok(next)
    }

    pub async fn toggle_mode(&self) -> Result<TimerMode> {
        let mut state = self.state.lock().await;
        let mode = state.engine.toggle_mode()?;
        self.emit(TimerEventType::ModeChanged { mode });
        Ok(mode)
    }

    pub async fn toggle_lock(&self) -> bool {
        let mut state = self.state.lock().await;
        let locked = state.engine.toggle_lock();
        self.emit(TimerEventType::LockChanged { locked });
        locked
    }

    /// Advance the engine once and announce anything that changed.
    pub async fn tick(&self) -> TickOutcome {
        let mut state = self.state.lock().await;
        let outcome = state.engine.advance();

        match outcome {
            TickOutcome::NotRunning => {}
            TickOutcome::Completed => {
                state.last_second = 0;
                self.send(TimerEvent::tick(0));
                self.emit(TimerEventType::CountdownCompleted);
            }
            TickOutcome::Rearmed {
                remaining_seconds,
                cycle,
            } => {
                state.last_second = remaining_seconds;
                self.emit(TimerEventType::CycleRearmed { cycle });
                self.send(TimerEvent::tick(remaining_seconds));
            }
            TickOutcome::Running { remaining_seconds } => {
                if remaining_seconds != state.last_second {
                    state.last_second = remaining_seconds;
                    self.send(TimerEvent::tick(remaining_seconds));
                }
            }
        }

        outcome
    }

    /// Tick forever at the configured interval. Abort the task to end it.
    pub async fn start_tick_loop(self: Arc<Self>) {
        let mut tick_interval = interval(self.tick_interval);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(interval_ms = self.tick_interval.as_millis() as u64, "Tick loop started");

        loop {
            tick_interval.tick().await;
            self.tick().await;
        }
    }

    fn emit(&self, event_type: TimerEventType) {
        self.send(TimerEvent::new(event_type));
    }

    fn send(&self, event: TimerEvent) {
        tracing::trace!(event_type = ?event.event_type, "Timer event");
        let _ = self.event_tx.send(event);
    }
}

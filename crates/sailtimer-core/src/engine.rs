//! Start-sequence timer state machine.
//!
//! The engine keeps the value it had at an anchor instant plus the anchor itself, and
//! derives the live value from the clock on every query, so the count never drifts with the
//! rate at which the presentation polls it.

use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::format::time_string;
use crate::models::{StartDuration, TimerMode, TimerSnapshot, TimerState};
use crate::{Error, Result};

/// Result of advancing the engine to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is idle or stopped; nothing moved.
    NotRunning,
    Running { remaining_seconds: u64 },
    /// A repeat cycle wrapped since the previous tick and the count re-armed.
    Rearmed { remaining_seconds: u64, cycle: u64 },
    /// The countdown reached zero and the timer halted.
    Completed,
}

#[derive(Debug, Clone)]
pub struct TimerEngine<C: Clock = SystemClock> {
    clock: C,
    duration: StartDuration,
    mode: TimerMode,
    state: TimerState,
    locked: bool,
    /// Value at `started_at` while running, frozen value otherwise.
    remaining: Duration,
    started_at: Option<Instant>,
    cycles_completed: u64,
    /// `cycles_completed` at the moment of `started_at`.
    anchor_cycles: u64,
}

impl TimerEngine<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TimerEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TimerEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        let duration = StartDuration::default();
        Self {
            clock,
            duration,
            mode: TimerMode::default(),
            state: TimerState::Idle,
            locked: false,
            remaining: duration.as_duration(),
            started_at: None,
            cycles_completed: 0,
            anchor_cycles: 0,
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn duration(&self) -> StartDuration {
        self.duration
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Choose the sequence length and re-arm to it. Rejected while running.
    pub fn select_duration(&mut self, choice: StartDuration) -> Result<()> {
        if self.is_running() {
            return Err(Error::TimerRunning);
        }
        choice.validate()?;

        tracing::debug!(?choice, "Selecting start duration");
        self.duration = choice;
        self.reset();
        Ok(())
    }

    /// Flip between stop-at-zero and repeat. Rejected while running.
    pub fn toggle_mode(&mut self) -> Result<TimerMode> {
        let mode = self.mode.toggle();
        self.set_mode(mode)?;
        Ok(mode)
    }

    pub fn set_mode(&mut self, mode: TimerMode) -> Result<()> {
        if self.is_running() {
            return Err(Error::TimerRunning);
        }

        tracing::debug!(?mode, "Setting timer mode");
        self.mode = mode;
        Ok(())
    }

    /// Advisory input lock for the presentation layer. Returns the new flag.
    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        tracing::debug!(locked = self.locked, "Lock toggled");
        self.locked
    }

    /// Start or resume counting from the current value. Returns whether the timer started.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        if self.mode == TimerMode::CountdownThenStop && self.remaining.is_zero() {
            tracing::debug!("Start ignored, countdown already at zero");
            return false;
        }

        self.started_at = Some(self.clock.now());
        self.anchor_cycles = self.cycles_completed;
        self.state = TimerState::Running;

        tracing::info!(
            remaining = self.remaining.as_secs(),
            mode = self.mode.as_str(),
            "Timer started"
        );
        true
    }

    /// Freeze the count at its current whole-second value. Returns whether the timer stopped.
    ///
    /// A countdown already at zero completes instead and goes to `Idle`.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        let now = self.clock.now();
        let value = self.current_value(now);
        if self.mode == TimerMode::CountdownThenStop && value.is_zero() {
            self.finish();
            return true;
        }

        self.cycles_completed = self.cycles_at(now);
        self.remaining = Duration::from_secs(value.as_secs());
        self.started_at = None;
        self.state = TimerState::Stopped;

        tracing::info!(remaining = self.remaining.as_secs(), "Timer stopped");
        true
    }

    /// Re-arm to the full configured length and halt.
    pub fn reset(&mut self) {
        self.remaining = self.duration.as_duration();
        self.started_at = None;
        self.state = TimerState::Idle;
        self.cycles_completed = 0;
        self.anchor_cycles = 0;

        tracing::debug!(remaining = self.remaining.as_secs(), "Timer reset");
    }

    /// Round the count down to the last whole minute, e.g. 2:17 becomes 2:00.
    ///
    /// While running the count continues from the new value at this instant.
    pub fn sync(&mut self) -> u64 {
        let secs = if self.is_running() {
            let now = self.clock.now();
            let value = self.current_value(now);
            self.cycles_completed = self.cycles_at(now);
            self.anchor_cycles = self.cycles_completed;
            self.started_at = Some(now);
            value.as_secs()
        } else {
            self.remaining.as_secs()
        };

        let floored = secs / 60 * 60;
        self.remaining = Duration::from_secs(floored);
        tracing::info!(from = secs, to = floored, "Timer synced to minute");

        if floored == 0 && self.mode == TimerMode::CountdownThenStop {
            self.finish();
        }
        floored
    }

    /// A stop-mode countdown that reached zero and now waits for `reset()`.
    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Idle
            && self.mode == TimerMode::CountdownThenStop
            && self.remaining.is_zero()
    }

    /// Live value at `now` without changing state.
    pub fn current_value(&self, now: Instant) -> Duration {
        let Some(started_at) = self.running_anchor() else {
            return self.remaining;
        };

        let elapsed = now.saturating_duration_since(started_at);
        match self.mode {
            TimerMode::CountdownThenStop => self.remaining.saturating_sub(elapsed),
            TimerMode::CountdownThenRepeat => {
                if elapsed < self.remaining {
                    return self.remaining - elapsed;
                }
                let cycle = self.duration.as_duration();
                let over = (elapsed - self.remaining).as_nanos();
                let into_cycle = over % cycle.as_nanos();
                cycle - Duration::from_nanos(into_cycle as u64)
            }
        }
    }

    /// Live value truncated to whole seconds, as displayed.
    pub fn remaining_seconds(&self, now: Instant) -> u64 {
        self.current_value(now).as_secs()
    }

    /// Bring the engine up to `now`: halts a finished countdown and records repeat wraps.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::NotRunning;
        }

        let value = self.current_value(now);

        if self.mode == TimerMode::CountdownThenStop && value.is_zero() {
            self.finish();
            return TickOutcome::Completed;
        }

        let remaining_seconds = value.as_secs();
        let cycles = self.cycles_at(now);
        if cycles > self.cycles_completed {
            self.cycles_completed = cycles;
            tracing::info!(cycle = cycles, "Repeat cycle re-armed");
            return TickOutcome::Rearmed {
                remaining_seconds,
                cycle: cycles,
            };
        }

        TickOutcome::Running { remaining_seconds }
    }

    /// `tick` at the engine's own clock.
    pub fn advance(&mut self) -> TickOutcome {
        let now = self.clock.now();
        self.tick(now)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshot_at(self.clock.now())
    }

    pub fn snapshot_at(&self, now: Instant) -> TimerSnapshot {
        let remaining_seconds = self.remaining_seconds(now);
        TimerSnapshot {
            remaining_seconds,
            display: time_string(remaining_seconds),
            state: self.state,
            mode: self.mode,
            duration: self.duration,
            locked: self.locked,
            cycles_completed: self.cycles_at(now),
        }
    }

    fn finish(&mut self) {
        self.remaining = Duration::ZERO;
        self.started_at = None;
        self.state = TimerState::Idle;
        tracing::info!("Countdown completed");
    }

    fn running_anchor(&self) -> Option<Instant> {
        if self.is_running() {
            self.started_at
        } else {
            None
        }
    }

    /// Total repeat cycles completed as of `now`.
    fn cycles_at(&self, now: Instant) -> u64 {
        let Some(started_at) = self.running_anchor() else {
            return self.cycles_completed;
        };
        if !self.mode.is_repeat() {
            return self.cycles_completed;
        }

        let elapsed = now.saturating_duration_since(started_at);
        if elapsed < self.remaining {
            return self.anchor_cycles;
        }

        let over = (elapsed - self.remaining).as_nanos();
        let wraps = over / self.duration.as_duration().as_nanos();
        self.anchor_cycles + 1 + wraps as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn engine() -> (TimerEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (TimerEngine::with_clock(clock.clone()), clock)
    }

    fn display(engine: &TimerEngine<ManualClock>) -> String {
        engine.snapshot().display
    }

    #[test]
    fn test_defaults() {
        let (engine, _clock) = engine();
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.remaining_seconds, 180);
        assert_eq!(snapshot.display, "3:00");
        assert_eq!(snapshot.state, TimerState::Idle);
        assert_eq!(snapshot.mode, TimerMode::CountdownThenStop);
        assert_eq!(snapshot.duration, StartDuration::ThreeMinutes);
        assert!(!snapshot.locked);
    }

    #[test]
    fn test_select_duration_rearms() {
        for choice in [StartDuration::ThreeMinutes, StartDuration::FiveMinutes] {
            let (mut engine, clock) = engine();
            engine.start();
            clock.advance_secs(20);
            engine.stop();

            engine.select_duration(choice).unwrap();
            engine.reset();

            assert_eq!(engine.remaining_seconds(clock.now()), choice.as_secs());
            assert!(!engine.is_running());
            assert_eq!(engine.state(), TimerState::Idle);
        }
    }

    #[test]
    fn test_reset_is_idempotent() {
        let (mut engine, clock) = engine();
        engine.select_duration(StartDuration::FiveMinutes).unwrap();
        engine.start();
        clock.advance_secs(42);

        engine.reset();
        let once = engine.snapshot();
        engine.reset();
        let twice = engine.snapshot();

        assert_eq!(once, twice);
        assert_eq!(twice.remaining_seconds, 300);
        assert_eq!(twice.state, TimerState::Idle);
    }

    #[test]
    fn test_countdown_is_monotonic_and_stops_at_zero() {
        let (mut engine, clock) = engine();
        let start = clock.now();
        engine.start();

        let mut previous = engine.current_value(start);
        for ms in (0..200_000).step_by(750) {
            let value = engine.current_value(start + Duration::from_millis(ms));
            assert!(value <= previous);
            previous = value;
        }
        assert_eq!(previous, Duration::ZERO);

        clock.advance_secs(179);
        assert_eq!(
            engine.advance(),
            TickOutcome::Running {
                remaining_seconds: 1
            }
        );

        clock.advance_secs(1);
        assert_eq!(engine.advance(), TickOutcome::Completed);
        assert!(!engine.is_running());
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(display(&engine), "0:00");

        clock.advance_secs(30);
        assert_eq!(engine.advance(), TickOutcome::NotRunning);
        assert_eq!(engine.remaining_seconds(clock.now()), 0);
    }

    #[test]
    fn test_late_tick_still_clamps_at_zero() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(500);

        assert_eq!(engine.remaining_seconds(clock.now()), 0);
        assert_eq!(engine.advance(), TickOutcome::Completed);
        assert_eq!(engine.snapshot().remaining_seconds, 0);
    }

    #[test]
    fn test_start_at_zero_in_stop_mode_is_ignored() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(180);
        engine.advance();

        assert!(!engine.start());
        assert!(!engine.is_running());

        engine.reset();
        assert!(engine.start());
    }

    #[test]
    fn test_repeat_wraps_around() {
        let (mut engine, clock) = engine();
        engine.toggle_mode().unwrap();
        let start = clock.now();
        engine.start();

        assert_eq!(engine.remaining_seconds(start), 180);
        assert_eq!(
            engine.remaining_seconds(start + Duration::from_secs(180)),
            180
        );

        clock.advance_secs(180);
        assert_eq!(
            engine.advance(),
            TickOutcome::Rearmed {
                remaining_seconds: 180,
                cycle: 1
            }
        );

        clock.advance_secs(1);
        assert_eq!(
            engine.advance(),
            TickOutcome::Running {
                remaining_seconds: 179
            }
        );

        clock.advance_secs(180 * 10);
        assert!(matches!(
            engine.advance(),
            TickOutcome::Rearmed { cycle: 11, .. }
        ));
        assert!(engine.is_running());
        assert_eq!(engine.cycles_completed(), 11);
    }

    #[test]
    fn test_sync_truncates_to_minute() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(43);
        assert_eq!(display(&engine), "2:17");

        assert_eq!(engine.sync(), 120);
        assert_eq!(display(&engine), "2:00");
        assert!(engine.is_running());

        clock.advance_secs(1);
        assert_eq!(display(&engine), "1:59");
    }

    #[test]
    fn test_sync_discards_sub_second_part() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(Duration::from_millis(60_500));

        assert_eq!(display(&engine), "1:59");
        assert_eq!(engine.sync(), 60);
        assert_eq!(display(&engine), "1:00");
    }

    #[test]
    fn test_sync_while_stopped_floors_frozen_value() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(43);
        engine.stop();

        assert_eq!(engine.sync(), 120);
        assert_eq!(engine.state(), TimerState::Stopped);
        assert_eq!(engine.sync(), 120);

        clock.advance_secs(10);
        assert_eq!(display(&engine), "2:00");
    }

    #[test]
    fn test_stop_then_resume_from_frozen_value() {
        let (mut engine, clock) = engine();
        engine.select_duration(StartDuration::ThreeMinutes).unwrap();
        engine.start();
        clock.advance_secs(65);
        assert_eq!(display(&engine), "1:55");

        assert!(engine.stop());
        assert_eq!(display(&engine), "1:55");
        assert_eq!(engine.state(), TimerState::Stopped);

        clock.advance_secs(30);
        assert_eq!(display(&engine), "1:55");

        assert!(engine.start());
        assert_eq!(display(&engine), "1:55");
        clock.advance_secs(5);
        assert_eq!(display(&engine), "1:50");
    }

    #[test]
    fn test_stop_freezes_whole_seconds() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(Duration::from_millis(500));
        assert_eq!(
            engine.advance(),
            TickOutcome::Running {
                remaining_seconds: 179
            }
        );

        engine.stop();
        assert_eq!(engine.current_value(clock.now()), Duration::from_secs(179));
    }

    #[test]
    fn test_five_minute_repeat_scenario() {
        let (mut engine, clock) = engine();
        engine.select_duration(StartDuration::FiveMinutes).unwrap();
        assert_eq!(engine.toggle_mode().unwrap(), TimerMode::CountdownThenRepeat);
        engine.start();

        clock.advance_secs(305);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.remaining_seconds, 295);
        assert_eq!(snapshot.display, "4:55");
        assert!(snapshot.is_running());
        assert_eq!(snapshot.cycles_completed, 1);
    }

    #[test]
    fn test_repeat_resume_keeps_cycle_count() {
        let (mut engine, clock) = engine();
        engine.toggle_mode().unwrap();
        engine.start();
        clock.advance_secs(200);
        engine.stop();
        assert_eq!(engine.cycles_completed(), 1);
        assert_eq!(display(&engine), "2:40");

        engine.start();
        clock.advance_secs(160);
        assert_eq!(
            engine.advance(),
            TickOutcome::Rearmed {
                remaining_seconds: 180,
                cycle: 2
            }
        );
    }

    #[test]
    fn test_guarded_operations_while_running() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(10);

        assert!(matches!(
            engine.select_duration(StartDuration::FiveMinutes),
            Err(Error::TimerRunning)
        ));
        assert!(matches!(engine.toggle_mode(), Err(Error::TimerRunning)));

        assert_eq!(engine.duration(), StartDuration::ThreeMinutes);
        assert_eq!(engine.mode(), TimerMode::CountdownThenStop);
        assert!(engine.is_running());
        assert_eq!(display(&engine), "2:50");
    }

    #[test]
    fn test_invalid_duration_leaves_state_untouched() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(30);
        engine.stop();

        let before = engine.snapshot();
        assert!(matches!(
            engine.select_duration(StartDuration::Custom(0)),
            Err(Error::InvalidDuration(_))
        ));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_custom_duration() {
        let (mut engine, clock) = engine();
        engine
            .select_duration(StartDuration::custom_secs(90.0).unwrap())
            .unwrap();
        engine.start();
        clock.advance_secs(31);
        assert_eq!(display(&engine), "0:59");
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let (mut engine, clock) = engine();
        assert!(!engine.stop());
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(engine.start());
        clock.advance_secs(10);
        assert!(!engine.start());
        assert_eq!(display(&engine), "2:50");

        assert!(engine.stop());
        assert!(!engine.stop());
        assert_eq!(display(&engine), "2:50");
    }

    #[test]
    fn test_lock_has_no_effect_on_counting() {
        let (mut engine, clock) = engine();
        assert!(engine.toggle_lock());
        engine.start();
        clock.advance_secs(20);
        assert_eq!(display(&engine), "2:40");

        engine.stop();
        engine.reset();
        assert!(engine.is_locked());
        assert!(!engine.toggle_lock());
    }

    #[test]
    fn test_stop_after_zero_completes() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(180);

        assert!(engine.stop());
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(engine.is_finished());
        assert_eq!(display(&engine), "0:00");
        assert_eq!(engine.advance(), TickOutcome::NotRunning);
        assert!(!engine.start());

        engine.reset();
        assert!(engine.start());
        assert_eq!(display(&engine), "3:00");
    }

    #[test]
    fn test_sync_to_zero_completes() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(140);
        engine.stop();
        assert_eq!(display(&engine), "0:40");

        assert_eq!(engine.sync(), 0);
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(engine.is_finished());

        engine.reset();
        assert!(engine.start());
        clock.advance_secs(125);
        assert_eq!(engine.sync(), 0);
        assert!(!engine.is_running());
        assert_eq!(engine.advance(), TickOutcome::NotRunning);
        assert_eq!(display(&engine), "0:00");
    }

    #[test]
    fn test_repeat_sync_to_zero_keeps_running() {
        let (mut engine, clock) = engine();
        engine.toggle_mode().unwrap();
        engine.start();
        clock.advance_secs(130);

        assert_eq!(engine.sync(), 0);
        assert!(engine.is_running());
        assert!(!engine.is_finished());

        clock.advance_secs(1);
        assert_eq!(display(&engine), "2:59");
    }

    #[test]
    fn test_tick_when_idle() {
        let (mut engine, clock) = engine();
        clock.advance_secs(60);
        assert_eq!(engine.advance(), TickOutcome::NotRunning);
        assert_eq!(display(&engine), "3:00");
    }
}

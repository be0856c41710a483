//! Countdown state machine
//!
//! `Idle -> Running <-> Paused -> Finished -> (restart) -> Running`, with
//! cancel returning to `Idle` from anywhere. The engine is tick-count driven:
//! each call to [`CountdownEngine::tick`] removes exactly one second, and it
//! never looks at the wall clock.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Settings;
use crate::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountdownError {
    #[error("Countdown duration must be positive, got {0}s")]
    NonPositiveDuration(i64),

    #[error("Cannot {action} a countdown that is {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed
    Ignored,
    /// One second removed, time still left
    Ticked { remaining: i64 },
    /// Reached zero on this tick
    Finished,
}

/// Published view of the countdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownSnapshot {
    pub phase: Phase,
    pub remaining: i64,
    pub total: i64,
    /// Changes on every start, resume and restart
    pub run_id: u64,
}

impl CountdownSnapshot {
    pub fn display(&self) -> String {
        time::format(self.remaining)
    }

    /// Percentage elapsed, defined while `total > 0`
    pub fn progress(&self) -> Option<f64> {
        if self.total <= 0 {
            return None;
        }
        Some((self.total - self.remaining) as f64 / self.total as f64 * 100.0)
    }
}

impl Default for CountdownSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            remaining: 0,
            total: 0,
            run_id: 0,
        }
    }
}

/// Owner of the countdown state; mutated only through its commands and
/// its tick handler
#[derive(Debug, Clone)]
pub struct CountdownEngine {
    phase: Phase,
    remaining: i64,
    total: i64,
    run_id: u64,
    settings: Settings,
    preset_label: Option<String>,
}

impl CountdownEngine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            remaining: 0,
            total: 0,
            run_id: 0,
            settings: Settings::default(),
            preset_label: None,
        }
    }

    /// Begin a countdown of `total_seconds`. Zero or negative durations are
    /// rejected; anything above 99:59 is clamped.
    pub fn start(&mut self, total_seconds: i64, settings: Settings) -> Result<(), CountdownError> {
        if total_seconds <= 0 {
            return Err(CountdownError::NonPositiveDuration(total_seconds));
        }

        let total = time::normalize(total_seconds);
        self.total = total;
        self.remaining = total;
        self.settings = settings;
        self.preset_label = None;
        self.begin_run();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), CountdownError> {
        self.expect_phase("pause", Phase::Running)?;
        self.phase = Phase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), CountdownError> {
        self.expect_phase("resume", Phase::Paused)?;
        self.begin_run();
        Ok(())
    }

    /// Back to the configured duration, not running
    pub fn reset(&mut self) -> Result<(), CountdownError> {
        if self.phase == Phase::Idle {
            return Err(self.invalid("reset"));
        }
        self.remaining = self.total;
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Run again from the full duration, after finishing or a reset
    pub fn restart(&mut self) -> Result<(), CountdownError> {
        let ready = self.phase == Phase::Idle && self.total > 0;
        if self.phase != Phase::Finished && !ready {
            return Err(self.invalid("restart"));
        }
        self.remaining = self.total;
        self.begin_run();
        Ok(())
    }

    /// Stop unconditionally and forget the configured duration
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.remaining = 0;
        self.total = 0;
        self.preset_label = None;
    }

    /// The primary button: pause, resume, or run again
    pub fn toggle(&mut self) -> Result<(), CountdownError> {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Finished | Phase::Idle => self.restart().map_err(|_| self.invalid("toggle")),
        }
    }

    /// Remove one second. Ignored unless running.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Ignored;
        }

        self.remaining = (self.remaining - 1).max(0);
        if self.remaining > 0 {
            return TickOutcome::Ticked {
                remaining: self.remaining,
            };
        }

        self.phase = Phase::Finished;
        TickOutcome::Finished
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn preset_label(&self) -> Option<&str> {
        self.preset_label.as_deref()
    }

    pub fn set_preset_label(&mut self, label: Option<String>) {
        self.preset_label = label;
    }

    pub fn progress(&self) -> Option<f64> {
        self.snapshot().progress()
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            phase: self.phase,
            remaining: self.remaining,
            total: self.total,
            run_id: self.run_id,
        }
    }

    fn begin_run(&mut self) {
        self.phase = Phase::Running;
        self.run_id = self.run_id.wrapping_add(1);
    }

    fn expect_phase(&self, action: &'static str, phase: Phase) -> Result<(), CountdownError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> CountdownError {
        CountdownError::InvalidTransition {
            action,
            phase: self.phase,
        }
    }
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(seconds: i64) -> CountdownEngine {
        let mut engine = CountdownEngine::new();
        engine.start(seconds, Settings::default()).unwrap();
        engine
    }

    #[test]
    fn test_five_second_countdown() {
        let mut engine = running(5);
        let outcomes: Vec<TickOutcome> = (0..5).map(|_| engine.tick()).collect();

        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Ticked { remaining: 4 },
                TickOutcome::Ticked { remaining: 3 },
                TickOutcome::Ticked { remaining: 2 },
                TickOutcome::Ticked { remaining: 1 },
                TickOutcome::Finished,
            ]
        );
        assert_eq!(engine.phase(), Phase::Finished);
        assert_eq!(engine.remaining(), 0);
        assert_eq!(engine.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_start_rejects_non_positive() {
        let mut engine = CountdownEngine::new();
        assert_eq!(
            engine.start(0, Settings::default()),
            Err(CountdownError::NonPositiveDuration(0))
        );
        assert_eq!(
            engine.start(-3, Settings::default()),
            Err(CountdownError::NonPositiveDuration(-3))
        );
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_start_clamps_long_durations() {
        let engine = running(10_000);
        assert_eq!(engine.total(), time::MAX_SECONDS);
        assert_eq!(engine.remaining(), time::MAX_SECONDS);
    }

    #[test]
    fn test_pause_holds_remaining() {
        let mut engine = running(5);
        engine.tick();
        engine.tick();
        assert_eq!(engine.remaining(), 3);

        engine.pause().unwrap();
        assert_eq!(engine.tick(), TickOutcome::Ignored);
        assert_eq!(engine.tick(), TickOutcome::Ignored);
        assert_eq!(engine.remaining(), 3);

        engine.resume().unwrap();
        assert_eq!(engine.remaining(), 3);
        assert_eq!(engine.tick(), TickOutcome::Ticked { remaining: 2 });
    }

    #[test]
    fn test_invalid_transitions() {
        let mut engine = CountdownEngine::new();
        assert!(engine.pause().is_err());
        assert!(engine.resume().is_err());
        assert!(engine.reset().is_err());
        assert!(engine.restart().is_err());
        assert!(engine.toggle().is_err());

        let mut engine = running(3);
        assert_eq!(
            engine.resume(),
            Err(CountdownError::InvalidTransition {
                action: "resume",
                phase: Phase::Running
            })
        );
    }

    #[test]
    fn test_reset_returns_to_ready() {
        let mut engine = running(10);
        engine.tick();
        engine.reset().unwrap();

        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.remaining(), 10);
        assert_eq!(engine.total(), 10);

        engine.toggle().unwrap();
        assert_eq!(engine.phase(), Phase::Running);
    }

    #[test]
    fn test_restart_after_finish() {
        let mut engine = running(1);
        assert_eq!(engine.tick(), TickOutcome::Finished);
        let finished_run = engine.snapshot().run_id;

        engine.toggle().unwrap();
        assert_eq!(engine.phase(), Phase::Running);
        assert_eq!(engine.remaining(), 1);
        assert_ne!(engine.snapshot().run_id, finished_run);
    }

    #[test]
    fn test_cancel_from_any_phase() {
        let mut engine = running(10);
        engine.pause().unwrap();
        engine.cancel();
        assert_eq!(engine.snapshot(), CountdownSnapshot {
            run_id: engine.snapshot().run_id,
            ..CountdownSnapshot::default()
        });

        engine.cancel();
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_progress() {
        let mut engine = running(4);
        assert_eq!(engine.progress(), Some(0.0));
        engine.tick();
        assert_eq!(engine.progress(), Some(25.0));

        assert_eq!(CountdownEngine::new().progress(), None);
    }

    #[test]
    fn test_snapshot_display() {
        let engine = running(90);
        assert_eq!(engine.snapshot().display(), "01:30");
    }
}

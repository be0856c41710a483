//! Platform profiles and audio tuning values

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Host class the feedback channel runs on.
///
/// Touch hosts suspend audio more aggressively and keep "ghost" playback
/// alive through ordinary pause calls, so they get more redundancy and a
/// harder stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformProfile {
    Desktop,
    Touch,
}

impl PlatformProfile {
    pub fn is_touch(self) -> bool {
        matches!(self, PlatformProfile::Touch)
    }
}

/// Tunable constants for the audio resource manager
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTuning {
    /// Instances per tone kind, at least 2
    pub pool_size: usize,
    pub tick_voices: usize,
    pub finish_voices: usize,
    pub tick_volume: f32,
    pub finish_volume: f32,
    /// Silence longer than this while running counts as lost audio
    pub staleness_threshold: Duration,
    pub loss_poll_interval: Duration,
    pub watchdog_interval: Duration,
    pub fade_duration: Duration,
    pub fade_steps: u32,
    /// Delay before a detached music source is re-attached
    pub reattach_delay: Duration,
    /// When the hard stop re-checks that music really stopped
    pub stop_grace_checks: [Duration; 2],
}

impl AudioTuning {
    pub fn for_profile(profile: PlatformProfile) -> Self {
        let base = Self {
            pool_size: 3,
            tick_voices: 2,
            finish_voices: 2,
            tick_volume: 0.2,
            finish_volume: 0.5,
            staleness_threshold: Duration::from_millis(1500),
            loss_poll_interval: Duration::from_millis(800),
            watchdog_interval: Duration::from_millis(200),
            fade_duration: Duration::from_millis(2000),
            fade_steps: 50,
            reattach_delay: Duration::from_millis(50),
            stop_grace_checks: [Duration::from_millis(100), Duration::from_millis(500)],
        };

        match profile {
            PlatformProfile::Desktop => base,
            PlatformProfile::Touch => Self {
                pool_size: 5,
                tick_voices: 3,
                tick_volume: 1.0,
                finish_volume: 1.0,
                ..base
            },
        }
    }

    /// Clamp pool sizes so redundancy is always possible, and keep every
    /// period non-zero
    pub(crate) fn sanitized(mut self) -> Self {
        let min_period = Duration::from_millis(1);
        self.loss_poll_interval = self.loss_poll_interval.max(min_period);
        self.watchdog_interval = self.watchdog_interval.max(min_period);
        self.pool_size = self.pool_size.max(2);
        self.tick_voices = self.tick_voices.clamp(1, self.pool_size);
        self.finish_voices = self.finish_voices.clamp(1, self.pool_size);
        self.fade_steps = self.fade_steps.max(1);
        self
    }

    pub fn fade_step_interval(&self) -> Duration {
        self.fade_duration / self.fade_steps.max(1)
    }
}

//! Background music watchdog task

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::audio::AudioManager;

/// Periodically reconcile the music channel with its desired state, undoing
/// pauses and resumes imposed by the host
pub async fn audio_watchdog_task(audio: AudioManager) {
    let period = audio.tuning().watchdog_interval;
    info!("Starting audio watchdog task ({}ms)", period.as_millis());

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        if audio.enforce_desired_state() {
            debug!("Watchdog corrected music playback state");
        }
    }
}

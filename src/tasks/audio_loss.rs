//! Audio loss detection task

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::audio::AudioManager;

/// Poll the staleness clock and raise the audio-lost flag when ticks have
/// stopped reaching the output
pub async fn audio_loss_task(audio: AudioManager) {
    let period = audio.tuning().loss_poll_interval;
    info!("Starting audio loss detection task ({}ms)", period.as_millis());

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut was_lost = false;
    loop {
        interval.tick().await;

        let lost = audio.detect_loss();
        if lost && !was_lost {
            warn!("Audio output appears lost, waiting for reactivation");
        } else if !lost && was_lost {
            info!("Audio output recovered");
        }
        was_lost = lost;
    }
}

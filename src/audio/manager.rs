//! Audio resource manager
//!
//! Owns the tick/finish pools, the keep-alive voice and the background music
//! channel. Every operation is best-effort: failures are logged and surface
//! only through [`AudioManager::audio_lost`]. Desired music state is tracked
//! separately from what the voice reports, and the watchdog task reconciles
//! the two.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{sleep, sleep_until, Instant},
};
use tracing::{debug, error, info, warn};

use super::{
    pool::{PlayReport, TonePool},
    profile::{AudioTuning, PlatformProfile},
    tone::ToneSpec,
    voice::{AudioBackend, AudioError, ToneSource, Voice},
};
use crate::tasks::{audio_loss_task, audio_watchdog_task};

/// Lazily built playback resources
struct Resources {
    tick_pool: TonePool,
    finish_pool: TonePool,
    keep_alive: Box<dyn Voice>,
    music: Box<dyn Voice>,
}

struct AudioInner {
    profile: PlatformProfile,
    tuning: AudioTuning,
    music_source: ToneSource,
    resources: Option<Resources>,
    /// Background music volume in `0.0..=1.0`
    music_volume: f32,
    should_be_playing: bool,
    countdown_active: bool,
    audio_lost: bool,
    /// Staleness clock: last successful play (or first attempt, or reactivation)
    last_heard: Option<Instant>,
    fade: Option<JoinHandle<()>>,
    stop_follow_up: Option<JoinHandle<()>>,
    supervisors: Vec<JoinHandle<()>>,
}

impl AudioInner {
    fn fade_active(&self) -> bool {
        self.fade.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn cancel_pending_stops(&mut self) {
        if let Some(handle) = self.fade.take() {
            handle.abort();
        }
        if let Some(handle) = self.stop_follow_up.take() {
            handle.abort();
        }
    }

    fn music(&mut self) -> Option<&mut Box<dyn Voice>> {
        self.resources.as_mut().map(|r| &mut r.music)
    }
}

/// Cloneable handle onto the single audio resource owner
#[derive(Clone)]
pub struct AudioManager {
    inner: Arc<Mutex<AudioInner>>,
    backend: Arc<dyn AudioBackend>,
}

impl AudioManager {
    /// Create a manager with the default tuning for `profile`.
    /// Nothing is allocated until [`AudioManager::initialize`].
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        profile: PlatformProfile,
        music_source: ToneSource,
        volume_percent: u8,
    ) -> Self {
        Self::with_tuning(
            backend,
            profile,
            AudioTuning::for_profile(profile),
            music_source,
            volume_percent,
        )
    }

    pub fn with_tuning(
        backend: Arc<dyn AudioBackend>,
        profile: PlatformProfile,
        tuning: AudioTuning,
        music_source: ToneSource,
        volume_percent: u8,
    ) -> Self {
        let inner = AudioInner {
            profile,
            tuning: tuning.sanitized(),
            music_source,
            resources: None,
            music_volume: f32::from(volume_percent.min(100)) / 100.0,
            should_be_playing: false,
            countdown_active: false,
            audio_lost: false,
            last_heard: None,
            fade: None,
            stop_follow_up: None,
            supervisors: Vec::new(),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            backend,
        }
    }

    fn lock(&self) -> MutexGuard<'_, AudioInner> {
        // Audio must never take the countdown down with it
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Build the pools and music channel on first call. Must run from a
    /// user-initiated command at least once per session; repeated calls are
    /// cheap. Returns false when the backend cannot provide voices.
    pub fn initialize(&self) -> bool {
        let mut inner = self.lock();
        if inner.resources.is_some() {
            drop(inner);
            // Supervision may not have started if the first call had no runtime
            self.ensure_supervision();
            return true;
        }

        match self.build_resources(&inner) {
            Ok(resources) => {
                inner.resources = Some(resources);
                info!(
                    "Audio initialized ({:?} profile, pool of {}, music volume {:.0}%)",
                    inner.profile,
                    inner.tuning.pool_size,
                    inner.music_volume * 100.0
                );
            }
            Err(e) => {
                warn!("Audio initialization failed, playback disabled: {}", e);
                return false;
            }
        }
        drop(inner);

        self.ensure_supervision();
        true
    }

    fn build_resources(&self, inner: &AudioInner) -> Result<Resources, AudioError> {
        let tuning = &inner.tuning;
        let backend = self.backend.as_ref();

        let tick = ToneSource::Rendered {
            name: "tick",
            wav: Arc::new(ToneSpec::TICK.render_wav()),
        };
        let finish = ToneSource::Rendered {
            name: "finish",
            wav: Arc::new(ToneSpec::FINISH.render_wav()),
        };
        let keep_alive_source = ToneSource::Rendered {
            name: "keep-alive",
            wav: Arc::new(ToneSpec::KEEP_ALIVE.render_wav()),
        };

        let tick_pool = TonePool::build(backend, "tick", &tick, tuning.pool_size, tuning.tick_volume)?;
        let finish_pool = TonePool::build(
            backend,
            "finish",
            &finish,
            tuning.pool_size,
            tuning.finish_volume,
        )?;

        let mut keep_alive = backend.create_voice(&keep_alive_source)?;
        keep_alive.reload();

        let mut music = backend.create_voice(&inner.music_source)?;
        music.set_looping(true);
        music.set_volume(inner.music_volume);
        music.reload();

        Ok(Resources {
            tick_pool,
            finish_pool,
            keep_alive,
            music,
        })
    }

    /// Start the watchdog and staleness poll if they are not running
    fn ensure_supervision(&self) {
        let mut inner = self.lock();
        inner.supervisors.retain(|handle| !handle.is_finished());
        if !inner.supervisors.is_empty() {
            return;
        }

        let watchdog = spawn_background(audio_watchdog_task(self.clone()));
        let poll = spawn_background(audio_loss_task(self.clone()));
        match (watchdog, poll) {
            (Some(watchdog), Some(poll)) => inner.supervisors = vec![watchdog, poll],
            _ => warn!("No async runtime available, audio supervision not started"),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().resources.is_some()
    }

    /// Whether the watchdog and staleness poll are running
    pub fn is_supervised(&self) -> bool {
        let inner = self.lock();
        !inner.supervisors.is_empty() && inner.supervisors.iter().all(|h| !h.is_finished())
    }

    pub fn profile(&self) -> PlatformProfile {
        self.lock().profile
    }

    pub fn tuning(&self) -> AudioTuning {
        self.lock().tuning.clone()
    }

    /// Play the tick tone on several voices at once. Returns whether any
    /// voice accepted playback; callers are free to ignore it.
    pub fn play_tick(&self) -> bool {
        self.play_pooled(|resources, tuning| resources.tick_pool.play_redundant(tuning.tick_voices))
    }

    /// Play the completion tone, once per countdown
    pub fn play_finish(&self) -> bool {
        self.play_pooled(|resources, tuning| {
            resources.finish_pool.play_redundant(tuning.finish_voices)
        })
    }

    fn play_pooled<F>(&self, play: F) -> bool
    where
        F: FnOnce(&mut Resources, &AudioTuning) -> PlayReport,
    {
        if !self.initialize() {
            return false;
        }

        let mut inner = self.lock();
        let now = Instant::now();
        inner.audio_lost = false;
        if inner.last_heard.is_none() {
            inner.last_heard = Some(now);
        }

        let tuning = inner.tuning.clone();
        let report = match inner.resources.as_mut() {
            Some(resources) => play(resources, &tuning),
            None => PlayReport::default(),
        };

        if report.any_succeeded() {
            inner.last_heard = Some(now);
        }
        report.any_succeeded()
    }

    /// Near-silent blip that keeps the output device from being reclaimed.
    /// Does not count as audible feedback for loss detection.
    pub fn play_keep_alive(&self) {
        if !self.initialize() {
            return;
        }
        let mut inner = self.lock();
        if let Some(resources) = inner.resources.as_mut() {
            resources.keep_alive.rewind();
            if let Err(e) = resources.keep_alive.play() {
                debug!("Keep-alive tone failed: {}", e);
            }
        }
    }

    /// Tell the manager whether a countdown is running. Loss detection only
    /// applies while it is, and each activation restarts the staleness clock.
    pub fn set_countdown_active(&self, active: bool) {
        let mut inner = self.lock();
        if active && !inner.countdown_active {
            inner.last_heard = None;
        }
        if !active {
            inner.audio_lost = false;
        }
        inner.countdown_active = active;
    }

    /// Current value of the loss flag, as of the last poll
    pub fn audio_lost(&self) -> bool {
        self.lock().audio_lost
    }

    /// Recompute the loss flag. Called by the staleness poll.
    pub fn detect_loss(&self) -> bool {
        let mut inner = self.lock();
        if !inner.countdown_active {
            inner.audio_lost = false;
            return false;
        }

        let Some(last_heard) = inner.last_heard else {
            return false;
        };

        let silent_for = Instant::now().saturating_duration_since(last_heard);
        if silent_for > inner.tuning.staleness_threshold && !inner.audio_lost {
            inner.audio_lost = true;
            warn!(
                "Audio appears lost: nothing played for {}ms",
                silent_for.as_millis()
            );
        }
        inner.audio_lost
    }

    /// Reload every pooled voice, reapply the music volume, resume music if
    /// it should be playing and clear the loss flag.
    pub fn reactivate(&self) {
        if !self.initialize() {
            return;
        }

        let resume_music = {
            let mut inner = self.lock();
            let volume = inner.music_volume;
            if let Some(resources) = inner.resources.as_mut() {
                resources.tick_pool.reload_all();
                resources.finish_pool.reload_all();
                resources.keep_alive.reload();
                resources.music.set_volume(volume);
            }
            inner.audio_lost = false;
            if inner.last_heard.is_some() {
                inner.last_heard = Some(Instant::now());
            }
            inner.should_be_playing
        };

        if resume_music {
            self.start_background_music();
        }
        info!("Audio pool reactivated");
    }

    /// Start the looping background track. The desired state flips to
    /// playing even if the host refuses to play.
    pub fn start_background_music(&self) {
        let mut inner = self.lock();
        inner.should_be_playing = true;
        inner.cancel_pending_stops();

        let volume = inner.music_volume;
        let Some(music) = inner.music() else {
            debug!("Background music not available");
            return;
        };

        music.set_volume(volume);
        music.set_looping(true);
        if !music.is_paused() {
            debug!("Background music already playing");
            return;
        }

        let result = match music.play() {
            Err(AudioError::Detached) => {
                music.reload();
                music.set_looping(true);
                music.play()
            }
            other => other,
        };
        match result {
            Ok(()) => info!("Background music started"),
            Err(e) => warn!("Background music failed to start: {}", e),
        }
    }

    /// Stop the background track. With `fade` on a desktop profile the volume
    /// ramps down before pausing; otherwise the stop is immediate and hard.
    /// The desired state flips to stopped right away and the watchdog
    /// enforces it.
    pub fn stop_background_music(&self, fade: bool) {
        let mut inner = self.lock();
        inner.should_be_playing = false;
        inner.cancel_pending_stops();

        let touch = inner.profile.is_touch();
        let tuning = inner.tuning.clone();
        let Some(music) = inner.music() else {
            return;
        };

        if fade && !touch && !music.is_paused() {
            let start_volume = music.volume();
            if let Some(handle) = spawn_background(fade_out(self.clone(), start_volume, tuning.clone())) {
                debug!("Fading out background music from {:.2}", start_volume);
                inner.fade = Some(handle);
                return;
            }
        }

        hard_stop(&mut **music, touch);
        inner.stop_follow_up = spawn_background(confirm_stopped(self.clone(), tuning, touch));
        debug!("Background music stopped immediately");
    }

    /// Whether music is supposed to be playing
    pub fn should_be_playing(&self) -> bool {
        self.lock().should_be_playing
    }

    /// Whether the music voice reports that it is playing
    pub fn music_playing(&self) -> bool {
        let mut inner = self.lock();
        inner.music().is_some_and(|music| !music.is_paused())
    }

    /// Pause the music if it plays while it should not. Called by the
    /// watchdog; returns true when it had to intervene.
    pub fn enforce_desired_state(&self) -> bool {
        let mut inner = self.lock();
        if inner.should_be_playing || inner.fade_active() {
            return false;
        }
        let Some(music) = inner.music() else {
            return false;
        };
        if music.is_paused() {
            return false;
        }

        warn!("Watchdog: background music playing while it should be stopped, forcing pause");
        music.pause();
        music.set_looping(false);
        music.rewind();
        true
    }

    /// Background music volume, 0..=100. Tick and finish tones keep their
    /// profile volumes.
    pub fn set_volume(&self, percent: u8) {
        let mut inner = self.lock();
        let volume = f32::from(percent.min(100)) / 100.0;
        inner.music_volume = volume;
        if inner.fade_active() {
            return;
        }
        if let Some(music) = inner.music() {
            music.set_volume(volume);
        }
    }

    pub fn volume_percent(&self) -> u8 {
        (self.lock().music_volume * 100.0).round() as u8
    }

    /// Stop everything, release all voices and cancel background processes.
    /// Safe to call repeatedly.
    pub fn dispose(&self) {
        let mut inner = self.lock();
        inner.cancel_pending_stops();
        for handle in inner.supervisors.drain(..) {
            handle.abort();
        }

        if let Some(mut resources) = inner.resources.take() {
            resources.tick_pool.release();
            resources.finish_pool.release();
            resources.keep_alive.pause();
            resources.keep_alive.detach();
            resources.music.pause();
            resources.music.detach();
            info!("Audio resources released");
        }

        inner.should_be_playing = false;
        inner.audio_lost = false;
        inner.last_heard = None;
    }
}

/// Stop sequence for hosts where a single pause is not reliable
fn hard_stop(music: &mut dyn Voice, touch: bool) {
    music.set_looping(false);
    music.pause();
    music.pause();
    music.rewind();
    if touch {
        music.detach();
    }
}

fn spawn_background<F>(future: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    Handle::try_current().ok().map(|handle| handle.spawn(future))
}

/// Ramp the music volume to zero in fixed steps, then pause and rewind
async fn fade_out(manager: AudioManager, start_volume: f32, tuning: AudioTuning) {
    let steps = tuning.fade_steps;
    let step_interval = tuning.fade_step_interval();

    for step in 1..=steps {
        sleep(step_interval).await;
        let mut inner = manager.lock();
        if inner.should_be_playing {
            return;
        }
        let volume = (start_volume - start_volume * step as f32 / steps as f32).max(0.0);
        if let Some(music) = inner.music() {
            music.set_volume(volume);
        }
    }

    let mut inner = manager.lock();
    let restore = inner.music_volume;
    if let Some(music) = inner.music() {
        music.pause();
        music.rewind();
        music.set_volume(restore);
    }
    info!("Background music faded out");
}

/// Follow up a hard stop: re-attach a detached source, then check twice that
/// the music really stopped, escalating to a full source reload.
async fn confirm_stopped(manager: AudioManager, tuning: AudioTuning, touch: bool) {
    let started = Instant::now();

    if touch {
        sleep(tuning.reattach_delay).await;
        let mut inner = manager.lock();
        if !inner.should_be_playing {
            if let Some(music) = inner.music() {
                music.reload();
            }
        }
    }

    let [first_check, final_check] = tuning.stop_grace_checks;

    sleep_until(started + first_check).await;
    {
        let mut inner = manager.lock();
        if inner.should_be_playing {
            return;
        }
        if let Some(music) = inner.music() {
            if !music.is_paused() {
                warn!("Background music still playing after {}ms, pausing again", first_check.as_millis());
                music.pause();
                music.set_looping(false);
                music.rewind();
            }
        }
    }

    sleep_until(started + final_check).await;
    let mut inner = manager.lock();
    if inner.should_be_playing {
        return;
    }
    if let Some(music) = inner.music() {
        if !music.is_paused() {
            error!(
                "Background music still playing after {}ms, reloading source",
                final_check.as_millis()
            );
            music.pause();
            music.detach();
            music.reload();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::audio::headless::{HeadlessBackend, VoiceProbe};

    fn manager(profile: PlatformProfile) -> (AudioManager, Arc<HeadlessBackend>) {
        let backend = Arc::new(HeadlessBackend::new());
        let manager = AudioManager::new(
            backend.clone(),
            profile,
            ToneSource::Track("background-music.mp3".into()),
            50,
        );
        (manager, backend)
    }

    fn music_probe(backend: &HeadlessBackend) -> VoiceProbe {
        backend.probes_for("background-music.mp3").remove(0)
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        assert!(!manager.is_initialized());
        assert!(manager.initialize());
        assert!(manager.initialize());

        assert_eq!(backend.probes_for("tick").len(), 3);
        assert_eq!(backend.probes_for("finish").len(), 3);
        assert_eq!(backend.probes_for("keep-alive").len(), 1);
        assert_eq!(backend.probes_for("background-music.mp3").len(), 1);
    }

    #[test]
    fn test_supervision_starts_once_a_runtime_is_available() {
        let (manager, _backend) = manager(PlatformProfile::Desktop);
        assert!(manager.initialize());
        assert!(!manager.is_supervised());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            assert!(manager.initialize());
            assert!(manager.is_supervised());
        });
        manager.dispose();
        assert!(!manager.is_supervised());
    }

    #[tokio::test]
    async fn test_touch_profile_builds_larger_pool() {
        let (manager, backend) = manager(PlatformProfile::Touch);
        assert!(manager.initialize());
        assert_eq!(backend.probes_for("tick").len(), 5);

        manager.play_tick();
        let playing: u32 = backend.probes_for("tick").iter().map(|p| p.plays()).sum();
        assert_eq!(playing, 3);
    }

    #[tokio::test]
    async fn test_unavailable_backend_degrades_to_no_op() {
        let backend = Arc::new(HeadlessBackend::unavailable());
        let manager = AudioManager::new(backend, PlatformProfile::Desktop, ToneSource::Silence, 50);

        assert!(!manager.initialize());
        assert!(!manager.play_tick());
        assert!(!manager.play_finish());
        manager.play_keep_alive();
        manager.start_background_music();
        manager.stop_background_music(true);
        manager.reactivate();
        manager.dispose();
        assert!(!manager.audio_lost());
    }

    #[tokio::test]
    async fn test_redundancy_masks_single_failing_voice() {
        let backend = Arc::new(HeadlessBackend::new());
        let tuning = AudioTuning {
            pool_size: 2,
            tick_voices: 2,
            ..AudioTuning::for_profile(PlatformProfile::Desktop)
        };
        let manager = AudioManager::with_tuning(
            backend.clone(),
            PlatformProfile::Desktop,
            tuning,
            ToneSource::Silence,
            50,
        );
        assert!(manager.initialize());

        let ticks = backend.probes_for("tick");
        ticks[0].set_fail_play(true);
        assert!(manager.play_tick());
        assert!(manager.play_tick());

        ticks[1].set_fail_play(true);
        assert!(!manager.play_tick());
    }

    #[tokio::test(start_paused = true)]
    async fn test_audio_lost_after_silence_while_running() {
        let (manager, _backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        manager.set_countdown_active(true);

        // Never lost before the first play
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(!manager.detect_loss());

        assert!(manager.play_tick());
        tokio::time::advance(Duration::from_millis(1000)).await;
        assert!(!manager.detect_loss());

        tokio::time::advance(Duration::from_millis(600)).await;
        assert!(manager.detect_loss());
        assert!(manager.audio_lost());

        manager.play_tick();
        assert!(!manager.audio_lost());
        assert!(!manager.detect_loss());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reactivate_clears_loss_and_reloads() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        manager.set_countdown_active(true);
        manager.play_tick();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(manager.detect_loss());

        let reloads_before = backend.probes_for("tick")[0].reloads();
        manager.reactivate();
        assert!(!manager.audio_lost());
        assert!(!manager.detect_loss());
        assert_eq!(backend.probes_for("tick")[0].reloads(), reloads_before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_audio_never_lost_when_idle() {
        let (manager, _backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        manager.set_countdown_active(true);
        manager.play_tick();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(manager.detect_loss());

        manager.set_countdown_active(false);
        assert!(!manager.audio_lost());
        assert!(!manager.detect_loss());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completely_failing_first_tick_is_detected() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        for probe in backend.probes_for("tick") {
            probe.set_fail_play(true);
        }
        manager.set_countdown_active(true);

        assert!(!manager.play_tick());
        tokio::time::advance(Duration::from_millis(1600)).await;
        assert!(manager.detect_loss());
    }

    #[tokio::test]
    async fn test_desired_state_flips_even_if_play_fails() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        music_probe(&backend).set_fail_play(true);

        manager.start_background_music();
        assert!(manager.should_be_playing());
        assert!(!manager.music_playing());

        manager.stop_background_music(false);
        assert!(!manager.should_be_playing());
    }

    #[tokio::test]
    async fn test_watchdog_enforces_stop_after_ghost_pause() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        manager.start_background_music();
        let music = music_probe(&backend);
        assert!(!music.is_paused());

        music.ignore_next_pauses(2);
        manager.stop_background_music(false);
        assert!(manager.music_playing());

        assert!(manager.enforce_desired_state());
        assert!(!manager.music_playing());
        assert!(!manager.enforce_desired_state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_task_pauses_within_one_interval() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        manager.start_background_music();
        let music = music_probe(&backend);

        // The host ignores both stop pauses and the first follow-up pause
        music.ignore_next_pauses(3);
        manager.stop_background_music(false);
        assert!(!music.is_paused());

        tokio::time::sleep(manager.tuning().watchdog_interval).await;
        assert!(music.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_ramps_volume_then_pauses() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        manager.start_background_music();
        let music = music_probe(&backend);

        manager.stop_background_music(true);
        assert!(!manager.should_be_playing());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(!music.is_paused());
        assert!(music.volume() < 0.5);
        assert!(music.volume() > 0.0);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(music.is_paused());
        assert!((music.volume() - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_stop_skips_fade_and_reattaches_source() {
        let (manager, backend) = manager(PlatformProfile::Touch);
        manager.initialize();
        manager.start_background_music();
        let music = music_probe(&backend);
        let reloads = music.reloads();

        manager.stop_background_music(true);
        assert!(music.is_paused());
        assert!(!music.snapshot().attached);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(music.snapshot().attached);
        assert_eq!(music.reloads(), reloads + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_fade() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        manager.start_background_music();
        let music = music_probe(&backend);

        manager.stop_background_music(true);
        tokio::time::sleep(Duration::from_millis(500)).await;
        manager.start_background_music();
        assert!((music.volume() - 0.5).abs() < f32::EPSILON);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!music.is_paused());
    }

    #[tokio::test]
    async fn test_set_volume_applies_to_music_only() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        manager.initialize();

        manager.set_volume(80);
        assert_eq!(manager.volume_percent(), 80);
        assert!((music_probe(&backend).volume() - 0.8).abs() < 1e-6);
        assert!((backend.probes_for("tick")[0].volume() - 0.2).abs() < 1e-6);

        manager.set_volume(250);
        assert_eq!(manager.volume_percent(), 100);
    }

    #[tokio::test]
    async fn test_reactivate_resumes_music_that_should_play() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        let music = music_probe(&backend);
        music.set_fail_play(true);
        manager.start_background_music();
        assert!(!manager.music_playing());

        music.set_fail_play(false);
        manager.reactivate();
        assert!(manager.music_playing());
    }

    #[tokio::test]
    async fn test_dispose_is_repeatable() {
        let (manager, backend) = manager(PlatformProfile::Desktop);
        manager.initialize();
        manager.start_background_music();

        manager.dispose();
        manager.dispose();
        assert!(!manager.is_initialized());
        assert!(!manager.should_be_playing());
        assert!(backend.probes().iter().all(|p| p.is_paused()));
    }
}

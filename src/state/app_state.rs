//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{
    CountdownEngine, CountdownSnapshot, HistoryEntry, HistoryStore, Phase, Settings,
    SettingsStore, TickOutcome, VolumeControl, VolumeStore,
};
use crate::{
    audio::AudioManager,
    error::AppError,
    presets,
    services::{Haptics, JsonStore, Notifier, FINISH_BODY, FINISH_TITLE, FINISH_VIBRATION},
};

/// Platform capabilities handed to the countdown
pub struct Platform {
    pub haptics: Arc<dyn Haptics>,
    pub notifier: Arc<dyn Notifier>,
    /// Whether notifications may be shown at all
    pub notifications_permitted: bool,
}

/// Everything the presentation layer needs to render
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownStatus {
    pub phase: Phase,
    pub remaining: i64,
    pub total: i64,
    pub display: String,
    pub progress: Option<f64>,
    pub audio_ready: bool,
    pub audio_lost: bool,
    pub music_playing: bool,
    pub music_should_play: bool,
    pub volume: u8,
    pub muted: bool,
    pub settings: Settings,
}

/// Main application state: the countdown engine, its audio feedback and
/// the persisted collaborators
pub struct AppState {
    /// The countdown itself; only this struct mutates it
    pub countdown: Mutex<CountdownEngine>,
    pub audio: AudioManager,
    pub settings: SettingsStore,
    pub history: HistoryStore,
    pub volume: VolumeStore,
    pub platform: Platform,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Countdown changes for the ticker task
    pub countdown_tx: watch::Sender<CountdownSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _countdown_rx: watch::Receiver<CountdownSnapshot>,
}

impl AppState {
    /// Create the state, loading persisted settings, history and volume
    pub fn new(
        audio: AudioManager,
        store: Arc<JsonStore>,
        platform: Platform,
        initial_volume: u8,
        port: u16,
        host: String,
    ) -> Self {
        let (countdown_tx, countdown_rx) = watch::channel(CountdownSnapshot::default());
        let volume = VolumeStore::load(store.clone(), initial_volume);
        audio.set_volume(volume.get().volume());

        Self {
            countdown: Mutex::new(CountdownEngine::new()),
            audio,
            settings: SettingsStore::load(store.clone()),
            history: HistoryStore::load(store),
            volume,
            platform,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            countdown_tx,
            _countdown_rx: countdown_rx,
        }
    }

    fn engine(&self) -> Result<MutexGuard<'_, CountdownEngine>, AppError> {
        self.countdown
            .lock()
            .map_err(|_| AppError::LockPoisoned("countdown"))
    }

    /// Run a command against the engine, then publish the new snapshot
    fn command<F>(&self, action: &str, apply: F) -> Result<CountdownSnapshot, AppError>
    where
        F: FnOnce(&mut CountdownEngine) -> Result<(), AppError>,
    {
        let mut engine = self.engine()?;
        apply(&mut engine)?;
        let snapshot = engine.snapshot();
        drop(engine); // Release the lock before touching audio

        self.record_action(action);
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    fn publish(&self, snapshot: CountdownSnapshot) {
        if let Err(e) = self.countdown_tx.send(snapshot) {
            warn!("Failed to send countdown update: {}", e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Unlock audio from a user-initiated command
    pub fn unlock_audio(&self) -> bool {
        self.record_action("unlock-audio");
        self.audio.initialize()
    }

    /// Start a countdown of `seconds` with the current settings
    pub fn start_countdown(
        &self,
        seconds: i64,
        preset_label: Option<String>,
    ) -> Result<CountdownSnapshot, AppError> {
        let settings = self.settings.get();
        let snapshot = self.command("start", |engine| {
            engine.start(seconds, settings.clone())?;
            engine.set_preset_label(preset_label);
            Ok(())
        })?;

        info!("Countdown started for {}", snapshot.display());
        self.settings.record_last_used(snapshot.total);
        self.begin_feedback(&settings);
        Ok(snapshot)
    }

    pub fn pause(&self) -> Result<CountdownSnapshot, AppError> {
        let snapshot = self.command("pause", |engine| Ok(engine.pause()?))?;
        info!("Countdown paused at {}", snapshot.display());
        self.halt_feedback();
        Ok(snapshot)
    }

    pub fn resume(&self) -> Result<CountdownSnapshot, AppError> {
        let snapshot = self.command("resume", |engine| Ok(engine.resume()?))?;
        info!("Countdown resumed at {}", snapshot.display());
        self.begin_feedback(&self.current_settings()?);
        Ok(snapshot)
    }

    pub fn restart(&self) -> Result<CountdownSnapshot, AppError> {
        let snapshot = self.command("restart", |engine| Ok(engine.restart()?))?;
        info!("Countdown restarted for {}", snapshot.display());
        self.begin_feedback(&self.current_settings()?);
        Ok(snapshot)
    }

    /// Primary button: pause, resume or run again depending on the phase
    pub fn toggle(&self) -> Result<CountdownSnapshot, AppError> {
        let phase = self.engine()?.phase();
        match phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Finished | Phase::Idle => self.restart(),
        }
    }

    pub fn reset(&self) -> Result<CountdownSnapshot, AppError> {
        let snapshot = self.command("reset", |engine| Ok(engine.reset()?))?;
        info!("Countdown reset to {}", snapshot.display());
        self.halt_feedback();
        Ok(snapshot)
    }

    /// Leave the countdown entirely
    pub fn cancel(&self) -> Result<CountdownSnapshot, AppError> {
        let snapshot = self.command("cancel", |engine| {
            engine.cancel();
            Ok(())
        })?;
        info!("Countdown cancelled");
        self.halt_feedback();
        Ok(snapshot)
    }

    fn current_settings(&self) -> Result<Settings, AppError> {
        Ok(self.engine()?.settings().clone())
    }

    fn begin_feedback(&self, settings: &Settings) {
        self.audio.set_countdown_active(true);
        if settings.sounds_enabled {
            self.audio.initialize();
            self.audio.start_background_music();
        }
    }

    fn halt_feedback(&self) {
        self.audio.set_countdown_active(false);
        self.audio.stop_background_music(false);
    }

    /// Apply one second of countdown. Called by the ticker task once per
    /// second while running.
    pub fn handle_tick(&self) -> Result<TickOutcome, AppError> {
        let mut engine = self.engine()?;
        let outcome = engine.tick();
        let snapshot = engine.snapshot();
        let settings = engine.settings().clone();
        let preset_label = engine.preset_label().map(str::to_string);
        drop(engine);

        match outcome {
            TickOutcome::Ignored => return Ok(outcome),
            TickOutcome::Ticked { remaining } => {
                debug!("Tick: {}s remaining", remaining);
                if settings.sounds_enabled {
                    self.audio.play_tick();
                } else {
                    self.audio.play_keep_alive();
                }
            }
            TickOutcome::Finished => {
                self.complete(snapshot.total, preset_label, &settings);
            }
        }

        self.publish(snapshot);
        Ok(outcome)
    }

    /// Completion side effects, each gated by its own setting
    fn complete(&self, total: i64, preset_label: Option<String>, settings: &Settings) {
        info!("Countdown finished after {}", crate::time::format(total));

        if settings.sounds_enabled {
            self.audio.play_finish();
        }
        if settings.vibration_enabled {
            self.platform.haptics.vibrate(&FINISH_VIBRATION);
        }
        if settings.notifications_enabled && self.platform.notifications_permitted {
            self.platform.notifier.notify(FINISH_TITLE, FINISH_BODY);
        }
        self.audio.set_countdown_active(false);
        self.audio.stop_background_music(true);

        let label = preset_label.or_else(|| presets::label_for(total).map(str::to_string));
        self.history
            .append(HistoryEntry::completed(total, Utc::now(), label));
    }

    /// Get current countdown snapshot
    pub fn snapshot(&self) -> Result<CountdownSnapshot, AppError> {
        Ok(self.engine()?.snapshot())
    }

    pub fn status(&self) -> Result<CountdownStatus, AppError> {
        let snapshot = self.snapshot()?;
        let volume = self.volume.get();
        Ok(CountdownStatus {
            phase: snapshot.phase,
            remaining: snapshot.remaining,
            total: snapshot.total,
            display: snapshot.display(),
            progress: snapshot.progress(),
            audio_ready: self.audio.is_initialized(),
            audio_lost: self.audio.audio_lost(),
            music_playing: self.audio.music_playing(),
            music_should_play: self.audio.should_be_playing(),
            volume: volume.volume(),
            muted: volume.is_muted(),
            settings: self.settings.get(),
        })
    }

    /// Replace the stored settings. A running countdown keeps the settings
    /// it started with.
    pub fn update_settings(&self, settings: Settings) -> Settings {
        self.record_action("settings");
        self.settings.replace(settings)
    }

    pub fn set_volume(&self, percent: u8) -> VolumeControl {
        let control = self.volume.update(|c| c.set_volume(percent));
        self.audio.set_volume(control.volume());
        control
    }

    pub fn toggle_mute(&self) -> VolumeControl {
        let control = self.volume.update(VolumeControl::toggle_mute);
        self.audio.set_volume(control.volume());
        control
    }

    /// User-requested recovery after suspected audio loss
    pub fn reactivate_audio(&self) {
        self.record_action("reactivate-audio");
        self.audio.reactivate();
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Stop the countdown and release all audio resources
    pub fn shutdown(&self) {
        if let Ok(mut engine) = self.countdown.lock() {
            engine.cancel();
        }
        self.audio.dispose();
        info!("Countdown state shut down");
    }
}

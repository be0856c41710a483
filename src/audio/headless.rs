//! Headless audio backend
//!
//! Keeps full playback state for every voice without touching an output
//! device, and logs what would have been heard. Each voice exposes a
//! [`VoiceProbe`] so state can be inspected and host misbehaviour (refused
//! playback, pauses that silently do nothing) can be injected.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};

use tracing::{debug, trace};

use super::voice::{AudioBackend, AudioError, ToneSource, Voice};

/// Observable state of one headless voice
#[derive(Debug, Clone)]
pub struct ProbeState {
    pub source: String,
    pub attached: bool,
    pub paused: bool,
    pub looping: bool,
    pub volume: f32,
    pub play_attempts: u32,
    pub plays: u32,
    pub pause_calls: u32,
    pub reloads: u32,
    pub fail_play: bool,
    pub ghost_pauses: u32,
}

/// Shared handle onto a voice's state
#[derive(Debug, Clone)]
pub struct VoiceProbe(Arc<Mutex<ProbeState>>);

impl VoiceProbe {
    fn new(source: String) -> Self {
        Self(Arc::new(Mutex::new(ProbeState {
            source,
            attached: true,
            paused: true,
            looping: false,
            volume: 1.0,
            play_attempts: 0,
            plays: 0,
            pause_calls: 0,
            reloads: 0,
            fail_play: false,
            ghost_pauses: 0,
        })))
    }

    fn lock(&self) -> MutexGuard<'_, ProbeState> {
        // Probe state is plain data; a poisoned lock still holds usable values
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> ProbeState {
        self.lock().clone()
    }

    pub fn source(&self) -> String {
        self.lock().source.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub fn plays(&self) -> u32 {
        self.lock().plays
    }

    pub fn reloads(&self) -> u32 {
        self.lock().reloads
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    /// Make every future `play` call fail
    pub fn set_fail_play(&self, fail: bool) {
        self.lock().fail_play = fail;
    }

    /// Ignore the next `count` pause calls, leaving the voice playing
    pub fn ignore_next_pauses(&self, count: u32) {
        self.lock().ghost_pauses = count;
    }
}

/// A voice that only records what it was asked to do
pub struct HeadlessVoice {
    probe: VoiceProbe,
}

impl Voice for HeadlessVoice {
    fn rewind(&mut self) {
        trace!("rewind {}", self.probe.lock().source);
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let mut state = self.probe.lock();
        state.play_attempts += 1;
        if !state.attached {
            return Err(AudioError::Detached);
        }
        if state.fail_play {
            return Err(AudioError::PlaybackRefused(format!(
                "{} rejected play",
                state.source
            )));
        }
        state.paused = false;
        state.plays += 1;
        trace!("play {} at volume {:.2}", state.source, state.volume);
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.probe.lock();
        state.pause_calls += 1;
        if state.ghost_pauses > 0 {
            state.ghost_pauses -= 1;
            trace!("pause of {} silently ignored", state.source);
            return;
        }
        state.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.probe.lock().paused
    }

    fn set_volume(&mut self, volume: f32) {
        self.probe.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        self.probe.lock().volume
    }

    fn set_looping(&mut self, looping: bool) {
        self.probe.lock().looping = looping;
    }

    fn reload(&mut self) {
        let mut state = self.probe.lock();
        state.attached = true;
        state.paused = true;
        state.reloads += 1;
    }

    fn detach(&mut self) {
        let mut state = self.probe.lock();
        state.attached = false;
        state.paused = true;
    }
}

/// Backend producing [`HeadlessVoice`]s
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    probes: Mutex<Vec<VoiceProbe>>,
    unavailable: AtomicBool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose device cannot be opened
    pub fn unavailable() -> Self {
        let backend = Self::default();
        backend.set_unavailable(true);
        backend
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Probes for every voice created so far, in creation order
    pub fn probes(&self) -> Vec<VoiceProbe> {
        self.probes
            .lock()
            .map(|probes| probes.clone())
            .unwrap_or_default()
    }

    /// Probes whose source label equals `label`
    pub fn probes_for(&self, label: &str) -> Vec<VoiceProbe> {
        self.probes()
            .into_iter()
            .filter(|probe| probe.source() == label)
            .collect()
    }
}

impl AudioBackend for HeadlessBackend {
    fn create_voice(&self, source: &ToneSource) -> Result<Box<dyn Voice>, AudioError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AudioError::Unavailable("no output device".to_string()));
        }

        let probe = VoiceProbe::new(source.label());
        debug!("Created headless voice for {}", source.label());
        if let Ok(mut probes) = self.probes.lock() {
            probes.push(probe.clone());
        }
        Ok(Box::new(HeadlessVoice { probe }))
    }
}

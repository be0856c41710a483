//! Round-robin pool of interchangeable tone voices

use tracing::{debug, warn};

use super::voice::{AudioBackend, AudioError, ToneSource, Voice};

/// Result of one redundant play request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayReport {
    pub attempted: usize,
    pub succeeded: usize,
}

impl PlayReport {
    /// One accepted instance is enough
    pub fn any_succeeded(&self) -> bool {
        self.succeeded > 0
    }
}

/// Fixed-size set of voices sharing one source
pub struct TonePool {
    kind: &'static str,
    voices: Vec<Box<dyn Voice>>,
    cursor: usize,
}

impl TonePool {
    /// Create `size` voices for `source`, all at `volume`
    pub fn build(
        backend: &dyn AudioBackend,
        kind: &'static str,
        source: &ToneSource,
        size: usize,
        volume: f32,
    ) -> Result<Self, AudioError> {
        let mut voices = Vec::with_capacity(size);
        for _ in 0..size {
            let mut voice = backend.create_voice(source)?;
            voice.set_volume(volume);
            voice.reload();
            voices.push(voice);
        }
        debug!("Built {} pool with {} voices", kind, size);
        Ok(Self {
            kind,
            voices,
            cursor: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rewind and play `count` voices starting at the cursor, then advance
    /// the cursor by one whatever the outcome. Individual failures are logged
    /// and swallowed.
    pub fn play_redundant(&mut self, count: usize) -> PlayReport {
        let mut report = PlayReport::default();
        if self.voices.is_empty() {
            return report;
        }

        let len = self.voices.len();
        for offset in 0..count.min(len) {
            let index = (self.cursor + offset) % len;
            let voice = &mut self.voices[index];
            report.attempted += 1;
            voice.rewind();
            match voice.play() {
                Ok(()) => report.succeeded += 1,
                Err(e) => warn!("{} voice {} failed: {}", self.kind, index, e),
            }
        }

        self.cursor = (self.cursor + 1) % len;

        if !report.any_succeeded() {
            warn!("All {} {} voices failed", report.attempted, self.kind);
        }
        report
    }

    /// Force every voice to reload its source
    pub fn reload_all(&mut self) {
        for voice in &mut self.voices {
            voice.reload();
        }
    }

    /// Stop and detach every voice, leaving the pool empty
    pub fn release(&mut self) {
        for voice in &mut self.voices {
            voice.pause();
            voice.detach();
        }
        self.voices.clear();
        self.cursor = 0;
    }
}

//! Platform playback handles
//!
//! A [`Voice`] is one playable instance of a sound, shaped after the media
//! elements of the hosts this runs on: play can be refused, pause is not
//! guaranteed to take effect, and the source can be detached and reloaded.

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;

/// Errors raised by an audio backend or one of its voices.
///
/// These never escape [`super::AudioManager`]; they are logged and folded
/// into the `audio_lost` signal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio backend unavailable: {0}")]
    Unavailable(String),

    #[error("playback refused: {0}")]
    PlaybackRefused(String),

    #[error("voice has no source attached")]
    Detached,
}

/// What a voice plays
#[derive(Debug, Clone, PartialEq)]
pub enum ToneSource {
    /// In-memory WAV rendered at startup
    Rendered { name: &'static str, wav: Arc<Vec<u8>> },
    /// Long-form track on disk
    Track(PathBuf),
    /// Placeholder for a channel with nothing configured
    Silence,
}

impl ToneSource {
    pub fn label(&self) -> String {
        match self {
            ToneSource::Rendered { name, .. } => (*name).to_string(),
            ToneSource::Track(path) => path.display().to_string(),
            ToneSource::Silence => "silence".to_string(),
        }
    }
}

/// One playable instance
pub trait Voice: Send {
    /// Seek back to the start
    fn rewind(&mut self);
    /// Begin playback from the current position
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Volume in `0.0..=1.0`
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    fn set_looping(&mut self, looping: bool);
    /// Re-attach the source and reload it
    fn reload(&mut self);
    /// Drop the source so the host releases its decoder
    fn detach(&mut self);
}

/// Factory for voices
pub trait AudioBackend: Send + Sync {
    fn create_voice(&self, source: &ToneSource) -> Result<Box<dyn Voice>, AudioError>;
}

//! Audio output through the default device
//!
//! Each voice owns at most one rodio [`Sink`]. Rewinding drops the sink, so
//! the next `play` decodes the source again from the start; pausing keeps it
//! so playback resumes where it stopped.

use std::{
    fs::File,
    io::{BufReader, Cursor},
    sync::{mpsc, Arc, Mutex},
    thread,
};

use rodio::{source::Zero, Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, info, trace};

use super::{
    tone::SAMPLE_RATE,
    voice::{AudioBackend, AudioError, ToneSource, Voice},
};

type BoxedSource = Box<dyn Source<Item = f32> + Send>;

/// Rendered WAV bytes shared between voices
struct SharedWav(Arc<Vec<u8>>);

impl AsRef<[u8]> for SharedWav {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// Decode `source` into a fresh playable stream
fn open_source(source: &ToneSource) -> Result<BoxedSource, AudioError> {
    match source {
        ToneSource::Rendered { name, wav } => {
            let decoder = Decoder::new(Cursor::new(SharedWav(wav.clone())))
                .map_err(|e| AudioError::PlaybackRefused(format!("{}: {}", name, e)))?;
            Ok(Box::new(decoder.convert_samples::<f32>()))
        }
        ToneSource::Track(path) => {
            let file = File::open(path).map_err(|e| {
                AudioError::PlaybackRefused(format!("{}: {}", path.display(), e))
            })?;
            let decoder = Decoder::new(BufReader::new(file)).map_err(|e| {
                AudioError::PlaybackRefused(format!("{}: {}", path.display(), e))
            })?;
            Ok(Box::new(decoder.convert_samples::<f32>()))
        }
        ToneSource::Silence => Ok(Box::new(Zero::<f32>::new(1, SAMPLE_RATE))),
    }
}

/// Backend playing through the system's default output device
pub struct RodioBackend {
    handle: OutputStreamHandle,
    /// Dropping the sender lets the output thread close the stream
    _shutdown: Mutex<mpsc::Sender<()>>,
}

impl RodioBackend {
    /// Open the default output device. The stream lives on its own thread
    /// because it cannot move between threads.
    pub fn open() -> Result<Self, AudioError> {
        let (handle_tx, handle_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((_stream, handle)) => {
                    if handle_tx.send(Ok(handle)).is_ok() {
                        // Blocks until the backend is dropped
                        let _ = shutdown_rx.recv();
                    }
                    debug!("Audio output stream closed");
                }
                Err(e) => {
                    let _ = handle_tx.send(Err(AudioError::Unavailable(e.to_string())));
                }
            })
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;

        let handle = handle_rx
            .recv()
            .map_err(|_| AudioError::Unavailable("audio output thread exited".to_string()))??;

        info!("Opened default audio output device");
        Ok(Self {
            handle,
            _shutdown: Mutex::new(shutdown_tx),
        })
    }
}

impl AudioBackend for RodioBackend {
    fn create_voice(&self, source: &ToneSource) -> Result<Box<dyn Voice>, AudioError> {
        Ok(Box::new(RodioVoice {
            handle: self.handle.clone(),
            source: source.clone(),
            sink: None,
            volume: 1.0,
            looping: false,
            attached: true,
        }))
    }
}

struct RodioVoice {
    handle: OutputStreamHandle,
    source: ToneSource,
    sink: Option<Sink>,
    volume: f32,
    looping: bool,
    attached: bool,
}

impl RodioVoice {
    fn start_sink(&mut self) -> Result<(), AudioError> {
        let source = open_source(&self.source)?;
        let sink = Sink::try_new(&self.handle)
            .map_err(|e| AudioError::PlaybackRefused(e.to_string()))?;

        sink.set_volume(self.volume);
        if self.looping && !matches!(self.source, ToneSource::Silence) {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        sink.play();

        trace!("Playing {}", self.source.label());
        self.sink = Some(sink);
        Ok(())
    }
}

impl Voice for RodioVoice {
    fn rewind(&mut self) {
        // Dropping a sink stops its sources
        self.sink = None;
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if !self.attached {
            return Err(AudioError::Detached);
        }

        // Resume a paused sink that still has something queued
        if let Some(sink) = self.sink.as_ref().filter(|sink| !sink.empty()) {
            sink.play();
            return Ok(());
        }
        self.start_sink()
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn is_paused(&self) -> bool {
        self.sink
            .as_ref()
            .map_or(true, |sink| sink.is_paused() || sink.empty())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_looping(&mut self, looping: bool) {
        // Applies from the next play
        self.looping = looping;
    }

    fn reload(&mut self) {
        self.attached = true;
        self.sink = None;
    }

    fn detach(&mut self) {
        self.attached = false;
        self.sink = None;
    }
}

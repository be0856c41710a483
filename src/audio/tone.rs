//! Pre-rendered feedback tones
//!
//! Tones are synthesized once as 16-bit mono PCM WAV so every pooled voice can
//! share the same immutable buffer.

use std::f32::consts::PI;

pub const SAMPLE_RATE: u32 = 44_100;
const WAV_HEADER_LEN: usize = 44;

/// Parameters of a decaying sine tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub duration_secs: f32,
    pub amplitude: f32,
}

impl ToneSpec {
    /// Short per-second tick
    pub const TICK: ToneSpec = ToneSpec {
        frequency_hz: 1000.0,
        duration_secs: 0.15,
        amplitude: 0.2,
    };

    /// Longer, louder completion tone
    pub const FINISH: ToneSpec = ToneSpec {
        frequency_hz: 800.0,
        duration_secs: 1.5,
        amplitude: 0.5,
    };

    /// Near-silent blip that keeps the output device awake
    pub const KEEP_ALIVE: ToneSpec = ToneSpec {
        frequency_hz: 1000.0,
        duration_secs: 0.01,
        amplitude: 0.001,
    };

    pub fn sample_count(&self) -> usize {
        (SAMPLE_RATE as f32 * self.duration_secs) as usize
    }

    /// Render PCM samples. The `e^(-2t)` envelope avoids clicks at the edges.
    pub fn render_samples(&self) -> Vec<i16> {
        (0..self.sample_count())
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let sample = (2.0 * PI * self.frequency_hz * t).sin()
                    * (-t * 2.0).exp()
                    * self.amplitude
                    * i16::MAX as f32;
                sample.clamp(-(i16::MAX as f32), i16::MAX as f32) as i16
            })
            .collect()
    }

    /// Render a complete WAV file
    pub fn render_wav(&self) -> Vec<u8> {
        encode_wav(&self.render_samples())
    }
}

/// Wrap mono 16-bit samples in a RIFF/WAVE container
pub fn encode_wav(samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // byte rate
    out.extend_from_slice(&2u16.to_le_bytes()); // block align
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

//! Audio feedback module
//!
//! Tick/finish tones and background music, kept alive on hosts that suspend
//! or silently drop audio. Redundant pooled playback masks single failures,
//! a staleness poll flags suspected silence, and a watchdog reconciles the
//! desired music state with what the host actually does.

#[cfg(feature = "audio-device")]
pub mod device;
pub mod headless;
pub mod manager;
pub mod pool;
pub mod profile;
pub mod tone;
pub mod voice;

// Re-export main types
#[cfg(feature = "audio-device")]
pub use device::RodioBackend;
pub use headless::{HeadlessBackend, VoiceProbe};
pub use manager::AudioManager;
pub use profile::{AudioTuning, PlatformProfile};
pub use tone::ToneSpec;
pub use voice::{AudioBackend, AudioError, ToneSource, Voice};

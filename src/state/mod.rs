//! State management module
//!
//! This module contains the countdown engine, the persisted collaborators
//! it reads from and writes to, and the shared application state.

pub mod app_state;
pub mod countdown;
pub mod history;
pub mod settings;
pub mod volume;

// Re-export main types
pub use app_state::{AppState, CountdownStatus, Platform};
pub use countdown::{CountdownEngine, CountdownError, CountdownSnapshot, Phase, TickOutcome};
pub use history::{HistoryEntry, HistoryStore, HISTORY_LIMIT};
pub use settings::{Settings, SettingsStore};
pub use volume::{VolumeControl, VolumeStore};

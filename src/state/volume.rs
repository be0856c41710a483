//! Background music volume with mute toggle

use std::sync::{Arc, Mutex};

use crate::services::storage::{JsonStore, KEY_MUSIC_VOLUME};

pub const DEFAULT_VOLUME: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeControl {
    volume: u8,
    last_volume: u8,
    muted: bool,
}

impl VolumeControl {
    pub fn new(volume: u8) -> Self {
        let volume = volume.min(100);
        Self {
            volume,
            last_volume: if volume > 0 { volume } else { DEFAULT_VOLUME },
            muted: volume == 0,
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn last_volume(&self) -> u8 {
        self.last_volume
    }

    /// Clamp to 0..=100; zero counts as muted
    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.volume = volume;
        self.muted = volume == 0;
        if volume > 0 {
            self.last_volume = volume;
        }
    }

    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.restore();
        } else {
            self.last_volume = self.volume.max(1);
            self.volume = 0;
            self.muted = true;
        }
    }

    pub fn restore(&mut self) {
        self.volume = self.last_volume;
        self.muted = false;
    }
}

impl Default for VolumeControl {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

/// Persisted volume
#[derive(Debug)]
pub struct VolumeStore {
    store: Arc<JsonStore>,
    control: Mutex<VolumeControl>,
}

impl VolumeStore {
    /// Load the saved volume, falling back to `initial`
    pub fn load(store: Arc<JsonStore>, initial: u8) -> Self {
        let volume = store
            .load::<u8>(KEY_MUSIC_VOLUME)
            .filter(|v| *v <= 100)
            .unwrap_or(initial);
        Self {
            store,
            control: Mutex::new(VolumeControl::new(volume)),
        }
    }

    pub fn get(&self) -> VolumeControl {
        *self
            .control
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply `change` and persist the new volume
    pub fn update<F>(&self, change: F) -> VolumeControl
    where
        F: FnOnce(&mut VolumeControl),
    {
        let mut control = self
            .control
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        change(&mut control);
        let updated = *control;
        drop(control);

        self.store.save(KEY_MUSIC_VOLUME, &updated.volume());
        updated
    }
}

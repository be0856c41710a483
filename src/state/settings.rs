//! User preferences and their store

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::services::storage::{JsonStore, KEY_SETTINGS};

/// Preferences injected into each countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub sounds_enabled: bool,
    pub vibration_enabled: bool,
    pub notifications_enabled: bool,
    /// Seconds of the most recently started countdown
    pub last_used_time: i64,
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sounds_enabled: true,
            vibration_enabled: true,
            notifications_enabled: true,
            last_used_time: 30,
            theme: "dark".to_string(),
        }
    }
}

/// Settings read once at startup and written on every change
#[derive(Debug)]
pub struct SettingsStore {
    store: Arc<JsonStore>,
    current: Mutex<Settings>,
}

impl SettingsStore {
    pub fn load(store: Arc<JsonStore>) -> Self {
        let current = store.load::<Settings>(KEY_SETTINGS).unwrap_or_default();
        info!(
            "Settings loaded: sounds={}, vibration={}, notifications={}",
            current.sounds_enabled, current.vibration_enabled, current.notifications_enabled
        );
        Self {
            store,
            current: Mutex::new(current),
        }
    }

    pub fn get(&self) -> Settings {
        self.current
            .lock()
            .map(|settings| settings.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Apply `updater` and persist the result
    pub fn update<F>(&self, updater: F) -> Settings
    where
        F: FnOnce(&mut Settings),
    {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        updater(&mut current);
        let updated = current.clone();
        drop(current);

        self.store.save(KEY_SETTINGS, &updated);
        updated
    }

    pub fn replace(&self, settings: Settings) -> Settings {
        self.update(|current| *current = settings)
    }

    pub fn record_last_used(&self, seconds: i64) {
        self.update(|current| current.last_used_time = seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_nothing_saved() {
        let store = SettingsStore::load(Arc::new(JsonStore::in_memory()));
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn test_updates_survive_reload() {
        let dir = TempDir::new().unwrap();
        let json = Arc::new(JsonStore::new(dir.path()));

        let store = SettingsStore::load(json.clone());
        store.update(|s| s.sounds_enabled = false);
        store.record_last_used(90);

        let reloaded = SettingsStore::load(json);
        let settings = reloaded.get();
        assert!(!settings.sounds_enabled);
        assert_eq!(settings.last_used_time, 90);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"soundsEnabled": false}"#).unwrap();
        assert!(!settings.sounds_enabled);
        assert!(settings.vibration_enabled);
        assert_eq!(settings.last_used_time, 30);
    }
}

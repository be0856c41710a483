//! JSON key-value persistence
//!
//! Each key is one JSON file in the data directory. Failures never reach the
//! countdown: a failed read falls back to defaults and a failed write drops
//! the store into memory-only mode for the rest of the session.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::StorageError;

pub const KEY_SETTINGS: &str = "settings";
pub const KEY_HISTORY: &str = "history";
pub const KEY_MUSIC_VOLUME: &str = "music-volume";

#[derive(Debug)]
pub struct JsonStore {
    dir: Option<PathBuf>,
    degraded: AtomicBool,
}

impl JsonStore {
    /// Store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            degraded: AtomicBool::new(false),
        }
    }

    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            degraded: AtomicBool::new(false),
        }
    }

    /// Default location under the user's data directory
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("counterdown"))
    }

    pub fn is_persistent(&self) -> bool {
        self.dir.is_some() && !self.degraded.load(Ordering::SeqCst)
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(format!("{}.json", key)))
    }

    /// Read `key`, or `None` if it is missing or unreadable
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Error reading {} from {}: {}", key, path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring malformed {} in {}: {}", key, path.display(), e);
                None
            }
        }
    }

    /// Persist `value` under `key`. Returns false when the value only lives
    /// in memory from now on.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> bool {
        if !self.is_persistent() {
            return false;
        }

        match self.try_save(key, value) {
            Ok(()) => {
                debug!("Saved {}", key);
                true
            }
            Err(e) => {
                if !self.degraded.swap(true, Ordering::SeqCst) {
                    warn!("{}; continuing without persistence for this session", e);
                }
                false
            }
        }
    }

    fn try_save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let (Some(dir), Some(path)) = (self.dir.as_ref(), self.path_for(key)) else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(value)?;
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;

        // Write-then-rename so a crash never leaves half a file behind
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("nested"));

        assert_eq!(store.load::<u8>(KEY_MUSIC_VOLUME), None);
        assert!(store.save(KEY_MUSIC_VOLUME, &42u8));
        assert_eq!(store.load::<u8>(KEY_MUSIC_VOLUME), Some(42));
    }

    #[test]
    fn test_malformed_file_reads_as_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("settings.json"), "{not json").unwrap();
        let store = JsonStore::new(dir.path());

        assert_eq!(store.load::<serde_json::Value>(KEY_SETTINGS), None);
    }

    #[test]
    fn test_write_failure_degrades_to_memory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        // A regular file where the directory should be
        let store = JsonStore::new(&blocker);
        assert!(!store.save(KEY_HISTORY, &vec![1, 2, 3]));
        assert!(!store.is_persistent());
        assert!(!store.save(KEY_HISTORY, &vec![1]));
    }

    #[test]
    fn test_in_memory_store() {
        let store = JsonStore::in_memory();
        assert!(!store.is_persistent());
        assert!(!store.save(KEY_SETTINGS, &true));
        assert_eq!(store.load::<bool>(KEY_SETTINGS), None);
    }
}

//! Completed-countdown log, most recent first

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::storage::{JsonStore, KEY_HISTORY};

pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub duration: i64,
    pub completed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_label: Option<String>,
}

impl HistoryEntry {
    /// Entry for a countdown that completed at `completed_at`
    pub fn completed(duration: i64, completed_at: DateTime<Utc>, preset_label: Option<String>) -> Self {
        Self {
            id: completed_at.timestamp_millis().to_string(),
            duration,
            completed_at,
            preset_label,
        }
    }
}

#[derive(Debug)]
pub struct HistoryStore {
    store: Arc<JsonStore>,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub fn load(store: Arc<JsonStore>) -> Self {
        let mut entries = store.load::<Vec<HistoryEntry>>(KEY_HISTORY).unwrap_or_default();
        entries.truncate(HISTORY_LIMIT);
        Self {
            store,
            entries: Mutex::new(entries),
        }
    }

    /// Put `entry` first, dropping anything past the limit
    pub fn append(&self, entry: HistoryEntry) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(0, entry);
        entries.truncate(HISTORY_LIMIT);
        let snapshot = entries.clone();
        drop(entries);

        self.store.save(KEY_HISTORY, &snapshot);
    }

    pub fn list(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_capped_most_recent_first() {
        let store = HistoryStore::load(Arc::new(JsonStore::in_memory()));
        let base = Utc::now();
        for i in 0..12 {
            store.append(HistoryEntry::completed(i + 1, base + Duration::seconds(i), None));
        }

        let entries = store.list();
        assert_eq!(entries.len(), HISTORY_LIMIT);
        assert_eq!(entries[0].duration, 12);
        assert_eq!(entries[9].duration, 3);
    }

    #[test]
    fn test_history_persists() {
        let dir = TempDir::new().unwrap();
        let json = Arc::new(JsonStore::new(dir.path()));
        let completed_at = Utc::now();

        HistoryStore::load(json.clone()).append(HistoryEntry::completed(
            60,
            completed_at,
            Some("Pomodoro".to_string()),
        ));

        let entries = HistoryStore::load(json).list();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].preset_label.as_deref(), Some("Pomodoro"));
        assert_eq!(entries[0].id, completed_at.timestamp_millis().to_string());
    }
}

//! Error types shared across the daemon

use std::path::PathBuf;

use thiserror::Error;

use crate::state::CountdownError;

/// Errors surfaced to the command surface
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Countdown(#[from] CountdownError),

    #[error("Failed to lock {0}")]
    LockPoisoned(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Persistence failures. Caught at the store boundary and logged; the daemon
/// keeps running in memory.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

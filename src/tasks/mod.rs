//! Background tasks module
//!
//! This module contains the tasks that run alongside the HTTP server: the
//! countdown ticker and the audio supervisors spawned by the audio manager.

pub mod audio_loss;
pub mod audio_watchdog;
pub mod countdown_ticker;

// Re-export main functions
pub use audio_loss::audio_loss_task;
pub use audio_watchdog::audio_watchdog_task;
pub use countdown_ticker::countdown_ticker_task;

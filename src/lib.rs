//! Counterdown - A countdown timer with resilient audio feedback
//!
//! This library provides the countdown engine, duration parsing and
//! formatting, an audio manager that keeps tick and finish sounds alive on
//! hosts that silently drop audio, and the HTTP command surface around them.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod presets;
pub mod services;
pub mod state;
pub mod tasks;
pub mod time;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
pub use utils::signals::shutdown_signal;

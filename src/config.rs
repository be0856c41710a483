//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::{
    audio::{PlatformProfile, ToneSource},
    services::JsonStore,
    state::volume::DEFAULT_VOLUME,
};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "counterdown")]
#[command(about = "A countdown timer with resilient audio feedback, driven over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20555")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory for settings, history and volume (defaults to the user data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Use the touch audio profile (smaller pool, hard music stops)
    #[arg(long)]
    pub touch: bool,

    /// Background music track, looped while a countdown runs
    #[arg(long)]
    pub music: Option<PathBuf>,

    /// Initial music volume in percent, used when none has been saved
    #[arg(long, default_value_t = DEFAULT_VOLUME, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub volume: u8,

    /// Never open an audio device; playback is only logged
    #[arg(long)]
    pub headless: bool,

    /// Never show system notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn profile(&self) -> PlatformProfile {
        if self.touch {
            PlatformProfile::Touch
        } else {
            PlatformProfile::Desktop
        }
    }

    pub fn music_source(&self) -> ToneSource {
        match &self.music {
            Some(path) => ToneSource::Track(path.clone()),
            None => ToneSource::Silence,
        }
    }

    /// Persistence location; memory-only when no data dir can be found
    pub fn store(&self) -> JsonStore {
        match self.data_dir.clone().or_else(JsonStore::default_dir) {
            Some(dir) => JsonStore::new(dir),
            None => JsonStore::in_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["counterdown"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20555");
        assert_eq!(config.volume, DEFAULT_VOLUME);
        assert_eq!(config.profile(), PlatformProfile::Desktop);
        assert_eq!(config.music_source(), ToneSource::Silence);
        assert_eq!(config.log_level(), "info");
        assert!(!config.headless);
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "counterdown",
            "--touch",
            "--music",
            "/tmp/loop.ogg",
            "--volume",
            "80",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.profile(), PlatformProfile::Touch);
        assert_eq!(
            config.music_source(),
            ToneSource::Track(PathBuf::from("/tmp/loop.ogg"))
        );
        assert_eq!(config.volume, 80);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_volume_out_of_range_rejected() {
        assert!(Config::try_parse_from(["counterdown", "--volume", "101"]).is_err());
    }

    #[test]
    fn test_data_dir_store_is_persistent() {
        let dir = tempfile::TempDir::new().unwrap();
        let config =
            Config::try_parse_from(["counterdown", "--data-dir", dir.path().to_str().unwrap()])
                .unwrap();
        let store = config.store();
        assert!(store.is_persistent());
        assert_eq!(store.dir(), Some(dir.path()));
    }
}

//! Counterdown - A countdown timer with resilient audio feedback
//!
//! This is the main entry point for the counterdown server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use counterdown::{
    api::create_router,
    audio::{AudioBackend, AudioManager, HeadlessBackend},
    config::Config,
    services::{check_notifier_available, DesktopNotifier, LogHaptics},
    state::{AppState, Platform},
    tasks::countdown_ticker_task,
    utils::shutdown_signal,
};

/// Play through the default output device, or log playback when there is
/// none (or `--headless` was given)
fn open_audio_backend(config: &Config) -> Arc<dyn AudioBackend> {
    if !config.headless {
        #[cfg(feature = "audio-device")]
        match counterdown::audio::RodioBackend::open() {
            Ok(backend) => return Arc::new(backend),
            Err(e) => warn!("Audio device unavailable, falling back to headless playback: {}", e),
        }
    }

    info!("Using headless audio backend");
    Arc::new(HeadlessBackend::new())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("counterdown={},tower_http=info", config.log_level()))
        .init();

    info!("Starting counterdown server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, profile={:?}, music={}",
        config.host,
        config.port,
        config.profile(),
        config.music_source().label()
    );

    let store = Arc::new(config.store());
    match store.dir() {
        Some(dir) => info!("Persisting to {}", dir.display()),
        None => warn!("No data directory available, settings and history are memory-only"),
    }

    let notifications_permitted = !config.no_notify && check_notifier_available().await;

    let audio = AudioManager::new(
        open_audio_backend(&config),
        config.profile(),
        config.music_source(),
        config.volume,
    );

    let platform = Platform {
        haptics: Arc::new(LogHaptics),
        notifier: Arc::new(DesktopNotifier::new()),
        notifications_permitted,
    };

    // Create application state
    let state = Arc::new(AppState::new(
        audio,
        store,
        platform,
        config.volume,
        config.port,
        config.host.clone(),
    ));

    // Start the countdown ticker background task
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_ticker_task(ticker_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /audio/unlock       - Unlock audio playback");
    info!("  POST /countdown/start    - Start a countdown (seconds, time, keypad or preset)");
    info!("  POST /countdown/toggle   - Pause, resume or run again");
    info!("  POST /countdown/reset    - Back to the full duration");
    info!("  POST /countdown/cancel   - Leave the countdown");
    info!("  GET  /status             - Current countdown and audio status");
    info!("  GET  /presets            - Preset durations");
    info!("  GET  /history            - Recently completed countdowns");
    info!("  GET  /health             - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}

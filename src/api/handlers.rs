//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    response::Json,
};
use tracing::info;

use crate::{
    error::AppError,
    presets::{Preset, DEFAULT_PRESETS},
    state::{AppState, CountdownSnapshot, HistoryEntry, Settings},
};
use super::responses::{
    ApiResponse, AudioResponse, HealthResponse, StartRequest, StatusResponse, VolumeRequest,
    VolumeResponse,
};

type CommandResult = Result<Json<ApiResponse>, AppError>;

fn audio_response(state: &AppState, ready: bool) -> Json<AudioResponse> {
    Json(AudioResponse {
        ready,
        audio_lost: state.audio.audio_lost(),
        music_playing: state.audio.music_playing(),
    })
}

fn reply(message: &str, snapshot: CountdownSnapshot) -> CommandResult {
    Ok(Json(ApiResponse::ok(message, snapshot)))
}

/// Handle POST /audio/unlock - Build audio resources from a user gesture
pub async fn unlock_audio_handler(State(state): State<Arc<AppState>>) -> Json<AudioResponse> {
    let ready = state.unlock_audio();
    info!("Audio unlock requested, ready={}", ready);
    audio_response(&state, ready)
}

/// Handle POST /countdown/start - Start a countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> CommandResult {
    let (seconds, preset_label) = request.resolve()?;
    let snapshot = state.start_countdown(seconds, preset_label)?;
    reply("Countdown started", snapshot)
}

/// Handle POST /countdown/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    reply("Countdown paused", state.pause()?)
}

/// Handle POST /countdown/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    reply("Countdown resumed", state.resume()?)
}

/// Handle POST /countdown/toggle - Pause, resume or run again
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    let snapshot = state.toggle()?;
    let message = format!("Countdown {}", snapshot.phase);
    reply(&message, snapshot)
}

/// Handle POST /countdown/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    reply("Countdown reset", state.reset()?)
}

/// Handle POST /countdown/restart
pub async fn restart_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    reply("Countdown restarted", state.restart()?)
}

/// Handle POST /countdown/cancel
pub async fn cancel_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    reply("Countdown cancelled", state.cancel()?)
}

/// Handle GET /status - Countdown, audio and server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, AppError> {
    let countdown = state.status()?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        countdown,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Json<Settings> {
    Json(state.settings.get())
}

/// Handle PUT /settings - Replace all settings
pub async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Json<Settings> {
    info!("Settings updated");
    Json(state.update_settings(settings))
}

/// Handle GET /history - Most recent completions first
pub async fn history_handler(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.list())
}

/// Handle GET /presets
pub async fn presets_handler() -> Json<Vec<Preset>> {
    Json(DEFAULT_PRESETS.to_vec())
}

/// Handle POST /audio/reactivate - Recover after suspected audio loss
pub async fn reactivate_audio_handler(State(state): State<Arc<AppState>>) -> Json<AudioResponse> {
    state.reactivate_audio();
    info!("Audio reactivated");
    audio_response(&state, state.audio.is_initialized())
}

/// Handle PUT /audio/volume
pub async fn volume_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VolumeRequest>,
) -> Json<VolumeResponse> {
    Json(state.set_volume(request.percent).into())
}

/// Handle POST /audio/mute - Toggle mute
pub async fn mute_handler(State(state): State<Arc<AppState>>) -> Json<VolumeResponse> {
    let control = state.toggle_mute();
    info!("Music {}", if control.is_muted() { "muted" } else { "unmuted" });
    Json(control.into())
}

/// Handle GET /health - Health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

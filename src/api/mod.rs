//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and request/response
//! structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/countdown/start", post(start_handler))
        .route("/countdown/pause", post(pause_handler))
        .route("/countdown/resume", post(resume_handler))
        .route("/countdown/toggle", post(toggle_handler))
        .route("/countdown/reset", post(reset_handler))
        .route("/countdown/restart", post(restart_handler))
        .route("/countdown/cancel", post(cancel_handler))
        .route("/audio/unlock", post(unlock_audio_handler))
        .route("/audio/reactivate", post(reactivate_audio_handler))
        .route("/audio/volume", put(volume_handler))
        .route("/audio/mute", post(mute_handler))
        .route("/settings", get(get_settings_handler).put(put_settings_handler))
        .route("/history", get(history_handler))
        .route("/presets", get(presets_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

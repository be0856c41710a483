//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    error::AppError,
    presets,
    state::{CountdownError, CountdownSnapshot, CountdownStatus, VolumeControl},
    time,
};

/// API response structure for countdown commands
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub countdown: CountdownSnapshot,
}

impl ApiResponse {
    /// Create a successful response carrying the resulting countdown
    pub fn ok(message: impl Into<String>, countdown: CountdownSnapshot) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            countdown,
        }
    }
}

/// Error body for every failed command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Countdown(CountdownError::NonPositiveDuration(_)) => StatusCode::BAD_REQUEST,
            AppError::Countdown(CountdownError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::LockPoisoned(_) => {
                error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Status response with server information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    pub countdown: CountdownStatus,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Audio state after an audio command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioResponse {
    pub ready: bool,
    pub audio_lost: bool,
    pub music_playing: bool,
}

/// Music volume after a volume command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeResponse {
    pub volume: u8,
    pub muted: bool,
    pub last_volume: u8,
}

impl From<VolumeControl> for VolumeResponse {
    fn from(control: VolumeControl) -> Self {
        Self {
            volume: control.volume(),
            muted: control.is_muted(),
            last_volume: control.last_volume(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Body of `POST /countdown/start`. Exactly one way of giving the duration
/// is used, checked in the order preset, seconds, time, keypad.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartRequest {
    pub preset: Option<String>,
    pub seconds: Option<i64>,
    /// Free-form `MM:SS` or bare seconds
    pub time: Option<String>,
    /// Keypad digits, `MMSS` right-aligned
    pub keypad: Option<String>,
}

impl StartRequest {
    /// Resolve to a duration in seconds and the preset label, if any
    pub fn resolve(&self) -> Result<(i64, Option<String>), AppError> {
        if let Some(id) = &self.preset {
            let preset = presets::find(id)
                .ok_or_else(|| AppError::InvalidRequest(format!("Unknown preset '{}'", id)))?;
            return Ok((preset.seconds, Some(preset.label.to_string())));
        }
        if let Some(seconds) = self.seconds {
            return Ok((seconds, None));
        }
        if let Some(input) = &self.time {
            return Ok((time::parse_freeform(input), None));
        }
        if let Some(digits) = &self.keypad {
            return Ok((time::parse_keypad(digits), None));
        }
        Err(AppError::InvalidRequest(
            "Give one of preset, seconds, time or keypad".to_string(),
        ))
    }
}

/// Body of `PUT /audio/volume`
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeRequest {
    pub percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(body: &str) -> StartRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_resolve_preset_wins() {
        let (seconds, label) = request(r#"{"preset":"pom1","seconds":5}"#).resolve().unwrap();
        assert_eq!(seconds, 60);
        assert_eq!(label.as_deref(), Some("Pomodoro"));
    }

    #[test]
    fn test_resolve_time_and_keypad() {
        assert_eq!(request(r#"{"time":"2:30"}"#).resolve().unwrap(), (150, None));
        assert_eq!(request(r#"{"keypad":"0130"}"#).resolve().unwrap(), (90, None));
        assert_eq!(request(r#"{"seconds":45}"#).resolve().unwrap(), (45, None));
    }

    #[test]
    fn test_resolve_rejects_empty_and_unknown_preset() {
        assert!(matches!(
            request("{}").resolve(),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            request(r#"{"preset":"nope"}"#).resolve(),
            Err(AppError::InvalidRequest(_))
        ));
    }
}

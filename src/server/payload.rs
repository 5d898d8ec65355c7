//! Request and response shapes of the HTTP API.
//!
//! Devices post `esp_id`; `deviceId` is accepted as an alias. Soft outcomes
//! (ignored presses, allowed no-ops) are 200 responses whose body must be
//! inspected; a blocked break is a 403 carrying the elapsed board time.

use crate::core::cycle::PressOutcome;
use crate::core::mode::{BLOCKED_REASON, ModeOutcome};
use crate::models::mode::Mode;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default, Deserialize)]
pub struct SetModeRequest {
    #[serde(default, alias = "deviceId")]
    pub esp_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobDoneRequest {
    #[serde(default, alias = "deviceId")]
    pub esp_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceQuery {
    #[serde(default, alias = "deviceId")]
    pub esp_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SetTargetRequest {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub target_time_sec: Option<i64>,
}

/// Lenient body parsing: a missing or malformed body reads as an empty request,
/// so validation reports the missing field instead of a decoding error.
pub fn parse_body<T: for<'de> Deserialize<'de> + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

pub fn mode_response(outcome: &ModeOutcome) -> (StatusCode, Value) {
    match outcome {
        ModeOutcome::Allowed {
            mode,
            board_cancelled: true,
        } => (
            StatusCode::OK,
            json!({ "mode": mode, "allowed": true, "message": "board cancelled" }),
        ),
        ModeOutcome::Allowed { mode, .. } => (StatusCode::OK, json!({ "mode": mode, "allowed": true })),
        ModeOutcome::Blocked { elapsed } => (
            StatusCode::FORBIDDEN,
            json!({
                "blocked": true,
                "mode": Mode::Work,
                "reason": BLOCKED_REASON,
                "elapsed": elapsed,
            }),
        ),
    }
}

pub fn press_response(outcome: &PressOutcome) -> Value {
    match outcome {
        PressOutcome::Started => json!({ "action": "started" }),
        PressOutcome::CompletedAndStarted { cycle_time } => {
            json!({ "action": "completed_and_started", "cycleTime": cycle_time })
        }
        PressOutcome::Ignored {
            reason,
            elapsed: Some(elapsed),
        } => json!({ "ignored": true, "reason": reason.as_str(), "elapsed": elapsed }),
        PressOutcome::Ignored { reason, elapsed: None } => {
            json!({ "ignored": true, "reason": reason.as_str() })
        }
    }
}

pub fn error_body(message: &str) -> Value {
    json!({ "error": message })
}

use super::payload::{
    DeviceQuery, JobDoneRequest, SetModeRequest, SetTargetRequest, error_body, mode_response,
    parse_body, press_response,
};
use crate::core::service::{LineService, parse_mode, require_device_id};
use crate::errors::{AppError, AppResult};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::error;

pub type SharedService = Arc<LineService>;

/// AppError rendered as `{"error": ...}` with a 400 or 500 status.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(error_body(&self.0.client_message()))).into_response()
    }
}

type ApiResult = Result<(StatusCode, Json<Value>), ApiError>;

/// Run a blocking service call off the async runtime.
async fn blocking<T, F>(service: &SharedService, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&LineService) -> AppResult<T> + Send + 'static,
{
    let service = service.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| AppError::Other(format!("worker panicked: {e}")))?
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn set_mode(State(service): State<SharedService>, body: Bytes) -> ApiResult {
    let req: SetModeRequest = parse_body(&body);
    let id = require_device_id(req.esp_id.as_deref())?.to_string();
    let mode = parse_mode(req.mode.as_deref())?;

    let outcome = blocking(&service, move |s| s.set_mode(&id, mode)).await?;
    let (status, body) = mode_response(&outcome);
    Ok((status, Json(body)))
}

pub async fn job_done(State(service): State<SharedService>, body: Bytes) -> ApiResult {
    let req: JobDoneRequest = parse_body(&body);
    let id = require_device_id(req.esp_id.as_deref())?.to_string();

    let outcome = blocking(&service, move |s| s.job_done(&id)).await?;
    Ok((StatusCode::OK, Json(press_response(&outcome))))
}

pub async fn mode_status(
    State(service): State<SharedService>,
    Query(q): Query<DeviceQuery>,
) -> ApiResult {
    let id = require_device_id(q.esp_id.as_deref())?.to_string();
    let status = blocking(&service, move |s| s.mode_status(&id)).await?;
    Ok((StatusCode::OK, Json(json!(status))))
}

pub async fn job_event(
    State(service): State<SharedService>,
    Query(q): Query<DeviceQuery>,
) -> ApiResult {
    let id = require_device_id(q.esp_id.as_deref())?.to_string();
    let event = blocking(&service, move |s| s.last_job_event(&id)).await?;
    Ok((StatusCode::OK, Json(json!(event))))
}

pub async fn graph_data(
    State(service): State<SharedService>,
    Query(q): Query<DeviceQuery>,
) -> ApiResult {
    let id = require_device_id(q.esp_id.as_deref())?.to_string();
    let data = blocking(&service, move |s| s.graph_data(&id)).await?;
    Ok((StatusCode::OK, Json(json!(data))))
}

pub async fn set_target(State(service): State<SharedService>, body: Bytes) -> ApiResult {
    let req: SetTargetRequest = parse_body(&body);
    let department = req.department.unwrap_or_default();
    let model = req.model.unwrap_or_default();
    let seconds = req.target_time_sec;

    blocking(&service, move |s| s.set_target(&department, &model, seconds)).await?;
    Ok((StatusCode::OK, Json(json!({ "status": "active_target_updated" }))))
}

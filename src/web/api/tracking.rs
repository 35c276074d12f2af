use axum::{extract::State, http::StatusCode, Json};

use crate::gate::LocationSample;
use crate::tracker::{TrackerError, TrackerMode, TrackerStatus};
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    post,
    path = "/api/tracking/start",
    responses(
        (status = 200, description = "Tracking session started", body = TrackerMode),
        (status = 409, description = "Tracker already running", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn start(State(state): State<AppState>) -> ApiResult<Json<TrackerMode>> {
    let mut tracker = state.tracker.lock().await;
    let mode = tracker.start()?;
    Ok(Json(mode))
}

#[utoipa::path(
    post,
    path = "/api/tracking/stop",
    responses(
        (status = 200, description = "Tracking session stopped", body = TrackerMode)
    ),
    tag = "tracking"
)]
pub async fn stop(State(state): State<AppState>) -> ApiResult<Json<TrackerMode>> {
    let mut tracker = state.tracker.lock().await;
    tracker.stop().await;
    Ok(Json(tracker.status().mode))
}

#[utoipa::path(
    post,
    path = "/api/tracking/samples",
    request_body = LocationSample,
    responses(
        (status = 202, description = "Sample queued for the gate"),
        (status = 409, description = "No tracking session running", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn push_sample(
    State(state): State<AppState>,
    Json(sample): Json<LocationSample>,
) -> ApiResult<StatusCode> {
    // Release the lock before a full queue can make us wait.
    let samples_tx = state.tracker.lock().await.sender()?;
    samples_tx
        .send(sample)
        .await
        .map_err(|_| TrackerError::NotRunning)?;
    Ok(StatusCode::ACCEPTED)
}

#[utoipa::path(
    get,
    path = "/api/tracking/status",
    responses(
        (status = 200, description = "Tracking session status", body = TrackerStatus)
    ),
    tag = "tracking"
)]
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<TrackerStatus>> {
    let tracker = state.tracker.lock().await;
    Ok(Json(tracker.status()))
}

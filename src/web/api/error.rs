use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tracker::TrackerError;

#[derive(Debug)]
pub enum ApiError {
    Conflict {
        reason: &'static str,
        message: String,
    },
}

impl From<TrackerError> for ApiError {
    fn from(e: TrackerError) -> Self {
        let reason = match e {
            TrackerError::AlreadyRunning => "tracker_running",
            TrackerError::NotRunning => "tracker_idle",
        };
        ApiError::Conflict {
            reason,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Conflict { reason, message } => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::with_message(reason, &message)),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}

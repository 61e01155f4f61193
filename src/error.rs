use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("environment variable is not set. Cannot proceed with API call.")]
    Configuration,
    #[error("API call failed with status {status}. Response: {body_preview}")]
    Api { status: u16, body_preview: String },
    #[error("request to reset endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ResetError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ResetError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl IntoResponse for ResetError {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "error",
            "message": format!("Manual reset failed: {self}"),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub type ResetResult<T> = Result<T, ResetError>;

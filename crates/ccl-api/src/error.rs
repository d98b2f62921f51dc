//! HTTP error mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::error;

/// Generic message returned for any server-side generation failure.
pub const GENERATION_FAILED: &str = "CCL generation failed";

/// Errors returned by handlers, rendered as `{ "ok": false, "error": ... }`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(ccl_core::Error),
}

impl From<ccl_core::Error> for ApiError {
    fn from(err: ccl_core::Error) -> Self {
        match err {
            ccl_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(err) => {
                error!(subsystem = "api", error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERATION_FAILED.to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "ok": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

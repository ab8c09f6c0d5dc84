use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Per-request failures. Startup failures (model/dataset load) go through
/// `anyhow` and abort the process before the listener binds.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for field `{name}`: {reason}")]
    InvalidField { name: &'static str, reason: String },

    /// Unexpected failure inside the model's predict call. Converted here so
    /// it surfaces in the same response shape as a validation error instead
    /// of taking the whole request down.
    #[error("prediction failed: {0}")]
    Prediction(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "error": self.to_string() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

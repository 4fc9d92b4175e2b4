//! HTTP error responses.
//!
//! Every failure is answered with `{"detail": "..."}`. Client errors carry
//! their message; server errors carry a generic message and the cause is
//! only logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use nowcast_common::NowcastError;

pub const INVALID_FILE: &str = "Invalid input file. Expected NumPy .npy patch.";
pub const MISSING_FILE: &str = "Field 'file' is required.";
pub const NOT_MULTIPART: &str = "Expected multipart/form-data with a 'file' field.";
pub const TOO_LARGE: &str = "Uploaded file exceeds the size limit.";
pub const PREDICTION_FAILED: &str = "Prediction failed.";
pub const REPORT_FAILED: &str = "Report generation failed.";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn invalid_file() -> Self {
        Self::bad_request(INVALID_FILE)
    }

    /// Map a pipeline error: client errors keep their message, anything else
    /// becomes a 500 with `generic`.
    pub fn from_nowcast(err: NowcastError, generic: &str) -> Self {
        if err.is_client_error() {
            let status = StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::BAD_REQUEST);
            Self::new(status, err.to_string())
        } else {
            error!(error = %err, "Request failed");
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, generic)
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_keeps_message() {
        let err = ApiError::from_nowcast(
            NowcastError::ShapeMismatch("Expected shape (9,64,64), got (1,2)".into()),
            PREDICTION_FAILED,
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "Expected shape (9,64,64), got (1,2)");
    }

    #[test]
    fn test_server_error_is_generic() {
        let err = ApiError::from_nowcast(NowcastError::RenderError("disk on fire".into()), REPORT_FAILED);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail(), REPORT_FAILED);
    }
}

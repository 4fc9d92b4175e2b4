//! HTTP request handlers.

pub mod health;
pub mod predict;
pub mod report;

use std::sync::Arc;

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::http::StatusCode;
use ndarray::Array3;
use tracing::{debug, warn};

use crate::error::{ApiError, MISSING_FILE, NOT_MULTIPART, TOO_LARGE};
use crate::inference::decode_patch;
use crate::state::AppState;

/// Name of the multipart field carrying the `.npy` payload.
pub const FILE_FIELD: &str = "file";

/// Read the `file` field of a multipart upload and decode it as a sample.
pub(crate) async fn read_patch(
    state: &Arc<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
    generic: &str,
) -> Result<Array3<f32>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection, "Rejected non-multipart upload");
        ApiError::bad_request(NOT_MULTIPART)
    })?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::bad_request(MISSING_FILE)),
            Err(e) => return Err(multipart_error(e)),
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        debug!(filename = %filename, bytes = bytes.len(), "Received upload");

        return decode_patch(&state.classifier, &bytes).map_err(|e| match e {
            nowcast_common::NowcastError::InvalidInput(cause) => {
                warn!(error = %cause, "Upload is not a readable .npy array");
                ApiError::invalid_file()
            }
            other => ApiError::from_nowcast(other, generic),
        });
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE)
    } else {
        warn!(error = %err, "Malformed multipart body");
        ApiError::invalid_file()
    }
}

//! POST /predict

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Extension,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use nowcast_common::PredictionLabel;

use crate::error::{ApiError, PREDICTION_FAILED};
use crate::inference::run_inference;
use crate::metrics::{record_prediction, Outcome};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub probability: f32,
    pub prediction: PredictionLabel,
    /// Grad-CAM overlay, base64 PNG.
    pub gradcam: String,
    /// Oldest input frame, base64 PNG.
    pub input_image: String,
    /// All three input frames, oldest first.
    pub input_images: Vec<String>,
}

#[instrument(skip_all)]
pub async fn predict_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let result = predict(state, multipart).await;
    record_prediction(match &result {
        Ok(_) => Outcome::Success,
        Err(e) => Outcome::from_status(e.status()),
    });
    result.map(Json)
}

async fn predict(
    state: Arc<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<PredictResponse, ApiError> {
    let input = super::read_patch(&state, multipart, PREDICTION_FAILED).await?;

    let inference = tokio::task::spawn_blocking(move || run_inference(&state.classifier, &input))
        .await
        .map_err(|e| {
            error!(error = %e, "Inference task panicked");
            ApiError::from_nowcast(nowcast_common::NowcastError::InternalError(e.to_string()), PREDICTION_FAILED)
        })?
        .map_err(|e| ApiError::from_nowcast(e, PREDICTION_FAILED))?;

    let input_image = inference.images.input_image().to_string();
    Ok(PredictResponse {
        probability: inference.probability,
        prediction: inference.label,
        gradcam: inference.images.gradcam,
        input_image,
        input_images: inference.images.input_images,
    })
}

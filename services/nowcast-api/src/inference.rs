//! The blocking prediction pipeline shared by `/predict` and `/report`.

use std::time::Instant;

use ndarray::Array3;
use tracing::info;

use classifier::{grad_cam, Classifier};
use nowcast_common::{NowcastError, NowcastResult, PredictionLabel};
use renderer::{render_prediction_images, PredictionImages};

/// One explained prediction.
#[derive(Debug, Clone)]
pub struct Inference {
    pub probability: f32,
    pub label: PredictionLabel,
    pub images: PredictionImages,
}

/// Decode an uploaded `.npy` payload into a validated `(9, 64, 64)` sample.
pub fn decode_patch(classifier: &Classifier, bytes: &[u8]) -> NowcastResult<Array3<f32>> {
    let array = npy_format::parse(bytes).map_err(|e| NowcastError::InvalidInput(e.to_string()))?;
    let (shape, data) = array.into_parts();
    Ok(classifier.input_from_parts(&shape, data)?)
}

/// Predict, explain and render. CPU-bound; run off the async executor.
pub fn run_inference(classifier: &Classifier, input: &Array3<f32>) -> NowcastResult<Inference> {
    let start = Instant::now();
    let cam = grad_cam(classifier, input.view())?;
    crate::metrics::record_inference(start.elapsed());

    let images = render_prediction_images(input.view(), cam.heatmap.view())
        .map_err(|e| NowcastError::RenderError(e.to_string()))?;
    let label = PredictionLabel::from_probability(cam.probability);

    info!(
        probability = cam.probability,
        prediction = %label,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Prediction complete"
    );

    Ok(Inference {
        probability: cam.probability,
        label,
        images,
    })
}

//! Grad-CAM over the last convolutional layer.
//!
//! The gradient of the logit with respect to the last conv output is derived
//! analytically from the [`ForwardTrace`]: linear → global average → max-pool
//! routing → ReLU mask → batch-norm scale. Each channel's weight is the
//! spatial mean of its gradient; the map is the ReLU of the weighted channel
//! sum, shifted to a zero minimum and divided by its maximum.
//!
//! Everything is returned by value from [`grad_cam`]; the model is not
//! touched, so any number of explanations may run at once.

use ndarray::{Array1, Array2, Array3, ArrayView3, Axis};
use tracing::debug;

use crate::error::ClassifierResult;
use crate::layers::max_pool2x2_backward;
use crate::model::{sigmoid, Classifier, ForwardTrace};

/// Added to the maximum before dividing, so an all-zero map stays zero.
pub const NORMALIZE_EPS: f32 = 1e-8;

/// One explanation: the prediction it explains plus a `[0, 1]` heat map at
/// the last conv layer's resolution (`16 × 16` for a `64 × 64` patch).
#[derive(Debug, Clone)]
pub struct GradCam {
    pub logit: f32,
    pub probability: f32,
    pub heatmap: Array2<f32>,
    pub channel_weights: Array1<f32>,
}

/// Run one forward and one backward pass and build the class activation map
/// for the positive (heavy-rain) logit.
pub fn grad_cam(model: &Classifier, input: ArrayView3<'_, f32>) -> ClassifierResult<GradCam> {
    let trace = model.forward_traced(input)?;
    let gradients = logit_gradient(model, &trace);

    let channel_weights: Array1<f32> = gradients
        .axis_iter(Axis(0))
        .map(|plane| plane.mean().unwrap_or(0.0))
        .collect();

    let (_, h, w) = trace.last_conv.dim();
    let mut cam = Array2::<f32>::zeros((h, w));
    for (weight, activation) in channel_weights.iter().zip(trace.last_conv.axis_iter(Axis(0))) {
        if *weight != 0.0 {
            cam.scaled_add(*weight, &activation);
        }
    }
    cam.mapv_inplace(|v| v.max(0.0));
    normalize(&mut cam);

    debug!(
        logit = trace.logit,
        positive_channels = channel_weights.iter().filter(|w| **w > 0.0).count(),
        "Grad-CAM computed"
    );

    Ok(GradCam {
        logit: trace.logit,
        probability: sigmoid(trace.logit),
        heatmap: cam,
        channel_weights,
    })
}

/// d(logit) / d(last conv output), same shape as `trace.last_conv`.
pub fn logit_gradient(model: &Classifier, trace: &ForwardTrace) -> Array3<f32> {
    let weights = model.weights();
    let (channels, ph, pw) = trace.last_pool.values.dim();
    let area = (ph * pw).max(1) as f32;

    // fc → global average pool
    let fc_row = weights.fc.weight.row(0);
    let grad_pooled = Array3::from_shape_fn((channels, ph, pw), |(c, _, _)| fc_row[c] / area);

    // max-pool → ReLU
    let mut grad = max_pool2x2_backward(&trace.last_pool, grad_pooled.view());
    grad.zip_mut_with(&trace.last_bn, |g, &pre| {
        if pre <= 0.0 {
            *g = 0.0;
        }
    });

    // batch-norm is affine per channel
    let scale = weights.blocks[2].bn.scale();
    for (c, mut plane) in grad.axis_iter_mut(Axis(0)).enumerate() {
        plane *= scale[c];
    }
    grad
}

/// Shift to a zero minimum, then divide by `max + eps`.
pub fn normalize(cam: &mut Array2<f32>) {
    let min = cam.iter().copied().fold(f32::INFINITY, f32::min);
    if !min.is_finite() {
        return;
    }
    cam.mapv_inplace(|v| v - min);
    let max = cam.iter().copied().fold(0.0f32, f32::max);
    let denom = max + NORMALIZE_EPS;
    cam.mapv_inplace(|v| v / denom);
}

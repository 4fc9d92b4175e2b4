//! Network layers, inference-mode only.
//!
//! Tensors are single samples laid out `(channels, height, width)`; there is
//! no batch axis.

use ndarray::parallel::prelude::*;
use ndarray::{s, Array1, Array2, Array3, Array4, ArrayView1, ArrayView3, Axis};

use crate::{BN_EPS, KERNEL_SIZE};

/// 2-D convolution, stride 1, "same" zero padding.
#[derive(Debug, Clone, PartialEq)]
pub struct Conv2d {
    /// `(out_channels, in_channels, k, k)`
    pub weight: Array4<f32>,
    /// `(out_channels,)`
    pub bias: Array1<f32>,
}

impl Conv2d {
    pub fn zeros(in_channels: usize, out_channels: usize) -> Self {
        Self {
            weight: Array4::zeros((out_channels, in_channels, KERNEL_SIZE, KERNEL_SIZE)),
            bias: Array1::zeros(out_channels),
        }
    }

    pub fn in_channels(&self) -> usize {
        self.weight.dim().1
    }

    pub fn out_channels(&self) -> usize {
        self.weight.dim().0
    }

    pub fn forward(&self, input: ArrayView3<'_, f32>) -> Array3<f32> {
        let (in_ch, h, w) = input.dim();
        let (out_ch, _, kh, kw) = self.weight.dim();
        let (pad_y, pad_x) = (kh / 2, kw / 2);

        let mut padded = Array3::<f32>::zeros((in_ch, h + 2 * pad_y, w + 2 * pad_x));
        padded
            .slice_mut(s![.., pad_y..pad_y + h, pad_x..pad_x + w])
            .assign(&input);

        let mut out = Array3::<f32>::zeros((out_ch, h, w));
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(o, mut plane)| {
                plane.fill(self.bias[o]);
                for i in 0..in_ch {
                    for ky in 0..kh {
                        for kx in 0..kw {
                            let weight = self.weight[[o, i, ky, kx]];
                            if weight != 0.0 {
                                plane.scaled_add(weight, &padded.slice(s![i, ky..ky + h, kx..kx + w]));
                            }
                        }
                    }
                }
            });
        out
    }
}

/// Batch normalization with frozen running statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchNorm2d {
    pub weight: Array1<f32>,
    pub bias: Array1<f32>,
    pub running_mean: Array1<f32>,
    pub running_var: Array1<f32>,
    pub eps: f32,
}

impl BatchNorm2d {
    /// Identity transform up to `eps` (gamma 1, beta 0, mean 0, var 1).
    pub fn identity(channels: usize) -> Self {
        Self {
            weight: Array1::ones(channels),
            bias: Array1::zeros(channels),
            running_mean: Array1::zeros(channels),
            running_var: Array1::ones(channels),
            eps: BN_EPS,
        }
    }

    /// All-zero affine parameters: output is 0 for every input.
    pub fn zeroed(channels: usize) -> Self {
        Self {
            weight: Array1::zeros(channels),
            ..Self::identity(channels)
        }
    }

    /// Per-channel multiplier `gamma / sqrt(var + eps)`; also the derivative
    /// of the output with respect to the input.
    pub fn scale(&self) -> Array1<f32> {
        let mut scale = self.running_var.mapv(|v| (v + self.eps).sqrt().recip());
        scale *= &self.weight;
        scale
    }

    pub fn forward(&self, input: ArrayView3<'_, f32>) -> Array3<f32> {
        let scale = self.scale();
        let mut out = input.to_owned();
        for (c, mut plane) in out.axis_iter_mut(Axis(0)).enumerate() {
            let (mean, shift, k) = (self.running_mean[c], self.bias[c], scale[c]);
            plane.mapv_inplace(|v| (v - mean) * k + shift);
        }
        out
    }
}

pub fn relu(input: ArrayView3<'_, f32>) -> Array3<f32> {
    input.mapv(|v| v.max(0.0))
}

/// Result of a 2×2 max-pool: pooled values and, for each output cell, the
/// flat `y * width + x` index of the input element that won.
#[derive(Debug, Clone)]
pub struct PoolOutput {
    pub values: Array3<f32>,
    pub argmax: Array3<usize>,
    pub input_height: usize,
    pub input_width: usize,
}

/// 2×2 max-pool with stride 2. Odd trailing rows/columns are dropped and ties
/// go to the first element in row-major order.
pub fn max_pool2x2(input: ArrayView3<'_, f32>) -> PoolOutput {
    let (channels, h, w) = input.dim();
    let (oh, ow) = (h / 2, w / 2);
    let mut values = Array3::<f32>::zeros((channels, oh, ow));
    let mut argmax = Array3::<usize>::zeros((channels, oh, ow));

    for c in 0..channels {
        for oy in 0..oh {
            for ox in 0..ow {
                let mut best = f32::NEG_INFINITY;
                let mut best_idx = 2 * oy * w + 2 * ox;
                for dy in 0..2 {
                    for dx in 0..2 {
                        let (y, x) = (2 * oy + dy, 2 * ox + dx);
                        let v = input[[c, y, x]];
                        if v > best || v.is_nan() {
                            best = v;
                            best_idx = y * w + x;
                            if v.is_nan() {
                                break;
                            }
                        }
                    }
                }
                values[[c, oy, ox]] = best;
                argmax[[c, oy, ox]] = best_idx;
            }
        }
    }

    PoolOutput {
        values,
        argmax,
        input_height: h,
        input_width: w,
    }
}

/// Route pooled-output gradients back to the winning input elements.
pub fn max_pool2x2_backward(pool: &PoolOutput, grad_out: ArrayView3<'_, f32>) -> Array3<f32> {
    let (channels, oh, ow) = grad_out.dim();
    let w = pool.input_width;
    let mut grad_in = Array3::<f32>::zeros((channels, pool.input_height, w));
    for c in 0..channels {
        for oy in 0..oh {
            for ox in 0..ow {
                let idx = pool.argmax[[c, oy, ox]];
                grad_in[[c, idx / w, idx % w]] += grad_out[[c, oy, ox]];
            }
        }
    }
    grad_in
}

/// Adaptive average pool to `1 × 1`, flattened to `(channels,)`.
pub fn global_avg_pool(input: ArrayView3<'_, f32>) -> Array1<f32> {
    let (_, h, w) = input.dim();
    let area = (h * w).max(1) as f32;
    input
        .axis_iter(Axis(0))
        .map(|plane| plane.sum() / area)
        .collect()
}

/// Fully connected layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    /// `(out_features, in_features)`
    pub weight: Array2<f32>,
    pub bias: Array1<f32>,
}

impl Linear {
    pub fn zeros(in_features: usize, out_features: usize) -> Self {
        Self {
            weight: Array2::zeros((out_features, in_features)),
            bias: Array1::zeros(out_features),
        }
    }

    pub fn forward(&self, input: ArrayView1<'_, f32>) -> Array1<f32> {
        self.weight.dot(&input) + &self.bias
    }
}

//! The loaded classifier and its forward pass.

use std::path::Path;

use ndarray::{Array1, Array3, ArrayView3};
use tracing::{debug, info};

use nowcast_common::geometry::{format_shape, PatchGeometry};
use nowcast_common::prediction::PredictionLabel;

use crate::error::{ClassifierError, ClassifierResult};
use crate::layers::{global_avg_pool, max_pool2x2, relu, PoolOutput};
use crate::weights::{ConvBlock, NetworkWeights};

/// Logistic function.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Intermediate tensors of one forward pass, kept for the explanation
/// backward pass. Owned by the caller; nothing is stored on the model.
#[derive(Debug, Clone)]
pub struct ForwardTrace {
    /// Output of the last convolution, before batch-norm: `(128, 16, 16)`.
    pub last_conv: Array3<f32>,
    /// Last batch-norm output, before ReLU.
    pub last_bn: Array3<f32>,
    /// Last max-pool, with winner indices.
    pub last_pool: PoolOutput,
    /// Globally pooled features fed to the linear head.
    pub features: Array1<f32>,
    pub logit: f32,
}

impl ForwardTrace {
    pub fn probability(&self) -> f32 {
        sigmoid(self.logit)
    }
}

/// Heavy-rain classifier with frozen weights. Cheap to share behind an
/// `Arc`; all methods take `&self`.
#[derive(Debug, Clone)]
pub struct Classifier {
    weights: NetworkWeights,
    input_shape: [usize; 3],
}

impl Classifier {
    pub fn new(weights: NetworkWeights) -> Self {
        Self {
            weights,
            input_shape: PatchGeometry::default().sample_shape(),
        }
    }

    /// Load weights from a safetensors file.
    pub fn load(path: impl AsRef<Path>) -> ClassifierResult<Self> {
        let weights = NetworkWeights::from_file(path)?;
        info!(input_shape = %format_shape(&PatchGeometry::default().sample_shape()), "Classifier ready");
        Ok(Self::new(weights))
    }

    pub fn from_safetensors(bytes: &[u8]) -> ClassifierResult<Self> {
        NetworkWeights::from_safetensors(bytes).map(Self::new)
    }

    /// Model with every parameter zero; always predicts probability 0.5.
    pub fn zeroed() -> Self {
        Self::new(NetworkWeights::zeroed())
    }

    pub fn weights(&self) -> &NetworkWeights {
        &self.weights
    }

    pub fn input_shape(&self) -> [usize; 3] {
        self.input_shape
    }

    /// Check a raw shape against the expected `(9, 64, 64)`.
    pub fn validate_shape(&self, shape: &[usize]) -> ClassifierResult<()> {
        if shape != self.input_shape {
            return Err(ClassifierError::InvalidShape {
                expected: format_shape(&self.input_shape),
                got: format_shape(shape),
            });
        }
        Ok(())
    }

    /// Build a validated input tensor from a shape and row-major data.
    pub fn input_from_parts(&self, shape: &[usize], data: Vec<f32>) -> ClassifierResult<Array3<f32>> {
        self.validate_shape(shape)?;
        Array3::from_shape_vec((shape[0], shape[1], shape[2]), data).map_err(|_| ClassifierError::InvalidShape {
            expected: format_shape(&self.input_shape),
            got: format_shape(shape),
        })
    }

    /// Probability of heavy rain for one `(9, 64, 64)` sample.
    pub fn predict(&self, input: ArrayView3<'_, f32>) -> ClassifierResult<f32> {
        let trace = self.forward_traced(input)?;
        Ok(trace.probability())
    }

    /// Probability plus the thresholded label.
    pub fn classify(&self, input: ArrayView3<'_, f32>) -> ClassifierResult<(f32, PredictionLabel)> {
        let probability = self.predict(input)?;
        Ok((probability, PredictionLabel::from_probability(probability)))
    }

    /// Full forward pass keeping what the explanation needs.
    pub fn forward_traced(&self, input: ArrayView3<'_, f32>) -> ClassifierResult<ForwardTrace> {
        self.validate_shape(input.shape())?;

        let [first, second, last] = &self.weights.blocks;
        let x = stage(first, input).values;
        let x = stage(second, x.view()).values;

        let last_conv = last.conv.forward(x.view());
        let trace = self.head(last_conv);
        if !trace.logit.is_finite() {
            return Err(ClassifierError::NonFinite);
        }
        debug!(logit = trace.logit, "Forward pass complete");
        Ok(trace)
    }

    /// Everything after the last convolution: BN → ReLU → pool → GAP → fc.
    pub fn head(&self, last_conv: Array3<f32>) -> ForwardTrace {
        let block = &self.weights.blocks[2];
        let last_bn = block.bn.forward(last_conv.view());
        let last_pool = max_pool2x2(relu(last_bn.view()).view());
        let features = global_avg_pool(last_pool.values.view());
        let logit = self.weights.fc.forward(features.view())[0];
        ForwardTrace {
            last_conv,
            last_bn,
            last_pool,
            features,
            logit,
        }
    }
}

fn stage(block: &ConvBlock, input: ArrayView3<'_, f32>) -> PoolOutput {
    let conv = block.conv.forward(input);
    let bn = block.bn.forward(conv.view());
    max_pool2x2(relu(bn.view()).view())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(20.0) > 0.999);
        assert!(sigmoid(-20.0) < 0.001);
    }

    #[test]
    fn test_validate_shape_message() {
        let model = Classifier::zeroed();
        let err = model.validate_shape(&[3, 64, 64]).unwrap_err();
        assert_eq!(err.to_string(), "Expected shape (9,64,64), got (3,64,64)");
    }

    #[test]
    fn test_trace_shapes() {
        let model = Classifier::zeroed();
        let input = Array3::<f32>::zeros((9, 64, 64));
        let trace = model.forward_traced(input.view()).unwrap();
        assert_eq!(trace.last_conv.dim(), (128, 16, 16));
        assert_eq!(trace.last_pool.values.dim(), (128, 8, 8));
        assert_eq!(trace.features.len(), 128);
    }
}

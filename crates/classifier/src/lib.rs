//! Heavy-rain patch classifier.
//!
//! A small convolutional network reads a `(9, 64, 64)` stack of three
//! consecutive satellite patches and emits a single logit for "heavy rain
//! `lead` frames ahead":
//!
//! ```text
//! 9 → conv3x3 → BN → ReLU → pool2   (32 × 32 × 32)
//!  → conv3x3 → BN → ReLU → pool2    (64 × 16 × 16)
//!  → conv3x3 → BN → ReLU → pool2    (128 × 8 × 8)
//!  → global average pool → linear → logit
//! ```
//!
//! Weights are loaded once from a safetensors file and never mutated. The
//! Grad-CAM explanation in [`gradcam`] is computed from a [`ForwardTrace`]
//! returned by value, so concurrent callers share nothing mutable.

pub mod error;
pub mod gradcam;
pub mod layers;
pub mod model;
pub mod weights;

pub use error::{ClassifierError, ClassifierResult};
pub use gradcam::{grad_cam, GradCam};
pub use model::{sigmoid, Classifier, ForwardTrace};
pub use weights::NetworkWeights;

/// Channel widths through the network: input, then each conv stage.
pub const STAGE_CHANNELS: [usize; 4] = [9, 32, 64, 128];

/// Conv kernel edge length.
pub const KERNEL_SIZE: usize = 3;

/// Batch-norm epsilon used at training time.
pub const BN_EPS: f32 = 1e-5;

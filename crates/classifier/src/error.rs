//! Error types for model loading and inference.

use thiserror::Error;

use nowcast_common::NowcastError;

pub type ClassifierResult<T> = Result<T, ClassifierError>;

#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Input tensor does not have the shape the network was trained on.
    #[error("Expected shape {expected}, got {got}")]
    InvalidShape { expected: String, got: String },

    #[error("missing tensor '{0}' in weights file")]
    MissingTensor(String),

    #[error("tensor '{name}' has shape {got:?}, expected {expected:?}")]
    TensorShape {
        name: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("tensor '{name}' has unsupported dtype {dtype}")]
    UnsupportedDtype { name: String, dtype: String },

    #[error("invalid safetensors file: {0}")]
    Safetensors(String),

    #[error("non-finite model output")]
    NonFinite,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ClassifierError> for NowcastError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::InvalidShape { .. } => NowcastError::ShapeMismatch(err.to_string()),
            ClassifierError::NonFinite => NowcastError::Inference(err.to_string()),
            _ => NowcastError::ModelLoad(err.to_string()),
        }
    }
}

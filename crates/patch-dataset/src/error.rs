//! Error types for dataset preparation.

use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{len} patches is not a whole number of frames ({patches_per_frame} patches per frame)")]
    PartialFrame { len: usize, patches_per_frame: usize },

    #[error("image count {images} does not match label count {labels}")]
    LabelCountMismatch { images: usize, labels: usize },

    #[error("patch shape {got} does not match expected {expected}")]
    PatchShape { expected: String, got: String },

    #[error("invalid split fractions: {0}")]
    InvalidFractions(String),

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("tensor file error: {0}")]
    Npy(#[from] npy_format::NpyError),
}

//! Error types for `.npy` decoding and encoding.

use thiserror::Error;

pub type NpyResult<T> = Result<T, NpyError>;

#[derive(Debug, Error)]
pub enum NpyError {
    #[error("not a .npy file (bad magic)")]
    InvalidMagic,

    #[error("unsupported .npy format version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("invalid .npy header: {0}")]
    InvalidHeader(String),

    #[error("unsupported dtype '{0}'")]
    UnsupportedDtype(String),

    #[error("Fortran-ordered arrays are not supported")]
    FortranOrder,

    #[error("truncated data: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("data length {len} does not match shape {shape:?}")]
    ShapeMismatch { shape: Vec<usize>, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types for rain-nowcast services.

use thiserror::Error;

/// Result type alias using NowcastError.
pub type NowcastResult<T> = Result<T, NowcastError>;

/// Primary error type at the service boundary.
///
/// Library crates keep their own error enums and convert into this one where
/// a request is answered, so every failure maps onto exactly one HTTP status.
#[derive(Debug, Error)]
pub enum NowcastError {
    // === Input Errors ===
    #[error("Invalid input file: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    ShapeMismatch(String),

    // === Model Errors ===
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    // === Output Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Report generation failed: {0}")]
    ReportError(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl NowcastError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            NowcastError::InvalidInput(_) | NowcastError::ShapeMismatch(_) => 400,

            _ => 500,
        }
    }

    /// Whether the message is safe to show to the caller.
    ///
    /// Server-side failures are reported with a generic message and the
    /// cause only goes to the log.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }
}

use thiserror::Error;

use nowcast_common::NowcastError;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("probability must be a finite number, got {0}")]
    InvalidProbability(f32),

    #[error("invalid report policy: {0}")]
    Policy(#[from] serde_yaml::Error),

    #[error("stream compression failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ReportError> for NowcastError {
    fn from(err: ReportError) -> Self {
        NowcastError::ReportError(err.to_string())
    }
}

//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Nowcast API server
#[derive(Parser, Debug, Clone)]
#[command(name = "nowcast-api")]
#[command(about = "Heavy-rain nowcasting API: predictions, Grad-CAM images and PDF reports")]
pub struct ApiConfig {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000", env = "NOWCAST_LISTEN_ADDR")]
    pub listen: SocketAddr,

    /// Classifier weights (safetensors)
    #[arg(long, default_value = "models/patch_multiframe_t3.safetensors", env = "NOWCAST_MODEL_PATH")]
    pub model_path: PathBuf,

    /// Optional YAML file overriding report wording and risk thresholds
    #[arg(long, env = "NOWCAST_REPORT_POLICY")]
    pub report_policy: Option<PathBuf>,

    /// Maximum request body size in MiB
    #[arg(long, default_value_t = 32, env = "NOWCAST_MAX_UPLOAD_MB")]
    pub max_upload_mb: usize,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long, env = "NOWCAST_WORKER_THREADS")]
    pub worker_threads: Option<usize>,
}

impl ApiConfig {
    pub fn max_body_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

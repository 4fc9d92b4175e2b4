//! Nowcast API Server
//!
//! Serves heavy-rain predictions with Grad-CAM explanations and PDF reports.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use nowcast_api::config::ApiConfig;
use nowcast_api::state::AppState;

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = ApiConfig::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build().context("failed to create tokio runtime")?;
    runtime.block_on(run_server(args))
}

async fn run_server(args: ApiConfig) -> Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    info!(
        model = %args.model_path.display(),
        max_upload_mb = args.max_upload_mb,
        "Starting nowcast API server"
    );

    let state = Arc::new(AppState::load(&args.model_path, args.report_policy.as_deref())?);

    let app = nowcast_api::build_router(state, Some(prometheus_handle), args.max_body_bytes());

    info!(address = %args.listen, "Listening");

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}

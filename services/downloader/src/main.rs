//! Satellite data mirror.
//!
//! Mirrors a remote order directory into a local tree:
//! - Recursive walk, one pass per run
//! - Downloads land in `.partial` files and are renamed when complete
//! - `.complete` sentinels record size and CRC32 of verified files
//! - Exit status is non-zero when any entry failed

mod config;
mod download;
mod mirror;
mod remote;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use config::MirrorConfig;
use mirror::Mirror;
use remote::LocalTree;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let config = MirrorConfig::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!(
        endpoint = config.endpoint().as_deref().unwrap_or("local"),
        remote_root = %config.remote_root.display(),
        local_root = %config.local_root.display(),
        "Starting satellite mirror"
    );

    let mirror = Mirror::new(LocalTree::new(&config.remote_root), &config.local_root);
    let summary = mirror.run().await?;

    if !summary.is_success() {
        bail!("{} of {} entries failed", summary.failed, summary.failed + summary.downloaded + summary.skipped);
    }
    info!("Download complete");
    Ok(())
}

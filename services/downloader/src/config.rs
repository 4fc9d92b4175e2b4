//! Command-line and environment configuration.
//!
//! Paths and endpoint labels are never compiled in; they come from flags, the
//! environment or a `.env` file. The remote tree is read through a mount, so
//! authentication belongs to the mount, not to this process.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "downloader")]
#[command(about = "Mirror a remote satellite data tree into a local directory")]
pub struct MirrorConfig {
    /// Root of the remote tree (the mount point of the remote order directory)
    #[arg(long, env = "MIRROR_REMOTE_ROOT")]
    pub remote_root: PathBuf,

    /// Local directory the tree is mirrored into
    #[arg(long, env = "MIRROR_LOCAL_ROOT", default_value = "./satellite_mirror")]
    pub local_root: PathBuf,

    /// Host serving the mounted tree; only used to label log output
    #[arg(long, env = "MIRROR_HOST")]
    pub host: Option<String>,

    /// Port of the host; only used to label log output
    #[arg(long, env = "MIRROR_PORT", default_value_t = 22)]
    pub port: u16,

    /// Account the mount was made with; only used to label log output
    #[arg(long, env = "MIRROR_USERNAME")]
    pub username: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,
}

impl MirrorConfig {
    /// `user@host:port`, or `None` when no host is configured.
    pub fn endpoint(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        Some(match self.username.as_deref() {
            Some(user) => format!("{user}@{host}:{}", self.port),
            None => format!("{host}:{}", self.port),
        })
    }
}

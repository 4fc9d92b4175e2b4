//! Verified single-file downloads.
//!
//! A file is fetched into `<name>.partial`, checked against the size the
//! remote listing reported, renamed into place and only then recorded in a
//! `<name>.complete` sentinel. A local file without a matching sentinel is
//! treated as missing.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::remote::RemoteTree;

const PARTIAL_SUFFIX: &str = "partial";
const SENTINEL_SUFFIX: &str = "complete";
const CHUNK_SIZE: usize = 64 * 1024;

/// Contents of a `<name>.complete` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentinel {
    pub size: u64,
    pub crc32: u32,
    pub completed_at: DateTime<Utc>,
}

/// `<path>.<suffix>`, keeping the existing extension.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

pub fn partial_path(path: &Path) -> PathBuf {
    with_suffix(path, PARTIAL_SUFFIX)
}

pub fn sentinel_path(path: &Path) -> PathBuf {
    with_suffix(path, SENTINEL_SUFFIX)
}

/// Read a sentinel; missing or unreadable sentinels count as absent.
pub async fn read_sentinel(path: &Path) -> Option<Sentinel> {
    let bytes = fs::read(sentinel_path(path)).await.ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(sentinel) => Some(sentinel),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring corrupt sentinel");
            None
        }
    }
}

/// Whether `path` holds a verified copy of a remote file of `remote_size` bytes.
pub async fn is_complete(path: &Path, remote_size: u64) -> bool {
    let Some(sentinel) = read_sentinel(path).await else {
        return false;
    };
    if sentinel.size != remote_size {
        return false;
    }
    match fs::metadata(path).await {
        Ok(metadata) => metadata.is_file() && metadata.len() == sentinel.size,
        Err(_) => false,
    }
}

/// CRC32 of a file, read in chunks.
pub async fn file_crc32(path: &Path) -> Result<u32> {
    let mut file = fs::File::open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// Fetch `remote_path` into `local_path` and write its sentinel.
pub async fn download_file<T: RemoteTree + ?Sized>(
    remote: &T,
    remote_path: &str,
    local_path: &Path,
    remote_size: u64,
) -> Result<Sentinel> {
    let partial = partial_path(local_path);
    if fs::try_exists(&partial).await.unwrap_or(false) {
        warn!(path = %partial.display(), "Discarding stale partial download");
        fs::remove_file(&partial)
            .await
            .with_context(|| format!("failed to remove {}", partial.display()))?;
    }
    // A sentinel for an older version of the file must not survive a refetch.
    let sentinel_file = sentinel_path(local_path);
    if fs::try_exists(&sentinel_file).await.unwrap_or(false) {
        fs::remove_file(&sentinel_file).await?;
    }

    let written = remote.fetch(remote_path, &partial).await?;
    let actual = fs::metadata(&partial).await?.len();
    if written != remote_size || actual != remote_size {
        fs::remove_file(&partial).await.ok();
        bail!(
            "Download size mismatch: expected {} bytes, got {}",
            remote_size,
            actual
        );
    }

    let crc32 = file_crc32(&partial).await?;
    fs::rename(&partial, local_path)
        .await
        .with_context(|| format!("failed to move {} into place", partial.display()))?;

    let sentinel = Sentinel {
        size: actual,
        crc32,
        completed_at: Utc::now(),
    };
    fs::write(&sentinel_file, serde_json::to_vec(&sentinel)?)
        .await
        .with_context(|| format!("failed to write {}", sentinel_file.display()))?;

    debug!(path = %local_path.display(), size = actual, crc32 = crc32, "Wrote sentinel");
    Ok(sentinel)
}

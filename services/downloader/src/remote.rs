//! Remote tree access.
//!
//! Paths are `/`-separated and relative to the remote root; `""` is the root
//! itself.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::fs;

/// One directory entry on the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File { size: u64 },
}

/// A browsable remote directory tree.
#[async_trait]
pub trait RemoteTree: Send + Sync {
    /// List a directory, sorted by name.
    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>>;

    /// Copy a remote file to `dest`, returning the number of bytes written.
    async fn fetch(&self, path: &str, dest: &Path) -> Result<u64>;
}

/// Join a remote directory path and an entry name.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// A remote tree reachable through the local filesystem, e.g. an sshfs mount.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
}

impl LocalTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            if part == ".." || part == "." {
                bail!("invalid remote path component in {path:?}");
            }
            resolved.push(part);
        }
        Ok(resolved)
    }
}

#[async_trait]
impl RemoteTree for LocalTree {
    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        let dir = self.resolve(path)?;
        let mut reader = fs::read_dir(&dir)
            .await
            .with_context(|| format!("failed to list {}", dir.display()))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            // Follows symlinks so a mounted tree can link out.
            let metadata = fs::metadata(entry.path())
                .await
                .with_context(|| format!("failed to stat {}", entry.path().display()))?;
            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File { size: metadata.len() }
            };
            entries.push(RemoteEntry { name, kind });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn fetch(&self, path: &str, dest: &Path) -> Result<u64> {
        let src = self.resolve(path)?;
        fs::copy(&src, dest)
            .await
            .with_context(|| format!("failed to copy {} to {}", src.display(), dest.display()))
    }
}

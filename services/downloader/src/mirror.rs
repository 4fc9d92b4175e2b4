//! Recursive mirror of a remote tree.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::download::{download_file, is_complete};
use crate::remote::{join, EntryKind, RemoteTree};

/// Outcome counts of one mirror run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_downloaded: u64,
}

impl MirrorSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

pub struct Mirror<T> {
    remote: T,
    local_root: PathBuf,
}

impl<T: RemoteTree> Mirror<T> {
    pub fn new(remote: T, local_root: impl Into<PathBuf>) -> Self {
        Self {
            remote,
            local_root: local_root.into(),
        }
    }

    /// Walk the whole remote tree once.
    ///
    /// Failures are counted and the walk moves on to the next entry; nothing
    /// is retried.
    #[instrument(skip(self), fields(local_root = %self.local_root.display()))]
    pub async fn run(&self) -> Result<MirrorSummary> {
        fs::create_dir_all(&self.local_root).await?;

        let mut summary = MirrorSummary::default();
        let mut pending = vec![(String::new(), self.local_root.clone())];

        while let Some((remote_dir, local_dir)) = pending.pop() {
            if let Err(e) = fs::create_dir_all(&local_dir).await {
                warn!(path = %local_dir.display(), error = %e, "Failed to create directory");
                summary.failed += 1;
                continue;
            }

            let entries = match self.remote.list(&remote_dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(remote = %remote_dir, error = %e, "Failed to list directory");
                    summary.failed += 1;
                    continue;
                }
            };

            // Reverse so subdirectories come off the stack in name order.
            for entry in entries.into_iter().rev() {
                let remote_path = join(&remote_dir, &entry.name);
                let local_path = local_dir.join(&entry.name);
                match entry.kind {
                    EntryKind::Directory => pending.push((remote_path, local_path)),
                    EntryKind::File { size } => {
                        self.mirror_file(&remote_path, &local_path, size, &mut summary)
                            .await
                    }
                }
            }
        }

        info!(
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            bytes = summary.bytes_downloaded,
            "Mirror run complete"
        );
        Ok(summary)
    }

    async fn mirror_file(&self, remote_path: &str, local_path: &Path, size: u64, summary: &mut MirrorSummary) {
        if is_complete(local_path, size).await {
            info!(remote = %remote_path, "Already downloaded, skipping");
            summary.skipped += 1;
            return;
        }

        info!(remote = %remote_path, size = size, "Downloading");
        match download_file(&self.remote, remote_path, local_path, size).await {
            Ok(sentinel) => {
                info!(remote = %remote_path, size = sentinel.size, crc32 = sentinel.crc32, "Downloaded");
                summary.downloaded += 1;
                summary.bytes_downloaded += sentinel.size;
            }
            Err(e) => {
                warn!(remote = %remote_path, error = %e, "Download failed");
                summary.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::{partial_path, sentinel_path};
    use crate::remote::{LocalTree, RemoteEntry};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use test_utils::{write_file, SatelliteTree};

    fn file_count() -> usize {
        SatelliteTree::FILES.len()
    }

    #[tokio::test]
    async fn test_first_run_downloads_everything() {
        let tree = SatelliteTree::create();
        let local = tempfile::tempdir().unwrap();
        let mirror = Mirror::new(LocalTree::new(tree.root()), local.path());

        let summary = mirror.run().await.unwrap();
        assert_eq!(summary.downloaded, file_count());
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.failed, 0);
        assert!(summary.is_success());

        for (rel, contents) in SatelliteTree::FILES {
            let path = local.path().join(rel);
            assert_eq!(std::fs::read(&path).unwrap(), contents, "{rel}");
            assert!(sentinel_path(&path).exists(), "{rel}");
        }
        let total: u64 = SatelliteTree::FILES.iter().map(|(_, c)| c.len() as u64).sum();
        assert_eq!(summary.bytes_downloaded, total);
    }

    #[tokio::test]
    async fn test_second_run_skips_everything() {
        let tree = SatelliteTree::create();
        let local = tempfile::tempdir().unwrap();
        let mirror = Mirror::new(LocalTree::new(tree.root()), local.path());

        mirror.run().await.unwrap();
        let summary = mirror.run().await.unwrap();
        assert_eq!(summary.downloaded, 0);
        assert_eq!(summary.skipped, file_count());
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_refetches_files_without_sentinel() {
        let tree = SatelliteTree::create();
        let local = tempfile::tempdir().unwrap();
        // Left behind by an interrupted presence-only run.
        write_file(local.path(), "L1C/2024-06-01/frame_0001.h5", b"frame-o");

        let mirror = Mirror::new(LocalTree::new(tree.root()), local.path());
        let summary = mirror.run().await.unwrap();
        assert_eq!(summary.downloaded, file_count());
        assert_eq!(
            std::fs::read(local.path().join("L1C/2024-06-01/frame_0001.h5")).unwrap(),
            b"frame-one-longer"
        );
    }

    #[tokio::test]
    async fn test_changed_remote_size_is_refetched() {
        let tree = SatelliteTree::create();
        let local = tempfile::tempdir().unwrap();
        let mirror = Mirror::new(LocalTree::new(tree.root()), local.path());
        mirror.run().await.unwrap();

        write_file(tree.root(), "README.txt", b"order 170570 amended");
        let summary = mirror.run().await.unwrap();
        assert_eq!(summary.downloaded, 1);
        assert_eq!(summary.skipped, file_count() - 1);
        assert_eq!(
            std::fs::read(local.path().join("README.txt")).unwrap(),
            b"order 170570 amended"
        );
    }

    #[tokio::test]
    async fn test_stale_partial_is_discarded() {
        let tree = SatelliteTree::create();
        let local = tempfile::tempdir().unwrap();
        let target = local.path().join("README.txt");
        std::fs::write(partial_path(&target), b"ord").unwrap();

        let mirror = Mirror::new(LocalTree::new(tree.root()), local.path());
        let summary = mirror.run().await.unwrap();
        assert!(summary.is_success());
        assert!(!partial_path(&target).exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"order 170570");
    }

    /// Delegates to a real tree but fails to fetch one path.
    struct FlakyTree {
        inner: LocalTree,
        broken: &'static str,
    }

    #[async_trait]
    impl RemoteTree for FlakyTree {
        async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>> {
            self.inner.list(path).await
        }

        async fn fetch(&self, path: &str, dest: &Path) -> Result<u64> {
            if path == self.broken {
                return Err(anyhow!("connection reset"));
            }
            self.inner.fetch(path, dest).await
        }
    }

    #[tokio::test]
    async fn test_failure_is_counted_and_walk_continues() {
        let tree = SatelliteTree::create();
        let local = tempfile::tempdir().unwrap();
        let remote = FlakyTree {
            inner: LocalTree::new(tree.root()),
            broken: "L1C/2024-06-01/frame_0000.h5",
        };
        let mirror = Mirror::new(remote, local.path());

        let summary = mirror.run().await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.downloaded, file_count() - 1);
        assert!(!summary.is_success());
        assert!(!local.path().join("L1C/2024-06-01/frame_0000.h5").exists());
        assert!(local.path().join("L1C/2024-06-02/frame_0002.h5").exists());
    }
}

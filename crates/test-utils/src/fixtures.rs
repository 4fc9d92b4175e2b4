//! Common test fixtures for rain-nowcast tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Encoded `.npy` payload of a `(channels, size, size)` tensor.
pub fn npy_bytes(shape: &[usize], data: &[f32]) -> Vec<u8> {
    npy_format::to_bytes_f32(shape, data).expect("fixture shape matches data")
}

/// Encoded all-zero classifier input of shape `(9, 64, 64)`.
pub fn zero_sample_npy() -> Vec<u8> {
    npy_bytes(&[9, 64, 64], &vec![0.0; 9 * 64 * 64])
}

/// A directory tree mimicking a satellite order:
///
/// ```text
/// root/
///   README.txt
///   L1C/
///     2024-06-01/
///       frame_0000.h5
///       frame_0001.h5
///     2024-06-02/
///       frame_0002.h5
/// ```
pub struct SatelliteTree {
    pub dir: TempDir,
}

impl SatelliteTree {
    pub const FILES: [(&'static str, &'static [u8]); 4] = [
        ("README.txt", b"order 170570"),
        ("L1C/2024-06-01/frame_0000.h5", b"frame-zero"),
        ("L1C/2024-06-01/frame_0001.h5", b"frame-one-longer"),
        ("L1C/2024-06-02/frame_0002.h5", b"frame-two"),
    ];

    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        for (rel, contents) in Self::FILES {
            write_file(dir.path(), rel, contents);
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture directories");
    }
    fs::write(&path, contents).expect("write fixture file");
    path
}

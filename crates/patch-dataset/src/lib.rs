//! Patch dataset preparation.
//!
//! Turns per-frame satellite patches into temporal samples for the
//! classifier and partitions them into train/val/test sets:
//!
//! 1. [`build_windows`] stacks the `history` most recent frames of every patch
//!    along the channel axis and pairs the stack with the label `lead` frames
//!    ahead.
//! 2. [`split_by_frames`] cuts the windowed dataset at fixed fractions of the
//!    frame count so no frame's patches end up in two splits.

pub mod error;
pub mod io;
pub mod split;
pub mod window;

pub use error::{DatasetError, DatasetResult};
pub use split::{split_by_frames, DatasetSplit, SplitFractions, SplitPart};
pub use window::{build_windows, PatchFrames, WindowedDataset};

use ndarray::ArrayView1;

/// Mean of a binary label vector, `None` when there are no labels.
pub fn event_ratio(labels: ArrayView1<'_, f32>) -> Option<f64> {
    if labels.is_empty() {
        return None;
    }
    let sum: f64 = labels.iter().map(|&v| v as f64).sum();
    Some(sum / labels.len() as f64)
}

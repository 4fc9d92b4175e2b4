//! Frame-contiguous train/val/test partitioning.
//!
//! Splits are cut on frame indices, not sample indices, and never shuffled:
//! adjacent frames are strongly correlated, so mixing them across splits
//! would leak the validation and test sets into training.

use std::ops::Range;

use ndarray::{s, Array1, Array4};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DatasetError, DatasetResult};
use crate::window::WindowedDataset;

/// Cumulative cut points as fractions of the frame count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitFractions {
    /// End of the training range.
    pub train_end: f64,
    /// End of the validation range; the test range runs to the last frame.
    pub val_end: f64,
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            train_end: 0.70,
            val_end: 0.85,
        }
    }
}

impl SplitFractions {
    pub fn validate(&self) -> DatasetResult<()> {
        let ordered = 0.0 <= self.train_end && self.train_end <= self.val_end && self.val_end <= 1.0;
        if !ordered {
            return Err(DatasetError::InvalidFractions(format!(
                "expected 0 <= train_end ({}) <= val_end ({}) <= 1",
                self.train_end, self.val_end
            )));
        }
        Ok(())
    }

    /// Frame ranges for train, val and test.
    pub fn frame_ranges(&self, frames: usize) -> [Range<usize>; 3] {
        // Truncation matches int(fraction * frames)
        let train_end = ((self.train_end * frames as f64) as usize).min(frames);
        let val_end = ((self.val_end * frames as f64) as usize).clamp(train_end, frames);
        [0..train_end, train_end..val_end, val_end..frames]
    }
}

/// One partition of the dataset, flattened back to samples.
#[derive(Debug, Clone)]
pub struct SplitPart {
    pub name: &'static str,
    pub frames: Range<usize>,
    pub images: Array4<f32>,
    pub labels: Array1<f32>,
}

impl SplitPart {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn event_ratio(&self) -> Option<f64> {
        crate::event_ratio(self.labels.view())
    }
}

#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: SplitPart,
    pub val: SplitPart,
    pub test: SplitPart,
}

impl DatasetSplit {
    pub fn parts(&self) -> [&SplitPart; 3] {
        [&self.train, &self.val, &self.test]
    }
}

/// Partition a windowed dataset into train/val/test by frame ranges.
pub fn split_by_frames(
    dataset: &WindowedDataset,
    fractions: SplitFractions,
) -> DatasetResult<DatasetSplit> {
    fractions.validate()?;

    let ppf = dataset.patches_per_frame;
    let frames = dataset.frames();
    let [train, val, test] = fractions.frame_ranges(frames);

    let take = |name: &'static str, range: Range<usize>| {
        let samples = range.start * ppf..range.end * ppf;
        let part = SplitPart {
            name,
            images: dataset.images.slice(s![samples.clone(), .., .., ..]).to_owned(),
            labels: dataset.labels.slice(s![samples]).to_owned(),
            frames: range,
        };
        info!(
            split = name,
            frames = ?part.frames,
            samples = part.len(),
            event_ratio = ?part.event_ratio(),
            "Split dataset"
        );
        part
    };

    Ok(DatasetSplit {
        train: take("train", train),
        val: take("val", val),
        test: take("test", test),
    })
}

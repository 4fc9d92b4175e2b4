//! Patch and temporal window geometry.
//!
//! A satellite frame is cut into a fixed grid of square patches. Samples fed
//! to the classifier stack `history` consecutive frames of one patch along the
//! channel axis, oldest frame first.

use serde::{Deserialize, Serialize};

/// Channels in a single satellite patch.
pub const FRAME_CHANNELS: usize = 3;

/// Patch edge length in pixels.
pub const PATCH_SIZE: usize = 64;

/// Patches per satellite frame.
pub const PATCHES_PER_FRAME: usize = 16;

/// Frames stacked into one sample.
pub const HISTORY: usize = 3;

/// Frames between the newest input frame and the labelled frame.
pub const LEAD: usize = 3;

/// Geometry of the windowed dataset and of classifier input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchGeometry {
    pub history: usize,
    pub lead: usize,
    pub patches_per_frame: usize,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl Default for PatchGeometry {
    fn default() -> Self {
        Self {
            history: HISTORY,
            lead: LEAD,
            patches_per_frame: PATCHES_PER_FRAME,
            channels: FRAME_CHANNELS,
            height: PATCH_SIZE,
            width: PATCH_SIZE,
        }
    }
}

impl PatchGeometry {
    /// Channels in a stacked sample (history × per-frame channels).
    pub fn stacked_channels(&self) -> usize {
        self.history * self.channels
    }

    /// Elements in one single-frame patch.
    pub fn patch_len(&self) -> usize {
        self.channels * self.height * self.width
    }

    /// Expected shape of one classifier input.
    pub fn sample_shape(&self) -> [usize; 3] {
        [self.stacked_channels(), self.height, self.width]
    }

    /// First frame index that has a full history window behind it.
    pub fn first_valid_frame(&self) -> usize {
        self.history.saturating_sub(1)
    }

    /// Number of frames that produce a sample out of `frames` input frames.
    ///
    /// Frames without a full history or without a label `lead` frames ahead
    /// are dropped, never padded.
    pub fn valid_frames(&self, frames: usize) -> usize {
        frames
            .saturating_sub(self.lead)
            .saturating_sub(self.first_valid_frame())
    }
}

/// Format a shape the way error messages print it: `(9,64,64)`.
pub fn format_shape(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    format!("({})", dims.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let geometry = PatchGeometry::default();
        assert_eq!(geometry.stacked_channels(), 9);
        assert_eq!(geometry.sample_shape(), [9, 64, 64]);
        assert_eq!(geometry.patch_len(), 3 * 64 * 64);
    }

    #[test]
    fn test_valid_frames() {
        let geometry = PatchGeometry::default();
        // frames - lead - (history - 1)
        assert_eq!(geometry.valid_frames(3074), 3069);
        assert_eq!(geometry.valid_frames(6), 1);
        assert_eq!(geometry.valid_frames(5), 0);
        assert_eq!(geometry.valid_frames(0), 0);
    }

    #[test]
    fn test_format_shape() {
        assert_eq!(format_shape(&[9, 64, 64]), "(9,64,64)");
        assert_eq!(format_shape(&[12]), "(12)");
    }
}

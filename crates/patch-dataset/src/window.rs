//! Sliding temporal windows over patch frames.

use ndarray::parallel::prelude::*;
use ndarray::{s, Array1, Array4, ArrayView1, ArrayView4, Axis};
use tracing::info;

use nowcast_common::geometry::format_shape;
use nowcast_common::PatchGeometry;

use crate::error::{DatasetError, DatasetResult};

/// Per-frame patches as they come off the patch extractor.
///
/// Images are `(frames × patches, channels, H, W)`, labels `(frames × patches,)`,
/// both frame-major.
#[derive(Debug, Clone)]
pub struct PatchFrames {
    pub images: Array4<f32>,
    pub labels: Array1<f32>,
}

impl PatchFrames {
    pub fn view(&self) -> (ArrayView4<'_, f32>, ArrayView1<'_, f32>) {
        (self.images.view(), self.labels.view())
    }
}

/// Stacked temporal samples, `(valid_frames × patches, history × channels, H, W)`.
#[derive(Debug, Clone)]
pub struct WindowedDataset {
    pub images: Array4<f32>,
    pub labels: Array1<f32>,
    pub patches_per_frame: usize,
}

impl WindowedDataset {
    /// Wrap already-windowed arrays (e.g. loaded back from disk).
    pub fn from_parts(
        images: Array4<f32>,
        labels: Array1<f32>,
        patches_per_frame: usize,
    ) -> DatasetResult<Self> {
        frame_count(images.len_of(Axis(0)), labels.len(), patches_per_frame)?;
        Ok(Self {
            images,
            labels,
            patches_per_frame,
        })
    }

    /// Number of temporal samples (frames that had a full window).
    pub fn frames(&self) -> usize {
        if self.patches_per_frame == 0 {
            return 0;
        }
        self.labels.len() / self.patches_per_frame
    }

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

/// Validate the flat sample count and return the number of frames.
pub(crate) fn frame_count(
    images: usize,
    labels: usize,
    patches_per_frame: usize,
) -> DatasetResult<usize> {
    if images != labels {
        return Err(DatasetError::LabelCountMismatch { images, labels });
    }
    if patches_per_frame == 0 || images % patches_per_frame != 0 {
        return Err(DatasetError::PartialFrame {
            len: images,
            patches_per_frame,
        });
    }
    Ok(images / patches_per_frame)
}

/// Build history-stacked samples with labels `lead` frames ahead.
///
/// For every frame `t` in `[history-1, frames-lead)` and every patch `p`, the
/// sample holds frames `t-history+1 ..= t` of patch `p` concatenated along
/// channels (oldest first) and the label of patch `p` at frame `t+lead`.
/// Frames outside that range are dropped.
pub fn build_windows(
    images: ArrayView4<'_, f32>,
    labels: ArrayView1<'_, f32>,
    geometry: &PatchGeometry,
) -> DatasetResult<WindowedDataset> {
    let (n, channels, height, width) = images.dim();
    if (channels, height, width) != (geometry.channels, geometry.height, geometry.width) {
        return Err(DatasetError::PatchShape {
            expected: format_shape(&[geometry.channels, geometry.height, geometry.width]),
            got: format_shape(&[channels, height, width]),
        });
    }

    let ppf = geometry.patches_per_frame;
    let frames = frame_count(n, labels.len(), ppf)?;
    let valid = geometry.valid_frames(frames);
    let first = geometry.first_valid_frame();

    let framed = images.to_shape((frames, ppf, channels, height, width))?;
    let framed_labels = labels.to_shape((frames, ppf))?;

    let mut out_images = Array4::<f32>::zeros((valid * ppf, geometry.stacked_channels(), height, width));
    let mut out_labels = Array1::<f32>::zeros(valid * ppf);

    out_images
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut sample)| {
            let t = first + i / ppf;
            let patch = i % ppf;
            for k in 0..geometry.history {
                let src = t + 1 + k - geometry.history;
                sample
                    .slice_mut(s![k * channels..(k + 1) * channels, .., ..])
                    .assign(&framed.slice(s![src, patch, .., .., ..]));
            }
        });

    for (i, label) in out_labels.iter_mut().enumerate() {
        let t = first + i / ppf;
        *label = framed_labels[[t + geometry.lead, i % ppf]];
    }

    let dataset = WindowedDataset {
        images: out_images,
        labels: out_labels,
        patches_per_frame: ppf,
    };

    info!(
        input_frames = frames,
        output_frames = valid,
        samples = dataset.len(),
        history = geometry.history,
        lead = geometry.lead,
        "Built temporal windows"
    );

    Ok(dataset)
}

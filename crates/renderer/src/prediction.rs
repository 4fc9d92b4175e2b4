//! Composition of the images returned with every prediction: the three input
//! frames as RGB and a Grad-CAM overlay on the oldest frame.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ndarray::{s, ArrayView2, ArrayView3};
use tracing::debug;

use crate::colormap::jet;
use crate::error::{RenderError, RenderResult};
use crate::png::create_png_rgb;
use crate::resample::resize_bilinear;
use crate::DISPLAY_SIZE;

/// Channels per satellite frame.
const FRAME_CHANNELS: usize = 3;

/// Added to the value range before dividing during normalization.
const RANGE_EPS: f32 = 1e-8;

/// Frame weight in the overlay; the heat map gets the remainder.
pub const OVERLAY_FRAME_WEIGHT: f32 = 0.6;

/// Interleaved RGB image with float components in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl RgbImage {
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn to_rgb8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }

    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        create_png_rgb(&self.to_rgb8(), self.width, self.height)
    }

    /// PNG bytes, base64 (standard alphabet, padded).
    pub fn to_base64_png(&self) -> RenderResult<String> {
        Ok(STANDARD.encode(self.to_png()?))
    }
}

/// Base64 PNGs returned to clients.
#[derive(Debug, Clone)]
pub struct PredictionImages {
    /// Oldest, middle and latest input frame.
    pub input_images: Vec<String>,
    /// Grad-CAM overlay on the oldest frame.
    pub gradcam: String,
}

impl PredictionImages {
    /// The oldest input frame.
    pub fn input_image(&self) -> &str {
        self.input_images.first().map(String::as_str).unwrap_or_default()
    }
}

/// Render one 3-channel frame: min-max normalize over all three channels,
/// then upscale to [`DISPLAY_SIZE`].
pub fn render_frame(patch: ArrayView3<'_, f32>) -> RenderResult<RgbImage> {
    let (channels, h, w) = patch.dim();
    if channels != FRAME_CHANNELS || h == 0 || w == 0 {
        return Err(RenderError::InvalidInput(format!(
            "frame must be (3, H, W), got ({channels}, {h}, {w})"
        )));
    }

    let min = patch.iter().copied().fold(f32::INFINITY, f32::min);
    let max = patch.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let denom = max - min + RANGE_EPS;

    let planes: Vec<Vec<f32>> = patch
        .outer_iter()
        .map(|plane| {
            let normalized: Vec<f32> = plane.iter().map(|v| (v - min) / denom).collect();
            resize_bilinear(&normalized, w, h, DISPLAY_SIZE, DISPLAY_SIZE)
        })
        .collect();

    let mut data = Vec::with_capacity(DISPLAY_SIZE * DISPLAY_SIZE * FRAME_CHANNELS);
    for i in 0..DISPLAY_SIZE * DISPLAY_SIZE {
        for plane in &planes {
            data.push(plane[i]);
        }
    }

    Ok(RgbImage {
        width: DISPLAY_SIZE,
        height: DISPLAY_SIZE,
        data,
    })
}

/// Blend a `[0, 1]` heat map over a frame: `0.6 * frame + 0.4 * jet(cam)`,
/// clipped. The map is bilinearly resized to the frame first.
pub fn render_overlay(frame: &RgbImage, cam: ArrayView2<'_, f32>) -> RenderResult<RgbImage> {
    let (ch, cw) = cam.dim();
    if ch == 0 || cw == 0 {
        return Err(RenderError::InvalidInput("empty activation map".into()));
    }
    let cam: Vec<f32> = cam.iter().copied().collect();
    let cam = resize_bilinear(&cam, cw, ch, frame.width, frame.height);

    let heat_weight = 1.0 - OVERLAY_FRAME_WEIGHT;
    let mut data = Vec::with_capacity(frame.data.len());
    for (pixel, value) in frame.data.chunks_exact(3).zip(&cam) {
        let heat = jet(*value);
        for c in 0..3 {
            data.push((OVERLAY_FRAME_WEIGHT * pixel[c] + heat_weight * heat[c]).clamp(0.0, 1.0));
        }
    }

    Ok(RgbImage {
        width: frame.width,
        height: frame.height,
        data,
    })
}

/// Render the three input frames of a `(9, H, W)` sample plus the overlay
/// of `cam` on the oldest one.
pub fn render_prediction_images(
    input: ArrayView3<'_, f32>,
    cam: ArrayView2<'_, f32>,
) -> RenderResult<PredictionImages> {
    let (channels, _, _) = input.dim();
    if channels % FRAME_CHANNELS != 0 || channels == 0 {
        return Err(RenderError::InvalidInput(format!(
            "expected a multiple of {FRAME_CHANNELS} channels, got {channels}"
        )));
    }

    let frames = (0..channels / FRAME_CHANNELS)
        .map(|k| render_frame(input.slice(s![k * FRAME_CHANNELS..(k + 1) * FRAME_CHANNELS, .., ..])))
        .collect::<RenderResult<Vec<_>>>()?;

    let overlay = render_overlay(&frames[0], cam)?;

    let input_images = frames
        .iter()
        .map(RgbImage::to_base64_png)
        .collect::<RenderResult<Vec<_>>>()?;
    let gradcam = overlay.to_base64_png()?;

    debug!(
        frames = input_images.len(),
        gradcam_bytes = gradcam.len(),
        "Rendered prediction images"
    );

    Ok(PredictionImages {
        input_images,
        gradcam,
    })
}

//! Image rendering for nowcast explanations.
//!
//! - PNG encoding (RGB and RGBA, zlib + CRC32)
//! - Bilinear resampling
//! - Jet colormap
//! - Input-frame and Grad-CAM overlay composition

pub mod colormap;
pub mod error;
pub mod png;
pub mod prediction;
pub mod resample;

pub use colormap::jet_colormap;
pub use error::{RenderError, RenderResult};
pub use png::{create_png, create_png_rgb};
pub use prediction::{render_frame, render_overlay, render_prediction_images, PredictionImages, RgbImage};
pub use resample::resize_bilinear;

/// Edge length of every rendered image.
pub const DISPLAY_SIZE: usize = 256;

//! Tests for PNG encoding and prediction image rendering.
//!
//! Encoded output is decoded again with the `image` crate so the tests check
//! real PNG validity, not just our own framing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ndarray::{Array2, Array3};
use renderer::{
    create_png, create_png_rgb, render_frame, render_prediction_images, resize_bilinear, DISPLAY_SIZE,
};
use test_utils::{create_ramp, create_storm_cell};

// ============================================================================
// Helper functions
// ============================================================================

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .expect("valid PNG")
        .to_rgba8()
}

fn sample(data: Vec<f32>) -> Array3<f32> {
    Array3::from_shape_vec((9, 64, 64), data).unwrap()
}

// ============================================================================
// PNG encoding
// ============================================================================

#[test]
fn test_rgba_png_decodes() {
    let pixels = [
        255, 0, 0, 255, // red
        0, 255, 0, 128, // green, half transparent
        0, 0, 255, 255, // blue
        0, 0, 0, 0,     // transparent
    ];
    let png = create_png(&pixels, 2, 2).unwrap();
    let img = decode(&png);

    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0, 128]);
    assert_eq!(img.get_pixel(0, 1).0, [0, 0, 255, 255]);
    assert_eq!(img.get_pixel(1, 1).0, [0, 0, 0, 0]);
}

#[test]
fn test_rgb_png_decodes() {
    let mut pixels = Vec::with_capacity(16 * 8 * 3);
    for y in 0..8u8 {
        for x in 0..16u8 {
            pixels.extend_from_slice(&[x * 16, y * 32, 100]);
        }
    }
    let png = create_png_rgb(&pixels, 16, 8).unwrap();
    let img = decode(&png);

    assert_eq!(img.dimensions(), (16, 8));
    assert_eq!(img.get_pixel(3, 5).0, [48, 160, 100, 255]);
}

#[test]
fn test_png_compresses_flat_image() {
    let pixels = vec![7u8; 256 * 256 * 3];
    let png = create_png_rgb(&pixels, 256, 256).unwrap();
    assert!(png.len() < pixels.len() / 10);
}

// ============================================================================
// Resampling
// ============================================================================

#[test]
fn test_resize_heatmap_to_display() {
    let mut cam = vec![0.0f32; 16 * 16];
    cam[0] = 1.0;
    let out = resize_bilinear(&cam, 16, 16, DISPLAY_SIZE, DISPLAY_SIZE);

    assert_eq!(out.len(), DISPLAY_SIZE * DISPLAY_SIZE);
    // top-left corner clamps onto the hot source pixel
    assert_eq!(out[0], 1.0);
    assert_eq!(out[DISPLAY_SIZE * DISPLAY_SIZE - 1], 0.0);
    assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
}

// ============================================================================
// Prediction images
// ============================================================================

#[test]
fn test_render_frame_storm_cell() {
    let input = sample(create_storm_cell(9, 64));
    let frame = render_frame(input.slice(ndarray::s![0..3, .., ..])).unwrap();

    let bright = frame.pixel(10, 10);
    let dark = frame.pixel(240, 240);
    assert!(bright.iter().all(|v| (v - 1.0).abs() < 1e-5));
    assert!(dark.iter().all(|v| v.abs() < 1e-5));
}

#[test]
fn test_prediction_images_are_three_frames_and_overlay() {
    let input = sample(create_ramp(9, 64));
    let cam = Array2::from_shape_fn((16, 16), |(y, x)| if y < 8 && x < 8 { 1.0 } else { 0.0 });

    let images = render_prediction_images(input.view(), cam.view()).unwrap();
    assert_eq!(images.input_images.len(), 3);
    assert_eq!(images.input_image(), images.input_images[0]);

    for encoded in images.input_images.iter().chain(std::iter::once(&images.gradcam)) {
        let png = STANDARD.decode(encoded).unwrap();
        let img = decode(&png);
        assert_eq!(img.dimensions(), (DISPLAY_SIZE as u32, DISPLAY_SIZE as u32));
    }

    // hot corner is red-shifted, cold corner blue-shifted
    let overlay = decode(&STANDARD.decode(&images.gradcam).unwrap());
    let hot = overlay.get_pixel(5, 5).0;
    let cold = overlay.get_pixel(250, 250).0;
    assert!(hot[0] > hot[2]);
    assert!(cold[2] > 0);
}

#[test]
fn test_prediction_images_reject_bad_channel_count() {
    let input = Array3::<f32>::zeros((8, 64, 64));
    let cam = Array2::<f32>::zeros((16, 16));
    assert!(render_prediction_images(input.view(), cam.view()).is_err());
}

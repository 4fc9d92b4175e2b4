//! Bilinear resampling of single-channel grids.

use rayon::prelude::*;

/// Resample row-major grid data to a different resolution using bilinear
/// interpolation.
///
/// Pixel centres are aligned (`src = (dst + 0.5) * scale - 0.5`) and
/// out-of-range taps clamp to the edge, so upscaling a constant grid stays
/// constant and edge pixels are not darkened.
///
/// # Arguments
/// - `data`: Input grid data (row-major order)
/// - `src_width`, `src_height`: Source grid size
/// - `dst_width`, `dst_height`: Requested output size
pub fn resize_bilinear(
    data: &[f32],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<f32> {
    if src_width == dst_width && src_height == dst_height {
        return data.to_vec();
    }
    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return vec![0.0; dst_width * dst_height];
    }

    let x_scale = src_width as f32 / dst_width as f32;
    let y_scale = src_height as f32 / dst_height as f32;

    let taps = |dst: usize, scale: f32, src_len: usize| {
        let src = ((dst as f32 + 0.5) * scale - 0.5).max(0.0);
        let i0 = (src.floor() as usize).min(src_len - 1);
        let i1 = (i0 + 1).min(src_len - 1);
        (i0, i1, src - i0 as f32)
    };
    let x_taps: Vec<(usize, usize, f32)> = (0..dst_width).map(|x| taps(x, x_scale, src_width)).collect();

    let mut output = vec![0.0f32; dst_width * dst_height];
    output
        .par_chunks_mut(dst_width)
        .enumerate()
        .for_each(|(y, row)| {
            let (y1, y2, dy) = taps(y, y_scale, src_height);
            let top = &data[y1 * src_width..(y1 + 1) * src_width];
            let bottom = &data[y2 * src_width..(y2 + 1) * src_width];
            for (out, &(x1, x2, dx)) in row.iter_mut().zip(&x_taps) {
                let v1 = top[x1] * (1.0 - dx) + top[x2] * dx;
                let v2 = bottom[x1] * (1.0 - dx) + bottom[x2] * dx;
                *out = v1 * (1.0 - dy) + v2 * dy;
            }
        });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_size() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(resize_bilinear(&data, 2, 2, 2, 2), data);
    }

    #[test]
    fn test_constant_stays_constant() {
        let data = vec![0.25f32; 16 * 16];
        let out = resize_bilinear(&data, 16, 16, 256, 256);
        assert_eq!(out.len(), 256 * 256);
        assert!(out.iter().all(|v| (v - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_upscale_interpolates_between_centres() {
        // 2 px -> 4 px: centres at -0.25, 0.25, 0.75, 1.25 in source space
        let out = resize_bilinear(&[0.0, 1.0], 2, 1, 4, 1);
        assert_eq!(out, vec![0.0, 0.25, 0.75, 1.0]);
    }

    #[test]
    fn test_downscale_by_two_averages_pairs() {
        let out = resize_bilinear(&[0.0, 1.0, 2.0, 3.0], 4, 1, 2, 1);
        assert_eq!(out, vec![0.5, 2.5]);
    }
}

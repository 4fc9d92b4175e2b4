//! Test data generators for creating synthetic satellite-like patches.
//!
//! Values are chosen so a test can tell where any pixel came from after the
//! data has been reshaped.

/// Value stored at every pixel of `(frame, patch, channel)`.
///
/// `frame * 1000 + patch * 10 + channel`, so a windowed sample can be decoded
/// back to the frames it was stacked from.
pub fn tagged_value(frame: usize, patch: usize, channel: usize) -> f32 {
    (frame * 1000 + patch * 10 + channel) as f32
}

/// Flat `(frames × patches, channels, size, size)` image data filled with
/// [`tagged_value`].
///
/// # Example
///
/// ```
/// use test_utils::{create_tagged_patches, tagged_value};
///
/// let data = create_tagged_patches(4, 2, 3, 1);
/// assert_eq!(data.len(), 4 * 2 * 3);
/// assert_eq!(data[0], tagged_value(0, 0, 0));
/// assert_eq!(data[3], tagged_value(0, 1, 0));
/// ```
pub fn create_tagged_patches(
    frames: usize,
    patches: usize,
    channels: usize,
    size: usize,
) -> Vec<f32> {
    let mut data = Vec::with_capacity(frames * patches * channels * size * size);
    for frame in 0..frames {
        for patch in 0..patches {
            for channel in 0..channels {
                let value = tagged_value(frame, patch, channel);
                data.extend(std::iter::repeat(value).take(size * size));
            }
        }
    }
    data
}

/// Flat `(frames × patches,)` binary labels with a deterministic pattern.
///
/// Label is 1 when `(frame + patch) % 3 == 0`.
pub fn create_pattern_labels(frames: usize, patches: usize) -> Vec<f32> {
    let mut labels = Vec::with_capacity(frames * patches);
    for frame in 0..frames {
        for patch in 0..patches {
            labels.push(if (frame + patch) % 3 == 0 { 1.0 } else { 0.0 });
        }
    }
    labels
}

/// A `(channels, size, size)` tensor with a bright square in the top-left
/// quadrant of every channel over a dim background.
pub fn create_storm_cell(channels: usize, size: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(channels * size * size);
    for _ in 0..channels {
        for y in 0..size {
            for x in 0..size {
                let inside = y < size / 2 && x < size / 2;
                data.push(if inside { 0.9 } else { 0.1 });
            }
        }
    }
    data
}

/// A `(channels, size, size)` horizontal ramp from 0 to 1.
pub fn create_ramp(channels: usize, size: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(channels * size * size);
    for c in 0..channels {
        for _y in 0..size {
            for x in 0..size {
                let base = x as f32 / (size.max(2) - 1) as f32;
                data.push(base * (1.0 + c as f32 * 0.1));
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_patches_layout() {
        let data = create_tagged_patches(2, 3, 3, 2);
        // frame 1, patch 2, channel 1, pixel 3
        let idx = ((1 * 3 + 2) * 3 + 1) * 4 + 3;
        assert_eq!(data[idx], tagged_value(1, 2, 1));
    }

    #[test]
    fn test_pattern_labels() {
        let labels = create_pattern_labels(3, 2);
        assert_eq!(labels, vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_storm_cell_has_two_levels() {
        let data = create_storm_cell(1, 4);
        assert_eq!(data[0], 0.9);
        assert_eq!(data[15], 0.1);
    }
}

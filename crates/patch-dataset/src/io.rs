//! Loading and saving dataset arrays as `.npy` files.

use std::path::Path;

use ndarray::{Array1, Array4};
use tracing::info;

use npy_format::NpyArray;

use crate::error::{DatasetError, DatasetResult};
use nowcast_common::geometry::format_shape;

/// Convert a decoded `.npy` array into a 4-D image stack.
pub fn images_from_npy(array: NpyArray) -> DatasetResult<Array4<f32>> {
    let (shape, data) = array.into_parts();
    if shape.len() != 4 {
        return Err(DatasetError::PatchShape {
            expected: "(N,C,H,W)".to_string(),
            got: format_shape(&shape),
        });
    }
    Ok(Array4::from_shape_vec(
        (shape[0], shape[1], shape[2], shape[3]),
        data,
    )?)
}

/// Convert a decoded `.npy` array into a flat label vector.
///
/// Any shape is accepted and flattened, matching `reshape(-1)`.
pub fn labels_from_npy(array: NpyArray) -> Array1<f32> {
    let (_, data) = array.into_parts();
    Array1::from_vec(data)
}

pub fn load_images(path: &Path) -> DatasetResult<Array4<f32>> {
    let images = images_from_npy(npy_format::read_file(path)?)?;
    info!(path = %path.display(), shape = ?images.shape(), "Loaded images");
    Ok(images)
}

pub fn load_labels(path: &Path) -> DatasetResult<Array1<f32>> {
    let labels = labels_from_npy(npy_format::read_file(path)?);
    info!(path = %path.display(), len = labels.len(), "Loaded labels");
    Ok(labels)
}

pub fn save_images(path: &Path, images: &Array4<f32>) -> DatasetResult<()> {
    let standard = images.as_standard_layout();
    let data = standard
        .as_slice()
        .ok_or_else(|| DatasetError::PatchShape {
            expected: "contiguous array".to_string(),
            got: format_shape(images.shape()),
        })?;
    npy_format::write_file_f32(path, images.shape(), data)?;
    info!(path = %path.display(), shape = ?images.shape(), "Saved images");
    Ok(())
}

/// Save binary labels as `u8` (values are rounded, so 0.0/1.0 stay exact).
pub fn save_labels(path: &Path, labels: &Array1<f32>) -> DatasetResult<()> {
    let data: Vec<u8> = labels
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    npy_format::write_file_u8(path, &[data.len()], &data)?;
    info!(path = %path.display(), len = data.len(), "Saved labels");
    Ok(())
}

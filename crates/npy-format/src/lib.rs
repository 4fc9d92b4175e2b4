//! NumPy `.npy` reader and writer.
//!
//! Datasets and API payloads are exchanged as `.npy` files. This crate reads
//! every numeric dtype NumPy commonly emits into an `f32` array and writes
//! `f32` and `u8` arrays back out. Only C-order (row-major) arrays are
//! supported.
//!
//! ```
//! use npy_format::{NpyArray, to_bytes_f32, parse};
//!
//! let bytes = to_bytes_f32(&[2, 3], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! let array: NpyArray = parse(&bytes).unwrap();
//! assert_eq!(array.shape(), &[2, 3]);
//! ```

pub mod dtype;
pub mod error;
pub mod header;
mod reader;
mod writer;

pub use dtype::{Dtype, Endian, ScalarKind};
pub use error::{NpyError, NpyResult};
pub use header::Header;
pub use reader::{parse, read_file};
pub use writer::{to_bytes_f32, to_bytes_u8, write_file_f32, write_file_u8, NpyElement};

/// Magic string at the start of every `.npy` file.
pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// A decoded array: shape plus row-major data converted to `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl NpyArray {
    /// Build an array, checking that the data length matches the shape.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> NpyResult<Self> {
        let expected = header::checked_element_count(&shape)?;
        if expected != data.len() {
            return Err(NpyError::ShapeMismatch {
                shape,
                len: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<f32>) {
        (self.shape, self.data)
    }
}

//! Encoding arrays as version 1.0 `.npy` files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::dtype::Dtype;
use crate::error::{NpyError, NpyResult};
use crate::header::{checked_element_count, Header};
use crate::MAGIC;

/// Element types that can be written.
pub trait NpyElement: Copy {
    const DTYPE: Dtype;

    fn write_le(&self, out: &mut Vec<u8>);
}

impl NpyElement for f32 {
    const DTYPE: Dtype = Dtype::F32;

    fn write_le(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl NpyElement for u8 {
    const DTYPE: Dtype = Dtype::U8;

    fn write_le(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

fn encode<T: NpyElement>(shape: &[usize], data: &[T]) -> NpyResult<Vec<u8>> {
    let expected = checked_element_count(shape)?;
    if data.len() != expected {
        return Err(NpyError::ShapeMismatch {
            shape: shape.to_vec(),
            len: data.len(),
        });
    }

    let header = Header {
        dtype: T::DTYPE,
        fortran_order: false,
        shape: shape.to_vec(),
    }
    .encode_v1();

    let mut out = Vec::with_capacity(8 + header.len() + data.len() * T::DTYPE.size);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&header);
    for value in data {
        value.write_le(&mut out);
    }
    Ok(out)
}

/// Encode an `f32` array.
pub fn to_bytes_f32(shape: &[usize], data: &[f32]) -> NpyResult<Vec<u8>> {
    encode(shape, data)
}

/// Encode a `u8` array.
pub fn to_bytes_u8(shape: &[usize], data: &[u8]) -> NpyResult<Vec<u8>> {
    encode(shape, data)
}

fn write_file<T: NpyElement>(path: &Path, shape: &[usize], data: &[T]) -> NpyResult<()> {
    let bytes = encode(shape, data)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

pub fn write_file_f32(path: &Path, shape: &[usize], data: &[f32]) -> NpyResult<()> {
    write_file(path, shape, data)
}

pub fn write_file_u8(path: &Path, shape: &[usize], data: &[u8]) -> NpyResult<()> {
    write_file(path, shape, data)
}

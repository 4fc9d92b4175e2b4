//! Decoding `.npy` bytes.

use std::path::Path;

use tracing::debug;

use crate::error::{NpyError, NpyResult};
use crate::header::Header;
use crate::{NpyArray, MAGIC};

/// Parse an in-memory `.npy` file into an `f32` array.
pub fn parse(bytes: &[u8]) -> NpyResult<NpyArray> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(NpyError::InvalidMagic);
    }

    let (major, minor) = (bytes[6], bytes[7]);
    let (header_len, header_start) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(NpyError::Truncated {
                    expected: 12,
                    actual: bytes.len(),
                });
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
            (len, 12)
        }
        _ => return Err(NpyError::UnsupportedVersion { major, minor }),
    };

    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(NpyError::Truncated {
            expected: data_start,
            actual: bytes.len(),
        });
    }

    // v3 allows utf-8 headers; v1/v2 are latin-1 which is ASCII for every valid dict
    let text = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|e| NpyError::InvalidHeader(e.to_string()))?;
    let header = Header::parse(text)?;

    if header.fortran_order && header.shape.len() > 1 {
        return Err(NpyError::FortranOrder);
    }

    let count = header.element_count()?;
    let item = header.dtype.size;
    let payload = &bytes[data_start..];
    let expected = count
        .checked_mul(item)
        .ok_or_else(|| NpyError::InvalidHeader(format!("shape {:?} overflows", header.shape)))?;
    if payload.len() < expected {
        return Err(NpyError::Truncated {
            expected,
            actual: payload.len(),
        });
    }

    let data: Vec<f32> = payload[..expected]
        .chunks_exact(item)
        .map(|chunk| header.dtype.decode(chunk))
        .collect();

    debug!(
        shape = ?header.shape,
        dtype = %header.dtype.descr(),
        "Decoded .npy array"
    );

    NpyArray::new(header.shape, data)
}

/// Read and parse a `.npy` file from disk.
pub fn read_file(path: &Path) -> NpyResult<NpyArray> {
    let bytes = std::fs::read(path)?;
    parse(&bytes)
}

//! The Python-literal dictionary that describes a `.npy` payload.
//!
//! A header looks like
//! `{'descr': '<f4', 'fortran_order': False, 'shape': (16, 9, 64, 64), }`
//! padded with spaces and terminated by a newline.

use crate::dtype::Dtype;
use crate::error::{NpyError, NpyResult};

/// Header alignment required by the format (magic + version + length + dict).
const HEADER_ALIGN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub dtype: Dtype,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

impl Header {
    /// Parse the header dictionary text.
    pub fn parse(text: &str) -> NpyResult<Self> {
        let text = text.trim_end_matches(['\n', ' ', '\0']).trim();
        let body = text
            .strip_prefix('{')
            .and_then(|t| t.strip_suffix('}'))
            .ok_or_else(|| NpyError::InvalidHeader(format!("not a dict: {}", text)))?;

        let descr = value_after(body, "descr")?;
        let descr = descr
            .trim()
            .trim_matches(|c| c == '\'' || c == '"')
            .to_string();
        let dtype = Dtype::parse(&descr)?;

        let fortran_order = match value_after(body, "fortran_order")?.trim() {
            v if v.starts_with("True") => true,
            v if v.starts_with("False") => false,
            other => {
                return Err(NpyError::InvalidHeader(format!(
                    "bad fortran_order value: {}",
                    other
                )))
            }
        };

        let shape = parse_shape(value_after(body, "shape")?)?;

        Ok(Self {
            dtype,
            fortran_order,
            shape,
        })
    }

    /// Number of elements described by the shape. A scalar (`()`) has one.
    pub fn element_count(&self) -> NpyResult<usize> {
        checked_element_count(&self.shape)
    }

    /// Render a version 1.0 header block: length prefix + padded dictionary.
    ///
    /// The returned bytes start right after the 8-byte magic/version preamble.
    pub fn encode_v1(&self) -> Vec<u8> {
        let dims: Vec<String> = self.shape.iter().map(|d| d.to_string()).collect();
        let shape = if dims.len() == 1 {
            format!("({},)", dims[0])
        } else {
            format!("({})", dims.join(", "))
        };
        let dict = format!(
            "{{'descr': '{}', 'fortran_order': {}, 'shape': {}, }}",
            self.dtype.descr(),
            if self.fortran_order { "True" } else { "False" },
            shape
        );

        // magic(6) + version(2) + length(2) + dict + newline, rounded up
        let unpadded = 10 + dict.len() + 1;
        let pad = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
        let header_len = dict.len() + pad + 1;

        let mut out = Vec::with_capacity(2 + header_len);
        out.extend_from_slice(&(header_len as u16).to_le_bytes());
        out.extend_from_slice(dict.as_bytes());
        out.extend(std::iter::repeat(b' ').take(pad));
        out.push(b'\n');
        out
    }
}

/// Slice of `body` holding the value for `'key'`, up to the next top-level comma.
fn value_after<'a>(body: &'a str, key: &str) -> NpyResult<&'a str> {
    let quoted = [format!("'{}'", key), format!("\"{}\"", key)];
    let start = quoted
        .iter()
        .find_map(|q| body.find(q.as_str()).map(|i| i + q.len()))
        .ok_or_else(|| NpyError::InvalidHeader(format!("missing key '{}'", key)))?;

    let rest = body[start..].trim_start();
    let rest = rest
        .strip_prefix(':')
        .ok_or_else(|| NpyError::InvalidHeader(format!("missing ':' after '{}'", key)))?;

    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Ok(&rest[..i]),
            _ => {}
        }
    }
    Ok(rest)
}

/// Product of `shape`, failing instead of wrapping on overflow.
pub fn checked_element_count(shape: &[usize]) -> NpyResult<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| NpyError::InvalidHeader(format!("shape {:?} overflows", shape)))
}

fn parse_shape(value: &str) -> NpyResult<Vec<usize>> {
    let inner = value
        .trim()
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| NpyError::InvalidHeader(format!("bad shape: {}", value.trim())))?;

    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        // Python 2 era writers emit long literals such as `3L`
        .map(|s| s.trim_end_matches('L'))
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| NpyError::InvalidHeader(format!("bad dimension: {}", s)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numpy_header() {
        let header = Header::parse(
            "{'descr': '<f4', 'fortran_order': False, 'shape': (16, 9, 64, 64), }          \n",
        )
        .unwrap();
        assert_eq!(header.dtype, Dtype::F32);
        assert!(!header.fortran_order);
        assert_eq!(header.shape, vec![16, 9, 64, 64]);
        assert_eq!(header.element_count().unwrap(), 16 * 9 * 64 * 64);
    }

    #[test]
    fn test_parse_one_dim_and_scalar() {
        let header = Header::parse("{'descr': '|u1', 'fortran_order': False, 'shape': (49,), }").unwrap();
        assert_eq!(header.shape, vec![49]);

        let scalar = Header::parse("{'descr': '<f8', 'fortran_order': False, 'shape': (), }").unwrap();
        assert!(scalar.shape.is_empty());
        assert_eq!(scalar.element_count().unwrap(), 1);
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let header =
            Header::parse("{'shape': (2, 3), 'fortran_order': True, 'descr': '<i8'}").unwrap();
        assert_eq!(header.shape, vec![2, 3]);
        assert!(header.fortran_order);
    }

    #[test]
    fn test_missing_key() {
        let err = Header::parse("{'descr': '<f4', 'shape': (2,), }").unwrap_err();
        assert!(err.to_string().contains("fortran_order"));
    }

    #[test]
    fn test_element_count_overflow() {
        let header = Header::parse(
            "{'descr': '<f4', 'fortran_order': False, 'shape': (4294967296, 4294967296, 2), }",
        )
        .unwrap();
        assert!(matches!(header.element_count(), Err(NpyError::InvalidHeader(_))));
    }

    #[test]
    fn test_encoded_header_is_aligned() {
        let header = Header {
            dtype: Dtype::F32,
            fortran_order: false,
            shape: vec![9, 64, 64],
        };
        let encoded = header.encode_v1();
        // 8-byte preamble + length + dict
        assert_eq!((8 + encoded.len()) % HEADER_ALIGN, 0);
        assert_eq!(*encoded.last().unwrap(), b'\n');

        let dict = std::str::from_utf8(&encoded[2..]).unwrap();
        assert_eq!(Header::parse(dict).unwrap(), header);
    }
}

//! NumPy dtype descriptors (`'<f4'`, `'|u1'`, ...).

use crate::error::{NpyError, NpyResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
    /// Single-byte types (`|`).
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Float,
    Signed,
    Unsigned,
    Bool,
}

/// A parsed dtype descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dtype {
    pub kind: ScalarKind,
    pub size: usize,
    pub endian: Endian,
}

impl Dtype {
    pub const F32: Dtype = Dtype {
        kind: ScalarKind::Float,
        size: 4,
        endian: Endian::Little,
    };

    pub const U8: Dtype = Dtype {
        kind: ScalarKind::Unsigned,
        size: 1,
        endian: Endian::NotApplicable,
    };

    /// Parse a descriptor such as `<f4`, `>i8`, `|b1` or `u1`.
    pub fn parse(descr: &str) -> NpyResult<Self> {
        let unsupported = || NpyError::UnsupportedDtype(descr.to_string());

        let mut chars = descr.chars();
        let (endian, rest) = match chars.next() {
            Some('<') => (Endian::Little, chars.as_str()),
            Some('>') => (Endian::Big, chars.as_str()),
            Some('|') => (Endian::NotApplicable, chars.as_str()),
            // '=' is native order; every target we build for is little-endian
            Some('=') => (Endian::Little, chars.as_str()),
            Some(_) => (Endian::NotApplicable, descr),
            None => return Err(unsupported()),
        };

        let mut rest_chars = rest.chars();
        let kind = match rest_chars.next() {
            Some('f') => ScalarKind::Float,
            Some('i') => ScalarKind::Signed,
            Some('u') => ScalarKind::Unsigned,
            Some('b') => ScalarKind::Bool,
            _ => return Err(unsupported()),
        };
        let size: usize = rest_chars.as_str().parse().map_err(|_| unsupported())?;

        let supported = match kind {
            ScalarKind::Float => matches!(size, 4 | 8),
            ScalarKind::Signed | ScalarKind::Unsigned => matches!(size, 1 | 2 | 4 | 8),
            ScalarKind::Bool => size == 1,
        };
        if !supported {
            return Err(unsupported());
        }

        // Multi-byte types must say which end is which
        let endian = if size == 1 {
            Endian::NotApplicable
        } else if endian == Endian::NotApplicable {
            return Err(unsupported());
        } else {
            endian
        };

        Ok(Self { kind, size, endian })
    }

    /// Descriptor string as written into a header.
    pub fn descr(&self) -> String {
        let order = match self.endian {
            Endian::Little => '<',
            Endian::Big => '>',
            Endian::NotApplicable => '|',
        };
        let kind = match self.kind {
            ScalarKind::Float => 'f',
            ScalarKind::Signed => 'i',
            ScalarKind::Unsigned => 'u',
            ScalarKind::Bool => 'b',
        };
        format!("{}{}{}", order, kind, self.size)
    }

    /// Decode one element to `f32`. `bytes` must be exactly `self.size` long.
    pub(crate) fn decode(&self, bytes: &[u8]) -> f32 {
        macro_rules! read {
            ($ty:ty) => {{
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                match self.endian {
                    Endian::Big => <$ty>::from_be_bytes(buf),
                    _ => <$ty>::from_le_bytes(buf),
                }
            }};
        }

        match (self.kind, self.size) {
            (ScalarKind::Float, 4) => read!(f32),
            (ScalarKind::Float, 8) => read!(f64) as f32,
            (ScalarKind::Signed, 1) => bytes[0] as i8 as f32,
            (ScalarKind::Signed, 2) => read!(i16) as f32,
            (ScalarKind::Signed, 4) => read!(i32) as f32,
            (ScalarKind::Signed, 8) => read!(i64) as f32,
            (ScalarKind::Unsigned, 1) => bytes[0] as f32,
            (ScalarKind::Unsigned, 2) => read!(u16) as f32,
            (ScalarKind::Unsigned, 4) => read!(u32) as f32,
            (ScalarKind::Unsigned, 8) => read!(u64) as f32,
            (ScalarKind::Bool, _) => {
                if bytes[0] != 0 {
                    1.0
                } else {
                    0.0
                }
            }
            // Dtype::parse rejects every other combination
            _ => f32::NAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_descriptors() {
        assert_eq!(Dtype::parse("<f4").unwrap(), Dtype::F32);
        assert_eq!(Dtype::parse("|u1").unwrap(), Dtype::U8);
        assert_eq!(Dtype::parse("u1").unwrap(), Dtype::U8);

        let big = Dtype::parse(">i8").unwrap();
        assert_eq!(big.kind, ScalarKind::Signed);
        assert_eq!(big.endian, Endian::Big);

        let flag = Dtype::parse("|b1").unwrap();
        assert_eq!(flag.kind, ScalarKind::Bool);
    }

    #[test]
    fn test_rejects_unsupported() {
        assert!(Dtype::parse("<c16").is_err());
        assert!(Dtype::parse("|O").is_err());
        assert!(Dtype::parse("<f2").is_err());
        assert!(Dtype::parse("|f4").is_err());
        assert!(Dtype::parse("").is_err());
    }

    #[test]
    fn test_decode_big_endian() {
        let dtype = Dtype::parse(">f4").unwrap();
        assert_eq!(dtype.decode(&1.5f32.to_be_bytes()), 1.5);

        let dtype = Dtype::parse(">i2").unwrap();
        assert_eq!(dtype.decode(&(-3i16).to_be_bytes()), -3.0);
    }

    #[test]
    fn test_descr_roundtrip_text() {
        assert_eq!(Dtype::F32.descr(), "<f4");
        assert_eq!(Dtype::U8.descr(), "|u1");
    }
}

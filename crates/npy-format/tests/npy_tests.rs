//! Tests for .npy parsing against hand-assembled files.

use npy_format::{parse, read_file, to_bytes_f32, to_bytes_u8, write_file_f32, NpyError};

/// Assemble a .npy file the way NumPy lays it out.
fn build_npy(version: (u8, u8), dict: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = b"\x93NUMPY".to_vec();
    out.push(version.0);
    out.push(version.1);
    let header = format!("{}\n", dict);
    if version.0 == 1 {
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    } else {
        out.extend_from_slice(&(header.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}

#[test]
fn test_parse_float64_converts_to_f32() {
    let payload: Vec<u8> = [0.25f64, -1.0, 3.5]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let bytes = build_npy(
        (1, 0),
        "{'descr': '<f8', 'fortran_order': False, 'shape': (3,), }",
        &payload,
    );

    let array = parse(&bytes).unwrap();
    assert_eq!(array.shape(), &[3]);
    assert_eq!(array.data(), &[0.25, -1.0, 3.5]);
}

#[test]
fn test_parse_int64_labels() {
    let payload: Vec<u8> = [0i64, 1, 1, 0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let bytes = build_npy(
        (1, 0),
        "{'descr': '<i8', 'fortran_order': False, 'shape': (2, 2), }",
        &payload,
    );

    let array = parse(&bytes).unwrap();
    assert_eq!(array.shape(), &[2, 2]);
    assert_eq!(array.data(), &[0.0, 1.0, 1.0, 0.0]);
}

#[test]
fn test_parse_version_two_bool() {
    let bytes = build_npy(
        (2, 0),
        "{'descr': '|b1', 'fortran_order': False, 'shape': (4,), }",
        &[1, 0, 0, 1],
    );
    let array = parse(&bytes).unwrap();
    assert_eq!(array.data(), &[1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_rejects_garbage() {
    assert!(matches!(parse(b"PK\x03\x04 not numpy"), Err(NpyError::InvalidMagic)));
    assert!(matches!(parse(b""), Err(NpyError::InvalidMagic)));
}

#[test]
fn test_rejects_truncated_payload() {
    let bytes = build_npy(
        (1, 0),
        "{'descr': '<f4', 'fortran_order': False, 'shape': (4,), }",
        &[0u8; 8],
    );
    match parse(&bytes) {
        Err(NpyError::Truncated { expected, actual }) => {
            assert_eq!(expected, 16);
            assert_eq!(actual, 8);
        }
        other => panic!("expected truncation error, got {:?}", other),
    }
}

#[test]
fn test_rejects_fortran_order() {
    let bytes = build_npy(
        (1, 0),
        "{'descr': '<f4', 'fortran_order': True, 'shape': (2, 2), }",
        &[0u8; 16],
    );
    assert!(matches!(parse(&bytes), Err(NpyError::FortranOrder)));
}

#[test]
fn test_rejects_unknown_version() {
    let mut bytes = to_bytes_f32(&[1], &[1.0]).unwrap();
    bytes[6] = 9;
    assert!(matches!(
        parse(&bytes),
        Err(NpyError::UnsupportedVersion { major: 9, .. })
    ));
}

#[test]
fn test_written_file_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patch.npy");
    let data: Vec<f32> = (0..9 * 4 * 4).map(|i| i as f32 * 0.5).collect();

    write_file_f32(&path, &[9, 4, 4], &data).unwrap();
    let array = read_file(&path).unwrap();

    assert_eq!(array.shape(), &[9, 4, 4]);
    assert_eq!(array.data()[17], 8.5);
}

#[test]
fn test_u8_labels_keep_values() {
    let bytes = to_bytes_u8(&[5], &[0, 1, 0, 1, 1]).unwrap();
    let array = parse(&bytes).unwrap();
    assert_eq!(array.data(), &[0.0, 1.0, 0.0, 1.0, 1.0]);
}

#[test]
fn test_writer_checks_length() {
    let err = to_bytes_f32(&[2, 2], &[1.0, 2.0, 3.0]).unwrap_err();
    assert!(matches!(err, NpyError::ShapeMismatch { len: 3, .. }));
}

#[test]
fn test_rejects_overflowing_shape() {
    let bytes = build_npy(
        (1, 0),
        "{'descr': '<f4', 'fortran_order': False, 'shape': (4294967296, 4294967296, 2), }",
        &[0u8; 16],
    );
    let err = parse(&bytes).unwrap_err();
    assert!(matches!(err, NpyError::InvalidHeader(_)), "{err}");
}

#[test]
fn test_rejects_overflowing_byte_count() {
    // Element count fits, element count × 8 bytes does not.
    let dict = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({},), }}",
        usize::MAX / 4
    );
    let bytes = build_npy((1, 0), &dict, &[0u8; 16]);
    let err = parse(&bytes).unwrap_err();
    assert!(matches!(err, NpyError::InvalidHeader(_)), "{err}");
}

#[test]
fn test_writer_rejects_overflowing_shape() {
    let err = to_bytes_f32(&[usize::MAX, 2], &[0.0; 4]).unwrap_err();
    assert!(matches!(err, NpyError::InvalidHeader(_)));
}

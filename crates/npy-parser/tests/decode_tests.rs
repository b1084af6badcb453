//! Decoder tests against hand-assembled npy buffers.

use npy_parser::{decode, encode_f32, DecodeError, NpyVersion};

const EXAMPLE_4X4: [f32; 16] = [
    10.0, 20.0, 30.0, 40.0, //
    15.0, 25.0, 35.0, 45.0, //
    20.0, 30.0, 40.0, 50.0, //
    12.0, 22.0, 32.0, 60.0,
];

/// Assemble a buffer by hand so the decoder is not only checked against its own encoder.
fn build(major: u8, header: &str, values: &[f32]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"\x93NUMPY");
    out.push(major);
    out.push(0);
    match major {
        2 | 3 => out.extend_from_slice(&(header.len() as u32).to_le_bytes()),
        _ => out.extend_from_slice(&(header.len() as u16).to_le_bytes()),
    }
    out.extend_from_slice(header.as_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn c_header(rows: usize, cols: usize) -> String {
    format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': ({}, {}), }}            \n",
        rows, cols
    )
}

#[test]
fn test_decode_v1_example_grid() {
    let bytes = build(1, &c_header(4, 4), &EXAMPLE_4X4);
    let array = decode(&bytes).unwrap();
    assert_eq!(array.rows, 4);
    assert_eq!(array.cols, 4);
    assert_eq!(array.values, EXAMPLE_4X4.to_vec());
}

#[test]
fn test_v1_and_v2_decode_identically() {
    let v1 = decode(&build(1, &c_header(4, 4), &EXAMPLE_4X4)).unwrap();
    let v2 = decode(&build(2, &c_header(4, 4), &EXAMPLE_4X4)).unwrap();
    assert_eq!(v1, v2);

    let v1 = decode(&encode_f32(4, 4, &EXAMPLE_4X4, NpyVersion::V1).unwrap()).unwrap();
    let v2 = decode(&encode_f32(4, 4, &EXAMPLE_4X4, NpyVersion::V2).unwrap()).unwrap();
    assert_eq!(v1, v2);
    assert_eq!(v1.values, EXAMPLE_4X4.to_vec());
}

#[test]
fn test_bad_magic() {
    let mut bytes = build(1, &c_header(4, 4), &EXAMPLE_4X4);
    bytes[0] = b'N';
    assert_eq!(decode(&bytes), Err(DecodeError::BadMagic));
}

#[test]
fn test_stripped_leading_byte_is_rejected() {
    let bytes = build(1, &c_header(4, 4), &EXAMPLE_4X4);
    assert_eq!(decode(&bytes[1..]), Err(DecodeError::BadMagic));
}

#[test]
fn test_unsupported_version() {
    let bytes = build(3, &c_header(4, 4), &EXAMPLE_4X4);
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnsupportedVersion { major: 3, minor: 0 })
    );
}

#[test]
fn test_truncated_buffers() {
    assert!(matches!(
        decode(b"\x93NUM"),
        Err(DecodeError::Truncated { needed: 8, .. })
    ));

    let bytes = build(1, &c_header(4, 4), &EXAMPLE_4X4);
    // cut inside the header
    assert!(matches!(
        decode(&bytes[..20]),
        Err(DecodeError::Truncated { .. })
    ));
}

#[test]
fn test_payload_length_mismatch() {
    let bytes = build(1, &c_header(4, 4), &EXAMPLE_4X4[..15]);
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::PayloadLength {
            expected: 64,
            actual: 60
        })
    );
}

#[test]
fn test_unparseable_shape() {
    let header = "{'descr': '<f4', 'fortran_order': False, 'shape': [4, 4], }\n";
    let bytes = build(1, header, &EXAMPLE_4X4);
    assert!(matches!(decode(&bytes), Err(DecodeError::InvalidHeader(_))));
}

#[test]
fn test_three_dimensional_shape_rejected() {
    let header = "{'descr': '<f4', 'fortran_order': False, 'shape': (2, 2, 4), }\n";
    let bytes = build(1, header, &EXAMPLE_4X4);
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::InvalidShape(vec![2, 2, 4]))
    );
}

#[test]
fn test_float64_rejected() {
    let header = "{'descr': '<f8', 'fortran_order': False, 'shape': (2, 4), }\n";
    let bytes = build(1, header, &EXAMPLE_4X4);
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnsupportedDtype("<f8".to_string()))
    );
}

#[test]
fn test_fortran_order_transposed() {
    // 2x3 [[1,2,3],[4,5,6]] written column by column
    let header = "{'descr': '<f4', 'fortran_order': True, 'shape': (2, 3), }\n";
    let bytes = build(1, header, &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    let array = decode(&bytes).unwrap();
    assert_eq!(array.values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_nan_values_preserved() {
    let bytes = encode_f32(1, 2, &[f32::NAN, 3.5], NpyVersion::V1).unwrap();
    let array = decode(&bytes).unwrap();
    assert!(array.values[0].is_nan());
    assert_eq!(array.values[1], 3.5);
}

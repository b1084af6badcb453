//! Synthetic grid values and npy byte builders.
//!
//! The builders assemble files byte by byte so tests of the decoder and the
//! loader never depend on the encoder they might be checking.

/// Values of the 4x4 worked example, row 0 first (row 0 is the southern edge).
pub const EXAMPLE_4X4: [f32; 16] = [
    10.0, 20.0, 30.0, 40.0, //
    15.0, 25.0, 35.0, 45.0, //
    20.0, 30.0, 40.0, 50.0, //
    12.0, 22.0, 32.0, 60.0,
];

/// A grid where each cell holds `row * 100 + col`.
///
/// ```
/// use test_utils::create_index_grid;
///
/// let grid = create_index_grid(3, 4);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[5], 101.0); // row 1, col 1
/// ```
pub fn create_index_grid(rows: usize, cols: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            data.push((row * 100 + col) as f32);
        }
    }
    data
}

/// Ozone-like values (ppb) rising from the south-west to the north-east.
pub fn create_ozone_grid(rows: usize, cols: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(rows * cols);
    let denom = (rows + cols).saturating_sub(2).max(1) as f32;
    for row in 0..rows {
        for col in 0..cols {
            data.push(20.0 + 80.0 * (row + col) as f32 / denom);
        }
    }
    data
}

/// Header dict text for a C-ordered little-endian float32 array, unpadded.
pub fn npy_header_text(rows: usize, cols: usize) -> String {
    format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': ({}, {}), }}",
        rows, cols
    )
}

/// Assemble an npy file with an arbitrary header and major version.
///
/// Major version 1 gets a 2-byte header length, anything else a 4-byte one.
pub fn npy_bytes_with_header(major: u8, header: &str, values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + header.len() + values.len() * 4);
    out.extend_from_slice(b"\x93NUMPY");
    out.push(major);
    out.push(0);
    if major == 1 {
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    } else {
        out.extend_from_slice(&(header.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(header.as_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// A well-formed npy file, header padded to 64 bytes like numpy writes it.
pub fn npy_bytes(major: u8, rows: usize, cols: usize, values: &[f32]) -> Vec<u8> {
    let preamble = if major == 1 { 10 } else { 12 };
    let mut header = npy_header_text(rows, cols);
    let unpadded = preamble + header.len() + 1;
    header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    header.push('\n');
    npy_bytes_with_header(major, &header, values)
}

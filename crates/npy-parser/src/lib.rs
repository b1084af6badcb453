//! Decoder for forecast grid files.
//!
//! Grids are published as `.npy` files (format versions 1.0 and 2.0) holding a
//! single 2-D little-endian float32 array:
//!
//! ```text
//! offset  size  field
//! 0       6     magic "\x93NUMPY"
//! 6       1     major version (1 or 2)
//! 7       1     minor version
//! 8       2|4   header length, little-endian (u16 for v1, u32 for v2)
//! 10|12   n     ASCII header dict, space padded, '\n' terminated
//! ...           rows * cols float32 values
//! ```
//!
//! Decoding is pure; callers attach geographic metadata afterwards.

pub mod error;
pub mod header;

pub use error::{DecodeError, DecodeResult};
pub use header::{NpyHeader, FLOAT32_LE};

use bytes::Buf;

/// Magic prefix of every npy file.
pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Header preamble is padded so the payload starts on this alignment.
const HEADER_ALIGNMENT: usize = 64;

/// Format version, selecting the width of the header length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpyVersion {
    /// 2-byte header length
    V1,
    /// 4-byte header length
    V2,
}

impl NpyVersion {
    fn major(&self) -> u8 {
        match self {
            NpyVersion::V1 => 1,
            NpyVersion::V2 => 2,
        }
    }

    /// Offset where the header text begins.
    fn header_start(&self) -> usize {
        match self {
            NpyVersion::V1 => 10,
            NpyVersion::V2 => 12,
        }
    }
}

/// A decoded row-major float32 array.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArray {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f32>,
}

/// Decode an npy buffer into a row-major 2-D array.
pub fn decode(buffer: &[u8]) -> DecodeResult<DecodedArray> {
    require_len(buffer, 8)?;
    if &buffer[..6] != MAGIC {
        return Err(DecodeError::BadMagic);
    }

    let major = buffer[6];
    let minor = buffer[7];
    let version = match major {
        1 => NpyVersion::V1,
        2 => NpyVersion::V2,
        _ => return Err(DecodeError::UnsupportedVersion { major, minor }),
    };

    let header_start = version.header_start();
    require_len(buffer, header_start)?;
    let mut len_field = &buffer[8..header_start];
    let header_len = match version {
        NpyVersion::V1 => len_field.get_u16_le() as usize,
        NpyVersion::V2 => len_field.get_u32_le() as usize,
    };

    let payload_start = header_start + header_len;
    require_len(buffer, payload_start)?;
    let text = std::str::from_utf8(&buffer[header_start..payload_start])
        .map_err(|_| DecodeError::HeaderEncoding)?;

    let header = NpyHeader::parse(text)?;
    header.check_dtype()?;
    let (rows, cols) = header.dims()?;
    tracing::trace!(
        major,
        minor,
        rows,
        cols,
        fortran_order = header.fortran_order,
        "Parsed npy header"
    );

    let expected = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| DecodeError::InvalidShape(header.shape.clone()))?;
    let payload = &buffer[payload_start..];
    if payload.len() != expected {
        return Err(DecodeError::PayloadLength {
            expected,
            actual: payload.len(),
        });
    }

    let mut reader = payload;
    let mut values = Vec::with_capacity(rows * cols);
    while reader.has_remaining() {
        values.push(reader.get_f32_le());
    }

    if header.fortran_order {
        values = column_major_to_row_major(&values, rows, cols);
    }

    Ok(DecodedArray { rows, cols, values })
}

/// Encode a row-major float32 array as an npy buffer.
pub fn encode_f32(
    rows: usize,
    cols: usize,
    values: &[f32],
    version: NpyVersion,
) -> DecodeResult<Vec<u8>> {
    if rows == 0 || cols == 0 {
        return Err(DecodeError::InvalidShape(vec![rows, cols]));
    }
    if values.len() != rows * cols {
        return Err(DecodeError::PayloadLength {
            expected: rows * cols * 4,
            actual: values.len() * 4,
        });
    }

    let header = NpyHeader {
        descr: FLOAT32_LE.to_string(),
        fortran_order: false,
        shape: vec![rows, cols],
    };
    let mut text = header.to_literal();
    let header_start = version.header_start();
    // pad with spaces so that preamble + text + '\n' is aligned
    let unpadded = header_start + text.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    text.push_str(&" ".repeat(padding));
    text.push('\n');

    let mut out = Vec::with_capacity(header_start + text.len() + values.len() * 4);
    out.extend_from_slice(MAGIC);
    out.push(version.major());
    out.push(0);
    match version {
        NpyVersion::V1 => out.extend_from_slice(&(text.len() as u16).to_le_bytes()),
        NpyVersion::V2 => out.extend_from_slice(&(text.len() as u32).to_le_bytes()),
    }
    out.extend_from_slice(text.as_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    Ok(out)
}

fn require_len(buffer: &[u8], needed: usize) -> DecodeResult<()> {
    if buffer.len() < needed {
        return Err(DecodeError::Truncated {
            needed,
            actual: buffer.len(),
        });
    }
    Ok(())
}

/// Reorder a Fortran (column-major) payload into row-major order.
fn column_major_to_row_major(values: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; rows * cols];
    for col in 0..cols {
        for row in 0..rows {
            out[row * cols + col] = values[col * rows + row];
        }
    }
    out
}

//! This module contains the pure, stateless kernels for deflate (zlib stream)
//! compression and decompression, a safe wrapper around the `flate2` crate.
//!
//! Deflate is the general-purpose fallback for Dimensional columns: floating
//! point dimensions and integer columns with neither long runs nor a shared
//! high-bit prefix.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use crate::error::{PatchError, Result};

/// Compresses `input_bytes` into a zlib stream at `level` (0-9).
pub fn encode(input_bytes: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder
        .write_all(input_bytes)
        .map_err(|e| PatchError::DeflateError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| PatchError::DeflateError(e.to_string()))
}

/// Inflates a zlib stream that must expand to exactly `expected_len` bytes.
pub fn decode(input_bytes: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    output.try_reserve_exact(expected_len)?;

    // Read one byte past the expectation so oversized streams are detected
    // without inflating them completely.
    let mut decoder = ZlibDecoder::new(input_bytes).take(expected_len as u64 + 1);
    decoder
        .read_to_end(&mut output)
        .map_err(|e| PatchError::DeflateError(e.to_string()))?;

    if output.len() != expected_len {
        return Err(PatchError::DeflateError(format!(
            "Inflated size does not match column size. Expected {}, got {}.",
            expected_len,
            output.len()
        )));
    }
    Ok(output)
}

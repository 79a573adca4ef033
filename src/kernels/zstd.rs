//! This module contains the pure, stateless kernels for performing Zstandard
//! compression and decompression.
//!
//! It backs the ExternalLossless scheme: the whole point-major buffer goes
//! through one zstd frame. This module is a safe, panic-free wrapper around the
//! `zstd` crate.

use std::io::Write;

use crate::error::{PatchError, Result};

//==================================================================================
// 1. Public API
//==================================================================================

/// Compresses `input_bytes`, prepending the uncompressed length as a little-endian
/// `u64`. An empty input encodes to an empty buffer.
pub fn encode(input_bytes: &[u8], level: i32) -> Result<Vec<u8>> {
    if input_bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut output_buf = Vec::with_capacity(input_bytes.len() / 2 + 8);
    let uncompressed_len: u64 = input_bytes.len() as u64;
    output_buf.extend_from_slice(&uncompressed_len.to_le_bytes());

    let mut encoder = zstd::stream::Encoder::new(&mut output_buf, level)
        .map_err(|e| PatchError::ZstdError(e.to_string()))?;
    encoder
        .write_all(input_bytes)
        .map_err(|e| PatchError::ZstdError(e.to_string()))?;
    // `finish` is essential to finalize the Zstd frame.
    encoder
        .finish()
        .map_err(|e| PatchError::ZstdError(e.to_string()))?;

    Ok(output_buf)
}

/// Reverses [`encode`], validating the length header.
pub fn decode(input_bytes: &[u8]) -> Result<Vec<u8>> {
    if input_bytes.is_empty() {
        return Ok(Vec::new());
    }

    let len_bytes: [u8; 8] = input_bytes
        .get(..8)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            PatchError::ZstdError("Input stream too short to contain size header.".to_string())
        })?;
    let uncompressed_len = u64::from_le_bytes(len_bytes);
    let uncompressed_len = usize::try_from(uncompressed_len).map_err(|_| {
        PatchError::ZstdError(format!("Size header {} exceeds address space", uncompressed_len))
    })?;

    let mut decompressed_data = Vec::new();
    decompressed_data.try_reserve_exact(uncompressed_len)?;
    zstd::stream::copy_decode(&input_bytes[8..], &mut decompressed_data)
        .map_err(|e| PatchError::ZstdError(e.to_string()))?;

    if decompressed_data.len() != uncompressed_len {
        return Err(PatchError::ZstdError(format!(
            "Decompressed size does not match header. Expected {}, got {}.",
            uncompressed_len,
            decompressed_data.len()
        )));
    }

    Ok(decompressed_data)
}

//==================================================================================
// 2. Unit Tests
//==================================================================================

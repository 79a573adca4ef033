//! This module contains the pure, stateless kernels for performing Zig-zag
//! encoding and decoding.
//!
//! Zig-zag is a lossless, bitwise mapping of signed integers to unsigned
//! integers so that values of small magnitude (of either sign) become small
//! unsigned values, which LEB128 then stores in few bytes. The Hierarchical
//! scheme uses it for the deltas between consecutive low-bit values.

//==================================================================================
// 1. Core Logic
//==================================================================================

/// Encodes a single signed integer: `(n << 1) ^ (n >> 63)`.
#[inline]
pub fn encode_val(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Decodes a single unsigned integer back to its signed representation.
#[inline]
pub fn decode_val(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

//==================================================================================
// 2. Slice API
//==================================================================================

pub fn encode(input_slice: &[i64]) -> Vec<u64> {
    input_slice.iter().map(|&v| encode_val(v)).collect()
}

pub fn decode(input_slice: &[u64]) -> Vec<i64> {
    input_slice.iter().map(|&v| decode_val(v)).collect()
}

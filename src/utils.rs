//! This module provides a set of shared, low-level utility functions used
//! throughout the pcpatch core.
//!
//! Its primary responsibilities include:
//! 1.  Bounds-checked, endian-aware reading of header and payload fields, where
//!     every truncation surfaces as `CorruptPatch` instead of a panic.
//! 2.  Fallible allocation of decode buffers sized from untrusted headers.

use std::io::Cursor;

use crate::error::{PatchError, Result};
use crate::kernels::leb128;
use crate::types::Endian;

//==================================================================================
// 1. Fallible Allocation
//==================================================================================

/// Allocates an empty `Vec<u8>` with room for exactly `len` bytes.
///
/// Lengths come from decoded headers, so the reservation is fallible and a
/// failure is reported as `AllocationFailed` instead of aborting the process.
pub fn try_alloc(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    Ok(buf)
}

/// `npoints * point_size`, or `CorruptPatch` when the product overflows.
pub fn checked_buffer_len(npoints: usize, point_size: usize) -> Result<usize> {
    npoints.checked_mul(point_size).ok_or_else(|| {
        PatchError::CorruptPatch(format!(
            "{} points of {} bytes overflow the address space",
            npoints, point_size
        ))
    })
}

//==================================================================================
// 2. Byte Reader
//==================================================================================

/// A cursor over a byte slice that reads fixed-width fields in a given byte order.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8], endian: Endian) -> Self {
        Self {
            bytes,
            pos: 0,
            endian,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Switches the byte order used by subsequent reads.
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Borrows the next `len` bytes and advances past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                PatchError::CorruptPatch(format!(
                    "truncated buffer: needed {} bytes at offset {}, {} available",
                    len,
                    self.pos,
                    self.remaining()
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Everything not consumed yet.
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads an unsigned word of `size` bytes.
    pub fn read_word(&mut self, size: usize) -> Result<u64> {
        let endian = self.endian;
        let bytes = self.take(size)?;
        Ok(endian.read_word(bytes, size))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_word(4)? as u32)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_word(8)?))
    }

    /// Reads one LEB128-encoded unsigned integer.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut cursor = Cursor::new(&self.bytes[self.pos..]);
        let value = leb128::decode_one::<u64>(&mut cursor)?;
        self.pos += cursor.position() as usize;
        Ok(value)
    }

    /// Reads `n` consecutive f64 values.
    pub fn read_f64_vec(&mut self, n: usize) -> Result<Vec<f64>> {
        // Each f64 needs eight bytes; reject impossible counts before allocating.
        if n.saturating_mul(8) > self.remaining() {
            return Err(PatchError::CorruptPatch(format!(
                "truncated buffer: {} f64 values need {} bytes, {} available",
                n,
                n.saturating_mul(8),
                self.remaining()
            )));
        }
        (0..n).map(|_| self.read_f64()).collect()
    }

    /// Fails with `CorruptPatch` if any bytes are left over.
    pub fn expect_end(&self, context: &str) -> Result<()> {
        if self.remaining() != 0 {
            return Err(PatchError::CorruptPatch(format!(
                "{}: {} trailing bytes",
                context,
                self.remaining()
            )));
        }
        Ok(())
    }
}

//==================================================================================
// 3. Writers
//==================================================================================

pub fn write_u32(out: &mut Vec<u8>, value: u32, endian: Endian) {
    endian.write_word(out, value as u64, 4);
}

pub fn write_f64(out: &mut Vec<u8>, value: f64, endian: Endian) {
    endian.write_word(out, value.to_bits(), 8);
}

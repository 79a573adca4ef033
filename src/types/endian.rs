//! Byte-order declaration for point buffers and patch payloads.
//!
//! Endianness is fixed per schema. Every multi-byte value written by the codec
//! follows the declared order, and readers validate the marker byte instead of
//! guessing.

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};

/// Byte order of every multi-byte value under a schema.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Endian {
    /// XDR order.
    Big,
    /// NDR order.
    #[default]
    Little,
}

impl Endian {
    /// The byte order of the running machine.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// The one-byte marker stored in serialized points and patches.
    pub fn marker(&self) -> u8 {
        match self {
            Endian::Big => 0,
            Endian::Little => 1,
        }
    }

    /// Parses a marker byte.
    pub fn from_marker(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Endian::Big),
            1 => Ok(Endian::Little),
            other => Err(PatchError::CorruptPatch(format!(
                "invalid endian marker byte {}",
                other
            ))),
        }
    }

    /// Reads an unsigned word of `size` bytes (1, 2, 4 or 8) from the front of `bytes`.
    /// The caller guarantees `bytes.len() >= size`.
    pub fn read_word(&self, bytes: &[u8], size: usize) -> u64 {
        let mut word = 0u64;
        match self {
            Endian::Little => {
                for (i, b) in bytes[..size].iter().enumerate() {
                    word |= (*b as u64) << (8 * i);
                }
            }
            Endian::Big => {
                for b in &bytes[..size] {
                    word = (word << 8) | *b as u64;
                }
            }
        }
        word
    }

    /// Appends the low `size` bytes of `word` to `out`.
    pub fn write_word(&self, out: &mut Vec<u8>, word: u64, size: usize) {
        match self {
            Endian::Little => {
                for i in 0..size {
                    out.push((word >> (8 * i)) as u8);
                }
            }
            Endian::Big => {
                for i in (0..size).rev() {
                    out.push((word >> (8 * i)) as u8);
                }
            }
        }
    }

    /// Writes the low `size` bytes of `word` into `dest[..size]`.
    pub fn put_word(&self, dest: &mut [u8], word: u64, size: usize) {
        for i in 0..size {
            let shift = match self {
                Endian::Little => 8 * i,
                Endian::Big => 8 * (size - 1 - i),
            };
            dest[i] = (word >> shift) as u8;
        }
    }
}

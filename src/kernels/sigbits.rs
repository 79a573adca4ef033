//! This module contains the pure, stateless kernels for significant-bits
//! packing of a column of dimension words.
//!
//! Spatially coherent points share the high bits of their coordinates. The kernel
//! finds the longest common high-bit prefix of every word in the column, stores it
//! once as a full word, and bit-packs only the unique low bits of each value
//! (LSB-first, via `bitvec`).
//!
//! Format: `[unique bit width u8][common value word][packed low bits]`.

use bitvec::prelude::*;

use crate::error::{PatchError, Result};
use crate::types::Endian;

//==================================================================================
// 1. Analysis
//==================================================================================

/// Returns `(common_bits, common_value)` for words of `bit_width` bits:
/// the length of the shared high-bit prefix and the prefix itself with the
/// low bits cleared. An empty column shares every bit.
pub fn common_bits(words: &[u64], bit_width: u32) -> (u32, u64) {
    let mask = width_mask(bit_width);
    let Some(&first) = words.first() else {
        return (bit_width, 0);
    };

    let (and, or) = words
        .iter()
        .fold((first & mask, first & mask), |(and, or), &w| (and & w, or | w));
    let diff = (and ^ or) & mask;

    let unique = 64 - diff.leading_zeros();
    let common = bit_width - unique;
    (common, and & !width_mask(unique))
}

fn width_mask(bits: u32) -> u64 {
    match bits {
        0 => 0,
        64 => u64::MAX,
        b => (1u64 << b) - 1,
    }
}

/// Exact encoded size for a column, used by the planner without encoding.
pub fn encoded_size(words: &[u64], word_size: usize) -> usize {
    let (common, _) = common_bits(words, (word_size * 8) as u32);
    let unique = word_size * 8 - common as usize;
    1 + word_size + (words.len() * unique).div_ceil(8)
}

//==================================================================================
// 2. Public API
//==================================================================================

pub fn encode(words: &[u64], word_size: usize, endian: Endian, output_buf: &mut Vec<u8>) -> Result<()> {
    let bit_width = (word_size * 8) as u32;
    let (common, common_value) = common_bits(words, bit_width);
    let unique = (bit_width - common) as usize;

    output_buf.push(unique as u8);
    endian.write_word(output_buf, common_value, word_size);
    if unique == 0 {
        return Ok(());
    }

    let low_mask = width_mask(unique as u32);
    let mut bit_vec = BitVec::<u8, Lsb0>::with_capacity(words.len() * unique);
    for &word in words {
        let low = word & low_mask;
        if word & !low_mask != common_value {
            return Err(PatchError::BitpackEncodeError(word, unique as u8));
        }
        bit_vec.extend_from_bitslice(&low.view_bits::<Lsb0>()[..unique]);
    }
    output_buf.extend_from_slice(bit_vec.as_raw_slice());
    Ok(())
}

pub fn decode(
    input_bytes: &[u8],
    word_size: usize,
    endian: Endian,
    num_values: usize,
) -> Result<Vec<u64>> {
    let bit_width = word_size * 8;
    let unique = *input_bytes.first().ok_or(PatchError::BitpackDecodeError)? as usize;
    if unique > bit_width {
        return Err(PatchError::BitpackDecodeError);
    }
    let common_bytes = input_bytes
        .get(1..1 + word_size)
        .ok_or(PatchError::BitpackDecodeError)?;
    let common_value = endian.read_word(common_bytes, word_size);
    let packed = &input_bytes[1 + word_size..];

    let needed_bits = num_values
        .checked_mul(unique)
        .ok_or(PatchError::BitpackDecodeError)?;
    if packed.len() != needed_bits.div_ceil(8) {
        return Err(PatchError::BitpackDecodeError);
    }

    let mut output = Vec::new();
    output.try_reserve_exact(num_values)?;
    if unique == 0 {
        output.resize(num_values, common_value);
        return Ok(output);
    }

    let bits = BitSlice::<u8, Lsb0>::from_slice(packed);
    for chunk in bits.chunks(unique).take(num_values) {
        let mut low = 0u64;
        for (i, bit) in chunk.iter().by_vals().enumerate() {
            if bit {
                low |= 1 << i;
            }
        }
        output.push(common_value | low);
    }
    Ok(output)
}

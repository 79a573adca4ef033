//! This module contains the pure, stateless kernels for performing LEB128
//! (Little-Endian Base 128) variable-length integer encoding and decoding.
//!
//! LEB128 stores run lengths, cluster sizes and zig-zagged deltas, all streams of
//! unsigned integers where most values are small. It is fully panic-free.

use num_traits::{PrimInt, Unsigned};
use std::io::Cursor;

use crate::error::{PatchError, Result};

//==================================================================================
// 1. Public API for Single-Value Operations
//==================================================================================

/// Encodes a single unsigned integer into a LEB128 byte sequence, writing to a buffer.
pub fn encode_one<T>(value: T, buffer: &mut Vec<u8>) -> Result<()>
where
    T: PrimInt + Unsigned,
{
    let zero = T::zero();
    let seven_bit_mask = T::from(0x7F).ok_or_else(|| {
        PatchError::Leb128DecodeError("Failed to create 7-bit mask for type".to_string())
    })?;

    let mut current_value = value;
    loop {
        let low = (current_value & seven_bit_mask).to_u8().ok_or_else(|| {
            PatchError::Leb128DecodeError("Failed to convert generic integer to u8".to_string())
        })?;
        current_value = current_value >> 7;

        if current_value == zero {
            buffer.push(low);
            break;
        }
        buffer.push(low | 0x80);
    }
    Ok(())
}

/// Decodes a single unsigned integer from a LEB128 byte stream cursor.
pub fn decode_one<T>(cursor: &mut Cursor<&[u8]>) -> Result<T>
where
    T: PrimInt + Unsigned,
{
    let mut result = T::zero();
    let mut shift = 0usize;
    let total_bits = std::mem::size_of::<T>() * 8;

    loop {
        let pos = cursor.position() as usize;
        let byte = *cursor.get_ref().get(pos).ok_or_else(|| {
            PatchError::Leb128DecodeError("Unexpected end of buffer".to_string())
        })?;
        cursor.set_position((pos + 1) as u64);

        if shift >= total_bits {
            return Err(PatchError::Leb128DecodeError(
                "Integer overflow during decoding".to_string(),
            ));
        }

        let seven_bit_payload = T::from(byte & 0x7F).ok_or_else(|| {
            PatchError::Leb128DecodeError("Failed to create 7-bit payload from byte".to_string())
        })?;

        // The last group may only set bits that exist in the target type.
        if shift + 7 > total_bits && ((byte & 0x7F) >> (total_bits - shift)) > 0 {
            return Err(PatchError::Leb128DecodeError(
                "Integer overflow during decoding".to_string(),
            ));
        }

        result = result | (seven_bit_payload << shift);

        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

//==================================================================================
// 2. Public API for Slice Operations
//==================================================================================

/// Appends the LEB128 encoding of every value in `input_slice` to `output_buf`.
pub fn encode<T>(input_slice: &[T], output_buf: &mut Vec<u8>) -> Result<()>
where
    T: PrimInt + Unsigned,
{
    for &val in input_slice {
        encode_one(val, output_buf)?;
    }
    Ok(())
}

/// Decodes exactly `num_values` integers; trailing bytes are an error.
pub fn decode<T>(input_bytes: &[u8], num_values: usize) -> Result<Vec<T>>
where
    T: PrimInt + Unsigned,
{
    // Every value takes at least one byte.
    if num_values > input_bytes.len() {
        return Err(PatchError::Leb128DecodeError(format!(
            "{} values cannot fit in {} bytes",
            num_values,
            input_bytes.len()
        )));
    }

    let mut cursor = Cursor::new(input_bytes);
    let mut values = Vec::with_capacity(num_values);
    for _ in 0..num_values {
        values.push(decode_one::<T>(&mut cursor)?);
    }

    if (cursor.position() as usize) != input_bytes.len() {
        return Err(PatchError::Leb128DecodeError(
            "Did not consume entire input buffer. Trailing bytes detected.".to_string(),
        ));
    }
    Ok(values)
}

//! This module contains the pure, stateless kernels for performing Run-Length
//! Encoding (RLE) and decoding over a column of dimension words.
//!
//! RLE is highly effective for dimensions with low cardinality or long,
//! contiguous runs of identical values (classification codes, return numbers,
//! flight-line ids). The format is a run count followed by a sequence of
//! `(value, run_length)` pairs, where the value is a `word_size`-byte word in the
//! schema's byte order and the `run_length` is LEB128-encoded.

use std::io::Cursor;

use super::leb128;
use crate::error::{PatchError, Result};
use crate::types::Endian;

//==================================================================================
// 1. Analysis
//==================================================================================

/// Number of runs of identical consecutive words.
pub fn count_runs(words: &[u64]) -> usize {
    if words.is_empty() {
        return 0;
    }
    1 + words.windows(2).filter(|w| w[0] != w[1]).count()
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Appends `[run count u32]` then `[word][run length LEB128]` per run.
pub fn encode(words: &[u64], word_size: usize, endian: Endian, output_buf: &mut Vec<u8>) -> Result<()> {
    let runs = count_runs(words);
    let runs_u32 = u32::try_from(runs).map_err(|_| {
        PatchError::RleDecodeError(format!("{} runs exceed the u32 run counter", runs))
    })?;
    endian.write_word(output_buf, runs_u32 as u64, 4);

    let Some((&first, rest)) = words.split_first() else {
        return Ok(());
    };

    let mut current_val = first;
    let mut run_count: u64 = 1;
    for &val in rest {
        if val == current_val {
            run_count += 1;
        } else {
            endian.write_word(output_buf, current_val, word_size);
            leb128::encode_one(run_count, output_buf)?;
            current_val = val;
            run_count = 1;
        }
    }
    endian.write_word(output_buf, current_val, word_size);
    leb128::encode_one(run_count, output_buf)?;
    Ok(())
}

/// Decodes exactly `num_values` words.
pub fn decode(
    input_bytes: &[u8],
    word_size: usize,
    endian: Endian,
    num_values: usize,
) -> Result<Vec<u64>> {
    let header = input_bytes.get(..4).ok_or_else(|| {
        PatchError::RleDecodeError("Truncated buffer: cannot read run count".to_string())
    })?;
    let runs = endian.read_word(header, 4) as usize;

    let mut output = Vec::new();
    output.try_reserve_exact(num_values)?;

    let mut cursor = Cursor::new(input_bytes);
    cursor.set_position(4);
    for _ in 0..runs {
        let start = cursor.position() as usize;
        let value_bytes = input_bytes.get(start..start + word_size).ok_or_else(|| {
            PatchError::RleDecodeError("Truncated buffer: cannot read value".to_string())
        })?;
        let value = endian.read_word(value_bytes, word_size);
        cursor.set_position((start + word_size) as u64);

        let run_length = leb128::decode_one::<u64>(&mut cursor)?;
        if run_length == 0 || run_length > (num_values - output.len()) as u64 {
            return Err(PatchError::RleDecodeError(format!(
                "Run of {} values overflows the expected {} values",
                run_length, num_values
            )));
        }
        output.extend(std::iter::repeat(value).take(run_length as usize));
    }

    if output.len() != num_values {
        return Err(PatchError::RleDecodeError(format!(
            "Decoded to {} values, but expected {}",
            output.len(),
            num_values
        )));
    }
    if cursor.position() as usize != input_bytes.len() {
        return Err(PatchError::RleDecodeError(
            "Trailing bytes after the last run".to_string(),
        ));
    }
    Ok(output)
}

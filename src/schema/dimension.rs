// In: src/schema/dimension.rs

//! A single named, typed field of a point.

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};
use crate::types::{Endian, Interpretation};

/// One dimension of a point layout.
///
/// `size` and `byte_offset` are derived by [`super::Schema::new`]; values set by
/// callers are overwritten there.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub position: usize,
    pub interpretation: Interpretation,
    pub scale: f64,
    pub offset: f64,
    pub size: usize,
    pub byte_offset: usize,
}

impl Dimension {
    /// A dimension with scale 1 and offset 0.
    pub fn new(name: impl Into<String>, position: usize, interpretation: Interpretation) -> Self {
        Self {
            name: name.into(),
            description: None,
            position,
            interpretation,
            scale: 1.0,
            offset: 0.0,
            size: interpretation.size(),
            byte_offset: 0,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    //------------------------------------------------------------------------------
    // Word access inside a raw point buffer
    //------------------------------------------------------------------------------

    /// The word stored for this dimension in `raw` (one point buffer).
    #[inline]
    pub fn read_word(&self, raw: &[u8], endian: Endian) -> u64 {
        endian.read_word(&raw[self.byte_offset..], self.size)
    }

    /// Overwrites this dimension's bytes in `raw`.
    #[inline]
    pub fn write_word(&self, raw: &mut [u8], word: u64, endian: Endian) {
        endian.put_word(&mut raw[self.byte_offset..self.byte_offset + self.size], word, self.size);
    }

    //------------------------------------------------------------------------------
    // Word <-> value
    //------------------------------------------------------------------------------

    /// Decodes a word: `raw * scale + offset` for integers, the IEEE value for floats.
    #[inline]
    pub fn word_to_value(&self, word: u64) -> f64 {
        if self.interpretation.is_float() {
            self.interpretation.word_to_f64(word)
        } else {
            self.interpretation.word_to_i128(word) as f64 * self.scale + self.offset
        }
    }

    /// Encodes a value into this dimension's word, rounding integers half away
    /// from zero.
    pub fn value_to_word(&self, value: f64) -> Result<u64> {
        let out_of_range = || PatchError::ValueOutOfRange {
            dimension: self.name.clone(),
            value,
            interpretation: self.interpretation,
        };

        match self.interpretation {
            Interpretation::Float64 => Ok(value.to_bits()),
            Interpretation::Float32 => {
                if value.is_finite() && value.abs() > f32::MAX as f64 {
                    return Err(out_of_range());
                }
                Ok((value as f32).to_bits() as u64)
            }
            interp => {
                let raw = ((value - self.offset) / self.scale).round();
                if !raw.is_finite() {
                    return Err(out_of_range());
                }
                let (lo, hi) = interp.integer_range().ok_or_else(out_of_range)?;
                // Compare in f64 first: a huge raw would saturate the i128 cast.
                if raw < lo as f64 || raw > hi as f64 {
                    return Err(out_of_range());
                }
                let raw = raw as i128;
                if raw < lo || raw > hi {
                    return Err(out_of_range());
                }
                Ok(interp.i128_to_word(raw))
            }
        }
    }
}

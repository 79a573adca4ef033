//! This module defines the canonical, type-safe representation of the storage
//! type of a single point dimension.
//!
//! Every dimension value travels through the codec as a *word*: the raw bit
//! pattern of the stored value, zero-extended into a `u64`. The helpers here
//! convert between words, raw numeric values and the order-preserving keys used
//! by sorting and spatial clustering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The storage type of one dimension inside a point buffer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Interpretation {
    #[serde(alias = "int8_t")]
    Int8,
    #[serde(rename = "uint8", alias = "uint8_t")]
    UInt8,
    #[serde(alias = "int16_t")]
    Int16,
    #[serde(rename = "uint16", alias = "uint16_t")]
    UInt16,
    #[serde(alias = "int32_t")]
    Int32,
    #[serde(rename = "uint32", alias = "uint32_t")]
    UInt32,
    #[serde(alias = "int64_t")]
    Int64,
    #[serde(rename = "uint64", alias = "uint64_t")]
    UInt64,
    #[serde(alias = "float")]
    Float32,
    #[serde(alias = "double")]
    Float64,
}

impl Interpretation {
    /// Width of a stored value in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Width of a stored value in bits.
    pub fn bit_width(&self) -> u32 {
        (self.size() * 8) as u32
    }

    /// Returns `true` if the data type is a signed integer.
    pub fn is_signed_int(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Returns `true` if the data type is a floating-point number.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Returns `true` for any integer interpretation, signed or not.
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Mask selecting the bits of a word that belong to this interpretation.
    pub fn word_mask(&self) -> u64 {
        match self.bit_width() {
            64 => u64::MAX,
            bits => (1u64 << bits) - 1,
        }
    }

    /// Inclusive range of raw integer values, or `None` for floats.
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        match self {
            Self::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::UInt8 => Some((0, u8::MAX as i128)),
            Self::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::UInt16 => Some((0, u16::MAX as i128)),
            Self::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::UInt32 => Some((0, u32::MAX as i128)),
            Self::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::UInt64 => Some((0, u64::MAX as i128)),
            Self::Float32 | Self::Float64 => None,
        }
    }

    /// Interprets an integer word as a signed/unsigned integer.
    /// Float words are reinterpreted as their IEEE value and truncated.
    pub fn word_to_i128(&self, word: u64) -> i128 {
        match self {
            Self::Int8 => (word as u8 as i8) as i128,
            Self::Int16 => (word as u16 as i16) as i128,
            Self::Int32 => (word as u32 as i32) as i128,
            Self::Int64 => (word as i64) as i128,
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 => word as i128,
            Self::Float32 | Self::Float64 => self.word_to_f64(word) as i128,
        }
    }

    /// Converts an in-range raw integer into its word (two's complement, truncated
    /// to the interpretation's width). Callers check the range first.
    pub fn i128_to_word(&self, raw: i128) -> u64 {
        (raw as u64) & self.word_mask()
    }

    /// The raw numeric value held by a word, before any scale/offset.
    pub fn word_to_f64(&self, word: u64) -> f64 {
        match self {
            Self::Float32 => f32::from_bits(word as u32) as f64,
            Self::Float64 => f64::from_bits(word),
            _ => self.word_to_i128(word) as f64,
        }
    }

    /// Maps a word onto a `u64` whose unsigned order matches the numeric order
    /// of the stored values. Used for sort keys and spatial cluster keys.
    pub fn orderable(&self, word: u64) -> u64 {
        let bits = self.bit_width();
        match self {
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 => word,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => {
                (word ^ (1u64 << (bits - 1))) & self.word_mask()
            }
            Self::Float32 | Self::Float64 => {
                let sign = 1u64 << (bits - 1);
                if word & sign != 0 {
                    !word & self.word_mask()
                } else {
                    word | sign
                }
            }
        }
    }
}

/// Provides the canonical string representation for an `Interpretation`.
impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

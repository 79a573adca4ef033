// In: src/error.rs

//! This module defines the single, unified error type for the entire pcpatch library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every failure is local and typed: the core never retries and never logs on its
//! own behalf. Callers (e.g. a relational binding layer) decide how to surface them.

use std::collections::TryReserveError;
use thiserror::Error;

use crate::types::{Endian, Interpretation};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PatchError>;

#[derive(Error, Debug)]
pub enum PatchError {
    // =========================================================================
    // === Schema Errors
    // =========================================================================
    #[error("No schema registered for pcid {0}")]
    UnknownSchema(u32),

    #[error("Schema has no dimension named '{0}'")]
    UnknownDimension(String),

    #[error("No value supplied for dimension '{0}'")]
    MissingDimension(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    // =========================================================================
    // === Data Errors
    // =========================================================================
    #[error("Value {value} does not fit dimension '{dimension}' ({interpretation})")]
    ValueOutOfRange {
        dimension: String,
        value: f64,
        interpretation: Interpretation,
    },

    #[error("Corrupt patch: {0}")]
    CorruptPatch(String),

    #[error("Unsupported compression tag {0}")]
    UnsupportedScheme(u8),

    #[error("Endianness mismatch: schema declares {declared:?}, data is {found:?}")]
    EndiannessMismatch { declared: Endian, found: Endian },

    #[error("Point index {index} out of range for patch of {npoints} points")]
    IndexOutOfRange { index: u64, npoints: u32 },

    #[error("Schema mismatch: expected pcid {expected}, got pcid {found}")]
    SchemaMismatch { expected: u32, found: u32 },

    #[error("Cannot merge an empty list of patches")]
    EmptyPatchList,

    #[error("Failed to allocate decode buffer: {0}")]
    AllocationFailed(#[from] TryReserveError),

    // =========================================================================
    // === External Error Wrappers
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while reading a schema
    /// description or a configuration document.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    // =========================================================================
    // === Low-Level Kernel Errors
    // =========================================================================
    #[error("Zstd operation failed: {0}")]
    ZstdError(String),

    #[error("Deflate operation failed: {0}")]
    DeflateError(String),

    #[error("RLE decoding error: {0}")]
    RleDecodeError(String),

    #[error("LEB128 decoding error: {0}")]
    Leb128DecodeError(String),

    #[error("Bitpack decoding failed due to truncated buffer or data corruption")]
    BitpackDecodeError,

    #[error("Bitpack encoding error: value {0} exceeds bit width {1}")]
    BitpackEncodeError(u64, u8),
}

impl PatchError {
    /// Returns `true` for errors raised by a kernel while reading encoded bytes.
    pub fn is_kernel_decode_error(&self) -> bool {
        matches!(
            self,
            PatchError::ZstdError(_)
                | PatchError::DeflateError(_)
                | PatchError::RleDecodeError(_)
                | PatchError::Leb128DecodeError(_)
                | PatchError::BitpackDecodeError
        )
    }

    /// Re-labels kernel decode failures as `CorruptPatch`, prefixed with `context`.
    /// All other errors pass through unchanged.
    pub(crate) fn into_corrupt(self, context: &str) -> PatchError {
        if self.is_kernel_decode_error() {
            PatchError::CorruptPatch(format!("{}: {}", context, self))
        } else {
            self
        }
    }
}

//! This module declares the collection of pure, stateless column kernels.
//!
//! Kernels know nothing about schemas or patches. They transform slices of
//! words or bytes and report failures with the low-level kernel error variants;
//! the compression schemes in `codec` relabel those as `CorruptPatch` at their
//! boundary.

/// Sparsity exploitation
pub mod rle;

/// Bit-width reduction
pub mod leb128;
pub mod sigbits;
pub mod zigzag;

/// Entropy coding
pub mod deflate;
pub mod zstd;

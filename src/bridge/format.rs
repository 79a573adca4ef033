// In: src/bridge/format.rs

//! Report structures returned across the bridge. They carry only plain data so
//! a binding layer can render them without knowing the codec's types.

use serde::Serialize;

use crate::codec::Compression;

/// Size breakdown of a serialized patch, produced from its header alone.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PatchAnalysis {
    pub pcid: u32,
    pub compression: Compression,
    pub npoints: u32,
    pub header_size: usize,
    pub payload_size: usize,
    pub total_size: usize,
    /// `npoints * point size`: what the payload expands to when decoded.
    pub decoded_size: usize,
}

impl PatchAnalysis {
    /// Decoded bytes per serialized byte. `None` for an empty patch.
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.decoded_size == 0 {
            None
        } else {
            Some(self.decoded_size as f64 / self.total_size as f64)
        }
    }
}

// In: src/config.rs

//! The single source of truth for all pcpatch codec configuration.
//!
//! `PatchConfig` is created once at the application boundary (e.g., from a JSON
//! document handed over by the binding layer) and then passed down by reference,
//! or shared as a read-only `Arc<PatchConfig>`, to every compress call.
//!
//! Decompression never consults the configuration: everything a decoder needs is
//! recorded inline in the patch header and payload.

use serde::{Deserialize, Serialize};

use crate::codec::Compression;
use crate::error::Result;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// Defines the trade-off between compression speed and final patch size.
///
/// This enum is the primary input to the Dimensional column planner and selects
/// the levels used by the deflate and zstd kernels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompressionProfile {
    /// Prioritizes speed over size. Column methods are picked by the run-count /
    /// common-bit heuristic without trial encoding.
    Fast,

    /// A balance between speed and size. This is the recommended default.
    #[default]
    Balanced,

    /// Prioritizes the smallest possible patch at the cost of CPU time.
    /// Uses the highest kernel levels.
    HighCompression,
}

impl CompressionProfile {
    /// Deflate level (0-9) implied by the profile.
    pub fn deflate_level(&self) -> u32 {
        match self {
            CompressionProfile::Fast => 1,
            CompressionProfile::Balanced => 6,
            CompressionProfile::HighCompression => 9,
        }
    }

    /// Zstd level implied by the profile.
    pub fn zstd_level(&self) -> i32 {
        match self {
            CompressionProfile::Fast => 1,
            CompressionProfile::Balanced => 3,
            CompressionProfile::HighCompression => 19,
        }
    }

    /// Whether the Dimensional planner encodes every candidate and keeps the
    /// smallest, rather than trusting the heuristic.
    pub fn uses_trial_encoding(&self) -> bool {
        !matches!(self, CompressionProfile::Fast)
    }
}

//==================================================================================
// II. The Unified PatchConfig
//==================================================================================

/// The single, unified configuration for building and compressing patches.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PatchConfig {
    /// The primary profile guiding compression/speed trade-offs.
    #[serde(default)]
    pub profile: CompressionProfile,

    /// Scheme used by the bridge when a caller does not name one.
    #[serde(default = "default_compression")]
    pub default_compression: Compression,

    /// Number of high bits of each spatial axis that form a Hierarchical
    /// cluster key. Clamped to the axis word width at compress time.
    #[serde(default = "default_hierarchy_key_bits")]
    pub hierarchy_key_bits: u8,

    /// If false, patches are built without the optional min/max/avg block.
    #[serde(default = "default_true")]
    pub compute_stats: bool,

    /// Overrides the profile's zstd level.
    #[serde(default)]
    pub zstd_level: Option<i32>,

    /// Overrides the profile's deflate level.
    #[serde(default)]
    pub deflate_level: Option<u32>,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            profile: CompressionProfile::default(),
            default_compression: default_compression(),
            hierarchy_key_bits: default_hierarchy_key_bits(),
            compute_stats: true,
            zstd_level: None,
            deflate_level: None,
        }
    }
}

impl PatchConfig {
    /// A default configuration with the given profile.
    pub fn with_profile(profile: CompressionProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Parses a configuration from a JSON document. Missing fields take their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective zstd level: the explicit override, else the profile's.
    pub fn effective_zstd_level(&self) -> i32 {
        self.zstd_level.unwrap_or_else(|| self.profile.zstd_level())
    }

    /// Effective deflate level, clamped to 0..=9.
    pub fn effective_deflate_level(&self) -> u32 {
        self.deflate_level
            .unwrap_or_else(|| self.profile.deflate_level())
            .min(9)
    }
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

fn default_compression() -> Compression {
    Compression::Dimensional
}

fn default_hierarchy_key_bits() -> u8 {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PatchConfig::default();
        assert_eq!(config.profile, CompressionProfile::Balanced);
        assert_eq!(config.default_compression, Compression::Dimensional);
        assert_eq!(config.hierarchy_key_bits, 8);
        assert!(config.compute_stats);
        assert_eq!(config.effective_zstd_level(), 3);
        assert_eq!(config.effective_deflate_level(), 6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            PatchConfig::from_json_str(r#"{"profile": "high_compression", "deflate_level": 12}"#)
                .unwrap();
        assert_eq!(config.profile, CompressionProfile::HighCompression);
        assert_eq!(config.effective_zstd_level(), 19);
        assert_eq!(config.effective_deflate_level(), 9);
        assert!(config.compute_stats);
    }

    #[test]
    fn test_invalid_json_is_serde_error() {
        let err = PatchConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, crate::error::PatchError::SerdeJson(_)));
    }
}

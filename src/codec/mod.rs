// In: src/codec/mod.rs

//! The compression schemes and their static dispatch table.
//!
//! A scheme converts between the point-major raw buffer of a patch (the
//! concatenation of `npoints` point buffers) and its payload bytes. The set of
//! schemes is closed: `Compression` is the one-byte tag stored in every patch
//! header, and `SCHEMES` maps each tag to its compress/decompress pair.
//! Decompression dispatches purely on the stored tag.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::schema::Schema;
use crate::utils::checked_buffer_len;

pub mod dimensional;
pub mod dimstats;
pub mod external;
pub mod hierarchical;
pub mod planner;
pub mod uncompressed;


//==================================================================================
// 1. The Compression Tag
//==================================================================================

/// Identifies the scheme of a patch payload. The discriminant is the wire tag.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Compression {
    Uncompressed = 0,
    Dimensional = 1,
    Hierarchical = 2,
    ExternalLossless = 3,
}

impl Compression {
    pub const ALL: [Compression; 4] = [
        Compression::Uncompressed,
        Compression::Dimensional,
        Compression::Hierarchical,
        Compression::ExternalLossless,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        SCHEMES[self as usize].name
    }
}

impl TryFrom<u8> for Compression {
    type Error = PatchError;

    fn try_from(tag: u8) -> Result<Self> {
        Compression::ALL
            .get(tag as usize)
            .copied()
            .ok_or(PatchError::UnsupportedScheme(tag))
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//==================================================================================
// 2. The Dispatch Table
//==================================================================================

type CompressFn = fn(&Schema, &[u8], usize, &PatchConfig) -> Result<Vec<u8>>;
type DecompressFn = fn(&Schema, &[u8], usize) -> Result<Vec<u8>>;

struct Scheme {
    name: &'static str,
    compress: CompressFn,
    decompress: DecompressFn,
}

/// Indexed by `Compression as usize`.
static SCHEMES: [Scheme; 4] = [
    Scheme {
        name: "Uncompressed",
        compress: uncompressed::compress,
        decompress: uncompressed::decompress,
    },
    Scheme {
        name: "Dimensional",
        compress: dimensional::compress,
        decompress: dimensional::decompress,
    },
    Scheme {
        name: "Hierarchical",
        compress: hierarchical::compress,
        decompress: hierarchical::decompress,
    },
    Scheme {
        name: "ExternalLossless",
        compress: external::compress,
        decompress: external::decompress,
    },
];

//==================================================================================
// 3. Public API
//==================================================================================

/// Encodes a point-major buffer of `npoints` points with `compression`.
pub fn compress(
    compression: Compression,
    schema: &Schema,
    points_raw: &[u8],
    npoints: usize,
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    let expected = checked_buffer_len(npoints, schema.size())?;
    if points_raw.len() != expected {
        return Err(PatchError::CorruptPatch(format!(
            "point buffer of {} bytes does not hold {} points of {} bytes",
            points_raw.len(),
            npoints,
            schema.size()
        )));
    }
    (SCHEMES[compression as usize].compress)(schema, points_raw, npoints, config)
}

/// Decodes a payload back into the point-major buffer of `npoints` points.
///
/// Kernel failures are reported as `CorruptPatch` naming the scheme.
pub fn decompress(
    compression: Compression,
    schema: &Schema,
    payload: &[u8],
    npoints: usize,
) -> Result<Vec<u8>> {
    #[cfg(test)]
    decode_counter::bump();

    let scheme = &SCHEMES[compression as usize];
    let points_raw =
        (scheme.decompress)(schema, payload, npoints).map_err(|e| e.into_corrupt(scheme.name))?;

    let expected = checked_buffer_len(npoints, schema.size())?;
    if points_raw.len() != expected {
        return Err(PatchError::CorruptPatch(format!(
            "{}: decoded {} bytes, expected {}",
            scheme.name,
            points_raw.len(),
            expected
        )));
    }
    Ok(points_raw)
}


//==================================================================================
// 4. Column Helpers shared by the schemes
//==================================================================================

/// The words of dimension `position` for every point, in point order.
pub(crate) fn column_words(schema: &Schema, points_raw: &[u8], position: usize) -> Vec<u64> {
    let size = schema.size();
    match schema.dimension(position) {
        Some(dim) => points_raw
            .chunks_exact(size)
            .map(|p| dim.read_word(p, schema.endian()))
            .collect(),
        None => Vec::new(),
    }
}

// In: src/patch/mod.rs

//! The patch: the aggregate unit of storage.
//!
//! A `Patch` holds the schema reference (pcid), the compression tag, the point
//! count, the exact bounding box of its decoded points, optional per-dimension
//! statistics and the scheme payload. Patches are immutable values; every
//! operation on them produces a new patch with its own payload.

use serde::{Deserialize, Serialize};

use crate::codec::{self, Compression};
use crate::error::Result;
use crate::point::Point;
use crate::schema::Schema;

pub mod artifact;
pub mod builder;
pub mod stats;

pub use artifact::PatchHeader;
pub use builder::{build, build_from_raw, build_from_values};
pub use stats::{bounds_of, stats_of};

//==================================================================================
// 1. Bounds & Statistics
//==================================================================================

/// The axis-aligned bounding box of a patch, one entry per dimension in schema
/// order. `Empty` marks a patch without points, which is distinct from the
/// degenerate box of a single point.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bounds {
    Empty,
    Extent { min: Vec<f64>, max: Vec<f64> },
}

impl Bounds {
    pub fn is_empty(&self) -> bool {
        matches!(self, Bounds::Empty)
    }

    pub fn min(&self) -> Option<&[f64]> {
        match self {
            Bounds::Empty => None,
            Bounds::Extent { min, .. } => Some(min),
        }
    }

    pub fn max(&self) -> Option<&[f64]> {
        match self {
            Bounds::Empty => None,
            Bounds::Extent { max, .. } => Some(max),
        }
    }

    /// True when both boxes are non-empty and overlap (inclusive) on every
    /// dimension. Boxes of different dimensionality never intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        match (self, other) {
            (
                Bounds::Extent { min: amin, max: amax },
                Bounds::Extent { min: bmin, max: bmax },
            ) => {
                amin.len() == bmin.len()
                    && amin
                        .iter()
                        .zip(amax)
                        .zip(bmin.iter().zip(bmax))
                        .all(|((alo, ahi), (blo, bhi))| alo <= bhi && blo <= ahi)
            }
            _ => false,
        }
    }

    /// True when `values` (one per dimension) lie inside the box, inclusive.
    pub fn contains(&self, values: &[f64]) -> bool {
        match self {
            Bounds::Empty => false,
            Bounds::Extent { min, max } => {
                min.len() == values.len()
                    && values
                        .iter()
                        .zip(min.iter().zip(max))
                        .all(|(v, (lo, hi))| lo <= v && v <= hi)
            }
        }
    }

    /// The smallest box containing both. `Empty` is the identity.
    pub fn merge(&self, other: &Bounds) -> Bounds {
        match (self, other) {
            (Bounds::Empty, b) => b.clone(),
            (a, Bounds::Empty) => a.clone(),
            (
                Bounds::Extent { min: amin, max: amax },
                Bounds::Extent { min: bmin, max: bmax },
            ) => Bounds::Extent {
                min: amin.iter().zip(bmin).map(|(a, b)| a.min(*b)).collect(),
                max: amax.iter().zip(bmax).map(|(a, b)| a.max(*b)).collect(),
            },
        }
    }
}

/// Per-dimension statistics, in schema order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PatchStats {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub avg: Vec<f64>,
}

//==================================================================================
// 2. The Patch
//==================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub(crate) pcid: u32,
    pub(crate) compression: Compression,
    pub(crate) npoints: u32,
    pub(crate) bounds: Bounds,
    pub(crate) stats: Option<PatchStats>,
    pub(crate) payload: Vec<u8>,
}

/// The JSON-friendly description of a patch, without its payload.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PatchSummary {
    pub pcid: u32,
    pub srid: i32,
    pub compression: Compression,
    pub npoints: u32,
    pub dimensions: Vec<String>,
    pub bounds: Bounds,
    pub stats: Option<PatchStats>,
}

impl PatchSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Patch {
    pub fn pcid(&self) -> u32 {
        self.pcid
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn npoints(&self) -> u32 {
        self.npoints
    }

    pub fn is_empty(&self) -> bool {
        self.npoints == 0
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn stats(&self) -> Option<&PatchStats> {
        self.stats.as_ref()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decodes the payload into the point-major raw buffer.
    pub fn decode(&self, schema: &Schema) -> Result<Vec<u8>> {
        schema.check_pcid(self.pcid)?;
        codec::decompress(self.compression, schema, &self.payload, self.npoints as usize)
    }

    /// Decodes the payload into owned points.
    pub fn points(&self, schema: &Schema) -> Result<Vec<Point>> {
        let raw = self.decode(schema)?;
        Ok(raw
            .chunks_exact(schema.size())
            .map(|p| Point::from_parts(self.pcid, p.to_vec()))
            .collect())
    }

    /// The decoded in-memory footprint, independent of the payload size.
    pub fn memory_size(&self, schema: &Schema) -> usize {
        self.npoints as usize * schema.size()
    }

    /// Payload bytes per point; an empty patch scores `f64::INFINITY`.
    pub(crate) fn payload_density(&self) -> f64 {
        if self.npoints == 0 {
            f64::INFINITY
        } else {
            self.payload.len() as f64 / self.npoints as f64
        }
    }

    pub fn summary(&self, schema: &Schema) -> Result<PatchSummary> {
        schema.check_pcid(self.pcid)?;
        Ok(PatchSummary {
            pcid: self.pcid,
            srid: schema.srid(),
            compression: self.compression,
            npoints: self.npoints,
            dimensions: schema.dimensions().iter().map(|d| d.name.clone()).collect(),
            bounds: self.bounds.clone(),
            stats: self.stats.clone(),
        })
    }
}

// In: src/codec/dimstats.rs

//! Running per-dimension statistics that drive the column method heuristic.
//!
//! A `DimensionStats` accumulates, over one or many patches of the same schema,
//! the number of value runs and the number of shared high bits of every
//! dimension. From those totals it estimates the RLE and significant-bits sizes
//! against the raw size and recommends a column method:
//!
//! - RLE when `raw / rle > 4.0`,
//! - else significant bits when `raw / sigbits > 1.6`,
//! - else deflate.
//!
//! RLE and significant bits are only ever recommended for integer dimensions.

use serde::{Deserialize, Serialize};

use super::column_words;
use super::dimensional::ColumnMethod;
use crate::error::{PatchError, Result};
use crate::kernels::{rle, sigbits};
use crate::schema::{Dimension, Schema};
use crate::utils::checked_buffer_len;

const RLE_RATIO_THRESHOLD: f64 = 4.0;
const SIGBITS_RATIO_THRESHOLD: f64 = 1.6;

/// Accumulated statistics for one dimension.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DimStat {
    pub total_runs: u64,
    pub total_commonbits: u64,
    pub recommended_compression: ColumnMethod,
}

impl Default for DimStat {
    fn default() -> Self {
        Self {
            total_runs: 0,
            total_commonbits: 0,
            recommended_compression: ColumnMethod::Deflate,
        }
    }
}

/// Accumulated statistics for every dimension of a schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DimensionStats {
    pub ndims: usize,
    pub total_points: u64,
    pub total_patches: u64,
    pub dims: Vec<DimStat>,
}

impl DimensionStats {
    pub fn new(schema: &Schema) -> Self {
        Self {
            ndims: schema.ndims(),
            total_points: 0,
            total_patches: 0,
            dims: vec![DimStat::default(); schema.ndims()],
        }
    }

    /// Folds one point-major buffer (one patch) into the totals and refreshes
    /// the recommendations.
    pub fn update(&mut self, schema: &Schema, points_raw: &[u8], npoints: usize) -> Result<()> {
        if schema.ndims() != self.ndims {
            return Err(PatchError::InvalidSchema(format!(
                "statistics track {} dimensions, schema {} has {}",
                self.ndims,
                schema.pcid(),
                schema.ndims()
            )));
        }
        if points_raw.len() != checked_buffer_len(npoints, schema.size())? {
            return Err(PatchError::CorruptPatch(format!(
                "point buffer of {} bytes does not hold {} points",
                points_raw.len(),
                npoints
            )));
        }

        self.total_points += npoints as u64;
        self.total_patches += 1;

        for (dim, stat) in schema.dimensions().iter().zip(self.dims.iter_mut()) {
            let words = column_words(schema, points_raw, dim.position);
            stat.total_runs += rle::count_runs(&words) as u64;
            stat.total_commonbits += sigbits::common_bits(&words, dim.interpretation.bit_width()).0 as u64;
        }

        for (dim, stat) in schema.dimensions().iter().zip(self.dims.iter_mut()) {
            stat.recommended_compression = recommend(
                dim,
                self.total_points,
                self.total_patches,
                stat.total_runs,
                stat.total_commonbits,
            );
        }
        Ok(())
    }

    /// The recommendation for dimension `position`.
    pub fn recommended(&self, position: usize) -> Option<ColumnMethod> {
        self.dims.get(position).map(|d| d.recommended_compression)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Size-estimate heuristic for one dimension's totals.
pub fn recommend(
    dim: &Dimension,
    total_points: u64,
    total_patches: u64,
    total_runs: u64,
    total_commonbits: u64,
) -> ColumnMethod {
    if !dim.interpretation.is_integer() || total_patches == 0 {
        return ColumnMethod::Deflate;
    }

    let size = dim.size as f64;
    let raw_size = total_points as f64 * size;
    // Each run stores one value and (at least) one count byte.
    let rle_size = total_runs as f64 * (size + 1.0);
    // Each patch stores a header and the unique bits of every value.
    let avg_commonbits = total_commonbits as f64 / total_patches as f64;
    let avg_uniquebits = 8.0 * size - avg_commonbits;
    let sigbits_size =
        total_patches as f64 * 2.0 * size + total_points as f64 * avg_uniquebits / 8.0;

    let mut method = ColumnMethod::Deflate;
    if raw_size / sigbits_size > SIGBITS_RATIO_THRESHOLD {
        method = ColumnMethod::Sigbits;
    }
    if raw_size / rle_size > RLE_RATIO_THRESHOLD {
        method = ColumnMethod::Rle;
    }
    method
}

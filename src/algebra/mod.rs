// In: src/algebra/mod.rs

//! The patch algebra: pure operations that turn patches into new patches.
//!
//! Every operation decodes through the scheme recorded on its input, works on
//! the point-major buffer, and re-encodes the result. Unless the caller names a
//! target scheme, a unary operation keeps its input's scheme; an operation over
//! several inputs takes the scheme of the one with the fewest payload bytes per
//! point, falling back to the first input on ties or when any input is empty.
//!
//! Hierarchical patches decode in cluster order. Operations whose result is
//! defined by point order (`sort`, `union`, `merge`, `range`) therefore encode
//! with Dimensional when Hierarchical would otherwise be chosen.

use crate::codec::Compression;
use crate::config::PatchConfig;
use crate::error::Result;
use crate::patch::{build_from_raw, Patch, PatchSummary};
use crate::schema::Schema;

pub mod extract;
pub mod filter;
pub mod schema_ops;
pub mod setops;
pub mod sort;

#[cfg(test)]
mod algebra_tests;

pub use extract::{point_at, range};
pub use filter::{filter, Predicate};
pub use schema_ops::{map_points, set_pcid, transform};
pub use setops::{intersection, merge, union};
pub use sort::{is_sorted, sort};

//==================================================================================
// 1. Shared Helpers
//==================================================================================

/// The scheme a multi-input operation encodes its result with.
pub(crate) fn preferred_compression(patches: &[&Patch]) -> Option<Compression> {
    let first = patches.first()?;
    if patches.iter().any(|p| p.is_empty()) {
        return Some(first.compression());
    }
    let mut best = *first;
    for &patch in &patches[1..] {
        if patch.payload_density() < best.payload_density() {
            best = patch;
        }
    }
    Some(best.compression())
}

/// The scheme to use when the result's point order must survive a round trip.
pub(crate) fn order_preserving(compression: Compression) -> Compression {
    match compression {
        Compression::Hierarchical => {
            log::debug!("hierarchical output reorders points, encoding as dimensional");
            Compression::Dimensional
        }
        other => other,
    }
}

/// Re-encodes a decoded buffer as a new patch under `schema`.
pub(crate) fn rebuild(
    schema: &Schema,
    points_raw: &[u8],
    compression: Compression,
    config: &PatchConfig,
) -> Result<Patch> {
    let npoints = points_raw.len() / schema.size();
    build_from_raw(schema, points_raw, npoints, compression, config)
}

//==================================================================================
// 2. Whole-Patch Operations
//==================================================================================

/// Re-encodes a patch with another scheme. Recompressing to `Uncompressed`
/// is the uncompress operation.
pub fn recompress(
    schema: &Schema,
    patch: &Patch,
    compression: Compression,
    config: &PatchConfig,
) -> Result<Patch> {
    let raw = patch.decode(schema)?;
    rebuild(schema, &raw, compression, config)
}

/// Decoded footprint in bytes: `npoints * point size`.
pub fn memory_size(schema: &Schema, patch: &Patch) -> Result<usize> {
    schema.check_pcid(patch.pcid())?;
    Ok(patch.memory_size(schema))
}

/// Point count, bounds and statistics, without decoding the payload.
pub fn summary(schema: &Schema, patch: &Patch) -> Result<PatchSummary> {
    patch.summary(schema)
}

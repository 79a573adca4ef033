// In: src/algebra/extract.rs

//! Point and sub-patch extraction by 0-based index.

use super::{order_preserving, rebuild};
use crate::codec::Compression;
use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::patch::Patch;
use crate::point::Point;
use crate::schema::Schema;

/// The point at `index`.
pub fn point_at(schema: &Schema, patch: &Patch, index: usize) -> Result<Point> {
    schema.check_pcid(patch.pcid())?;
    if index >= patch.npoints() as usize {
        return Err(PatchError::IndexOutOfRange {
            index: index as u64,
            npoints: patch.npoints(),
        });
    }
    let raw = patch.decode(schema)?;
    let size = schema.size();
    Ok(Point::from_parts(
        patch.pcid(),
        raw[index * size..(index + 1) * size].to_vec(),
    ))
}

/// Up to `count` points starting at `first`. The count is clamped to the
/// points available; `first == npoints` yields an empty patch.
pub fn range(
    schema: &Schema,
    patch: &Patch,
    first: usize,
    count: usize,
    target: Option<Compression>,
    config: &PatchConfig,
) -> Result<Patch> {
    schema.check_pcid(patch.pcid())?;
    let npoints = patch.npoints() as usize;
    if first > npoints {
        return Err(PatchError::IndexOutOfRange {
            index: first as u64,
            npoints: patch.npoints(),
        });
    }
    let end = first + count.min(npoints - first);

    let raw = patch.decode(schema)?;
    let size = schema.size();
    rebuild(
        schema,
        &raw[first * size..end * size],
        order_preserving(target.unwrap_or(patch.compression())),
        config,
    )
}

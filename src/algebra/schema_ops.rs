// In: src/algebra/schema_ops.rs

//! Operations that move a patch between schemas or rewrite its points.

use super::rebuild;
use crate::codec::Compression;
use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::patch::Patch;
use crate::point::Point;
use crate::schema::Schema;
use crate::utils::try_alloc;

/// Re-tags a patch with `new_schema`'s pcid without touching the payload.
///
/// Only valid between binary-compatible schemas; anything else is a
/// `SchemaMismatch`.
pub fn set_pcid(schema: &Schema, patch: &Patch, new_schema: &Schema) -> Result<Patch> {
    schema.check_pcid(patch.pcid())?;
    if !schema.is_binary_compatible(new_schema) {
        return Err(PatchError::SchemaMismatch {
            expected: schema.pcid(),
            found: new_schema.pcid(),
        });
    }
    let mut retagged = patch.clone();
    retagged.pcid = new_schema.pcid();
    Ok(retagged)
}

/// Re-encodes every point under `new_schema`, matching dimensions by name.
/// Dimensions the old schema lacks take `default`. Both schemas must share a
/// spatial reference.
pub fn transform(
    schema: &Schema,
    patch: &Patch,
    new_schema: &Schema,
    default: f64,
    target: Option<Compression>,
    config: &PatchConfig,
) -> Result<Patch> {
    if schema.srid() != new_schema.srid() {
        return Err(PatchError::InvalidSchema(format!(
            "cannot transform from srid {} to srid {}; reprojection is not supported",
            schema.srid(),
            new_schema.srid()
        )));
    }

    let sources: Vec<_> = new_schema
        .dimensions()
        .iter()
        .map(|d| schema.dimension_by_name(&d.name).ok())
        .collect();

    let raw = patch.decode(schema)?;
    let npoints = patch.npoints() as usize;
    let mut out = try_alloc(npoints.saturating_mul(new_schema.size()))?;
    let mut values = Vec::with_capacity(sources.len());
    for point in raw.chunks_exact(schema.size()) {
        values.clear();
        values.extend(sources.iter().map(|src| match src {
            Some(dim) => dim.word_to_value(dim.read_word(point, schema.endian())),
            None => default,
        }));
        out.extend(Point::from_values(new_schema, &values)?.into_raw());
    }
    rebuild(new_schema, &out, target.unwrap_or(patch.compression()), config)
}

/// Applies `f` to every point and rebuilds. The returned points must belong to
/// the same schema.
pub fn map_points<F>(
    schema: &Schema,
    patch: &Patch,
    f: F,
    target: Option<Compression>,
    config: &PatchConfig,
) -> Result<Patch>
where
    F: Fn(Point) -> Result<Point>,
{
    let points = patch
        .points(schema)?
        .into_iter()
        .map(f)
        .collect::<Result<Vec<_>>>()?;
    crate::patch::build(schema, &points, target.unwrap_or(patch.compression()), config)
}

// In: src/algebra/setops.rs

//! Operations over several patches of the same schema.

use super::{order_preserving, preferred_compression, rebuild};
use crate::codec::Compression;
use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::patch::Patch;
use crate::schema::Schema;
use crate::utils::try_alloc;

fn check_same_schema(schema: &Schema, patches: &[&Patch]) -> Result<()> {
    patches.iter().try_for_each(|p| schema.check_pcid(p.pcid()))
}

/// The points of `a` that fall inside `b`'s bounding box.
///
/// This is an envelope filter, not a set intersection: it is asymmetric, and
/// `b`'s payload is never decoded. When the boxes do not overlap the result is
/// empty and neither payload is decoded.
pub fn intersection(
    schema: &Schema,
    a: &Patch,
    b: &Patch,
    target: Option<Compression>,
    config: &PatchConfig,
) -> Result<Patch> {
    check_same_schema(schema, &[a, b])?;
    let compression = target
        .or_else(|| preferred_compression(&[a, b]))
        .unwrap_or(a.compression());

    if !a.bounds().intersects(b.bounds()) {
        log::debug!("intersection: disjoint bounds, skipping decode");
        return rebuild(schema, &[], compression, config);
    }

    let raw = a.decode(schema)?;
    let mut kept = try_alloc(raw.len())?;
    let mut values = Vec::with_capacity(schema.ndims());
    for point in raw.chunks_exact(schema.size()) {
        values.clear();
        values.extend(
            schema
                .dimensions()
                .iter()
                .map(|d| d.word_to_value(d.read_word(point, schema.endian()))),
        );
        if b.bounds().contains(&values) {
            kept.extend_from_slice(point);
        }
    }
    rebuild(schema, &kept, compression, config)
}

/// The points of `a` followed by the points of `b`.
pub fn union(
    schema: &Schema,
    a: &Patch,
    b: &Patch,
    target: Option<Compression>,
    config: &PatchConfig,
) -> Result<Patch> {
    concat(schema, &[a, b], target, config)
}

/// The points of every patch, in list order.
pub fn merge(
    schema: &Schema,
    patches: &[Patch],
    target: Option<Compression>,
    config: &PatchConfig,
) -> Result<Patch> {
    if patches.is_empty() {
        return Err(PatchError::EmptyPatchList);
    }
    let refs: Vec<&Patch> = patches.iter().collect();
    concat(schema, &refs, target, config)
}

fn concat(
    schema: &Schema,
    patches: &[&Patch],
    target: Option<Compression>,
    config: &PatchConfig,
) -> Result<Patch> {
    check_same_schema(schema, patches)?;
    let compression = target
        .or_else(|| preferred_compression(patches))
        .map(order_preserving)
        .ok_or(PatchError::EmptyPatchList)?;

    let total: usize = patches.iter().map(|p| p.memory_size(schema)).sum();
    let mut raw = try_alloc(total)?;
    for patch in patches {
        raw.extend(patch.decode(schema)?);
    }
    rebuild(schema, &raw, compression, config)
}

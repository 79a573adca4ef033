// In: src/algebra/sort.rs

//! Lexicographic sorting of a patch's points.
//!
//! Keys are built from each dimension's order-preserving word form, so the
//! order matches the decoded values without converting to floats. Integer
//! dimensions with a negative scale have their key inverted. Float `-0.0`
//! and `+0.0` compare equal.

use super::{order_preserving, rebuild};
use crate::codec::Compression;
use crate::config::PatchConfig;
use crate::error::Result;
use crate::patch::Patch;
use crate::schema::{Dimension, Schema};
use crate::utils::try_alloc;

fn sort_dimensions<'a>(schema: &'a Schema, names: &[&str]) -> Result<Vec<&'a Dimension>> {
    names.iter().map(|n| schema.dimension_by_name(n)).collect()
}

/// Maps a float `-0.0` word onto `+0.0` so both zeros share one key.
fn unsigned_zero(dim: &Dimension, word: u64) -> u64 {
    let sign = 1u64 << (dim.interpretation.bit_width() - 1);
    if dim.interpretation.is_float() && word == sign {
        0
    } else {
        word
    }
}

/// One key per point, in point order.
fn point_keys(schema: &Schema, dims: &[&Dimension], raw: &[u8]) -> Vec<Vec<u64>> {
    raw.chunks_exact(schema.size())
        .map(|point| {
            dims.iter()
                .map(|dim| {
                    let word = unsigned_zero(dim, dim.read_word(point, schema.endian()));
                    let key = dim.interpretation.orderable(word);
                    if dim.interpretation.is_integer() && dim.scale < 0.0 {
                        !key & dim.interpretation.word_mask()
                    } else {
                        key
                    }
                })
                .collect()
        })
        .collect()
}

/// Stable ascending sort by the named dimensions, compared left to right.
pub fn sort(
    schema: &Schema,
    patch: &Patch,
    dimensions: &[&str],
    target: Option<Compression>,
    config: &PatchConfig,
) -> Result<Patch> {
    let dims = sort_dimensions(schema, dimensions)?;
    let raw = patch.decode(schema)?;
    let keys = point_keys(schema, &dims, &raw);

    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

    let size = schema.size();
    let mut sorted = try_alloc(raw.len())?;
    for i in order {
        sorted.extend_from_slice(&raw[i * size..(i + 1) * size]);
    }
    let compression = order_preserving(target.unwrap_or(patch.compression()));
    rebuild(schema, &sorted, compression, config)
}

/// Whether the points are in ascending order of the named dimensions.
/// `strict` additionally rejects equal neighbours.
pub fn is_sorted(schema: &Schema, patch: &Patch, dimensions: &[&str], strict: bool) -> Result<bool> {
    let dims = sort_dimensions(schema, dimensions)?;
    let raw = patch.decode(schema)?;
    let keys = point_keys(schema, &dims, &raw);
    Ok(keys
        .windows(2)
        .all(|w| if strict { w[0] < w[1] } else { w[0] <= w[1] }))
}

// In: src/patch/stats.rs

//! Bounding boxes and per-dimension statistics of a point-major buffer.
//!
//! Both are computed from decoded values, so a negative scale is handled
//! naturally. NaN values never widen a box. The average is independent of
//! point order:
//! - integer dimensions sum their raw integers exactly in `i128`, then apply
//!   scale and offset once;
//! - float dimensions sum their values in ascending order with Neumaier
//!   compensation.

use super::{Bounds, PatchStats};
use crate::schema::{Dimension, Schema};

/// Min and max of every dimension's decoded values.
fn extent(schema: &Schema, points_raw: &[u8], npoints: usize) -> (Vec<f64>, Vec<f64>) {
    let ndims = schema.ndims();
    let mut min = vec![f64::INFINITY; ndims];
    let mut max = vec![f64::NEG_INFINITY; ndims];
    for point in points_raw.chunks_exact(schema.size()).take(npoints) {
        for dim in schema.dimensions() {
            let value = dim.word_to_value(dim.read_word(point, schema.endian()));
            min[dim.position] = min[dim.position].min(value);
            max[dim.position] = max[dim.position].max(value);
        }
    }
    (min, max)
}

/// The exact bounding box of the first `npoints` points, or `Empty` for none.
pub fn bounds_of(schema: &Schema, points_raw: &[u8], npoints: usize) -> Bounds {
    if npoints == 0 {
        return Bounds::Empty;
    }
    let (min, max) = extent(schema, points_raw, npoints);
    Bounds::Extent { min, max }
}

/// Min, max and average per dimension, or `None` for no points.
pub fn stats_of(schema: &Schema, points_raw: &[u8], npoints: usize) -> Option<PatchStats> {
    if npoints == 0 {
        return None;
    }
    let (min, max) = extent(schema, points_raw, npoints);
    let avg = schema
        .dimensions()
        .iter()
        .map(|dim| average(schema, dim, points_raw, npoints))
        .collect();
    Some(PatchStats { min, max, avg })
}

fn average(schema: &Schema, dim: &Dimension, points_raw: &[u8], npoints: usize) -> f64 {
    let words = points_raw
        .chunks_exact(schema.size())
        .take(npoints)
        .map(|p| dim.read_word(p, schema.endian()));

    if dim.interpretation.is_integer() {
        let sum: i128 = words.map(|w| dim.interpretation.word_to_i128(w)).sum();
        (sum as f64 / npoints as f64) * dim.scale + dim.offset
    } else {
        let mut values: Vec<f64> = words.map(|w| dim.interpretation.word_to_f64(w)).collect();
        values.sort_by(f64::total_cmp);
        neumaier_sum(&values) / npoints as f64
    }
}

/// Compensated summation.
fn neumaier_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0f64;
    let mut compensation = 0.0f64;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

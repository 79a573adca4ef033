// In: src/algebra/filter.rs

//! Value filters over one dimension.
//!
//! Predicates are evaluated against each point's decoded value, the same
//! `raw * scale + offset` that bounds and point accessors report, so a
//! threshold taken from a patch's own values always selects those points.

use serde::{Deserialize, Serialize};

use super::rebuild;
use crate::codec::Compression;
use crate::config::PatchConfig;
use crate::error::Result;
use crate::patch::Patch;
use crate::schema::Schema;
use crate::utils::try_alloc;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Equal(f64),
    Less(f64),
    Greater(f64),
    /// Inclusive on both ends.
    Between(f64, f64),
}

impl Predicate {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Predicate::Equal(v) => value == v,
            Predicate::Less(v) => value < v,
            Predicate::Greater(v) => value > v,
            Predicate::Between(lo, hi) => lo <= value && value <= hi,
        }
    }
}

/// Keeps the points whose `dimension` value satisfies `predicate`, in order.
/// The result may be empty.
pub fn filter(
    schema: &Schema,
    patch: &Patch,
    dimension: &str,
    predicate: Predicate,
    target: Option<Compression>,
    config: &PatchConfig,
) -> Result<Patch> {
    let dim = schema.dimension_by_name(dimension)?;
    let raw = patch.decode(schema)?;

    let mut kept = try_alloc(raw.len())?;
    for point in raw.chunks_exact(schema.size()) {
        let word = dim.read_word(point, schema.endian());
        if predicate.matches(dim.word_to_value(word)) {
            kept.extend_from_slice(point);
        }
    }

    log::debug!(
        "filter {} {:?}: kept {} of {} points",
        dimension,
        predicate,
        kept.len() / schema.size(),
        patch.npoints()
    );
    rebuild(schema, &kept, target.unwrap_or(patch.compression()), config)
}

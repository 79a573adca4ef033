// In: src/bridge/stateless_api.rs

//! Single-call operations over serialized patches and points.
//!
//! Each function takes bytes in and gives bytes (or plain values) out. The
//! schema registry and the configuration are explicit arguments; nothing here
//! keeps state between calls.

use std::sync::Arc;

use crate::algebra::{self, Predicate};
use crate::bridge::format::PatchAnalysis;
use crate::codec::Compression;
use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::patch::{self, Bounds, Patch};
use crate::point::Point;
use crate::schema::{Schema, SchemaRegistry};

/// Parses patch bytes along with the schema snapshot they were read under.
fn load(registry: &SchemaRegistry, bytes: &[u8]) -> Result<(Arc<Schema>, Patch)> {
    Patch::from_bytes_with_schema(registry, bytes)
}

fn store(schema: &Schema, patch: &Patch) -> Result<Vec<u8>> {
    patch.to_bytes(schema)
}

//==================================================================================
// 1. Construction
//==================================================================================

/// Encodes one point from values in schema position order.
pub fn construct_point(registry: &SchemaRegistry, pcid: u32, values: &[f64]) -> Result<Vec<u8>> {
    let schema = registry.resolve(pcid)?;
    Point::from_values(&schema, values)?.to_bytes(&schema)
}

/// Builds a patch from serialized points, all of which must carry `pcid`.
/// Without an explicit scheme the configured default is used.
pub fn construct_patch(
    registry: &SchemaRegistry,
    pcid: u32,
    points: &[&[u8]],
    compression: Option<Compression>,
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    let schema = registry.resolve(pcid)?;
    let points = points
        .iter()
        .map(|bytes| Point::from_bytes(registry, bytes))
        .collect::<Result<Vec<_>>>()?;
    let built = patch::build(
        &schema,
        &points,
        compression.unwrap_or(config.default_compression),
        config,
    )?;
    store(&schema, &built)
}

//==================================================================================
// 2. Compression
//==================================================================================

pub fn compress_patch(
    registry: &SchemaRegistry,
    bytes: &[u8],
    compression: Option<Compression>,
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    let (schema, patch) = load(registry, bytes)?;
    let compression = compression.unwrap_or(config.default_compression);
    store(&schema, &algebra::recompress(&schema, &patch, compression, config)?)
}

pub fn uncompress_patch(registry: &SchemaRegistry, bytes: &[u8], config: &PatchConfig) -> Result<Vec<u8>> {
    compress_patch(registry, bytes, Some(Compression::Uncompressed), config)
}

//==================================================================================
// 3. Algebra
//==================================================================================

pub fn filter_patch(
    registry: &SchemaRegistry,
    bytes: &[u8],
    dimension: &str,
    predicate: Predicate,
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    let (schema, patch) = load(registry, bytes)?;
    store(
        &schema,
        &algebra::filter(&schema, &patch, dimension, predicate, None, config)?,
    )
}

/// The points of `a` inside `b`'s bounding box.
pub fn intersect_patch(
    registry: &SchemaRegistry,
    a: &[u8],
    b: &[u8],
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    let (schema, a) = load(registry, a)?;
    let b = Patch::from_bytes(registry, b)?;
    store(&schema, &algebra::intersection(&schema, &a, &b, None, config)?)
}

pub fn union_patches(
    registry: &SchemaRegistry,
    patches: &[&[u8]],
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    let (first, rest) = patches.split_first().ok_or(PatchError::EmptyPatchList)?;
    let (schema, head) = load(registry, first)?;
    let mut loaded = Vec::with_capacity(patches.len());
    loaded.push(head);
    for bytes in rest {
        loaded.push(Patch::from_bytes(registry, bytes)?);
    }
    let patches = loaded;
    store(&schema, &algebra::merge(&schema, &patches, None, config)?)
}

pub fn sort_patch(
    registry: &SchemaRegistry,
    bytes: &[u8],
    dimensions: &[&str],
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    let (schema, patch) = load(registry, bytes)?;
    store(&schema, &algebra::sort(&schema, &patch, dimensions, None, config)?)
}

pub fn is_sorted_patch(
    registry: &SchemaRegistry,
    bytes: &[u8],
    dimensions: &[&str],
    strict: bool,
) -> Result<bool> {
    let (schema, patch) = load(registry, bytes)?;
    algebra::is_sorted(&schema, &patch, dimensions, strict)
}

/// The serialized point at 0-based `index`.
pub fn point_at_index(registry: &SchemaRegistry, bytes: &[u8], index: usize) -> Result<Vec<u8>> {
    let (schema, patch) = load(registry, bytes)?;
    algebra::point_at(&schema, &patch, index)?.to_bytes(&schema)
}

/// Re-tags a patch with another registered, binary-compatible schema.
pub fn set_patch_pcid(registry: &SchemaRegistry, bytes: &[u8], new_pcid: u32) -> Result<Vec<u8>> {
    let (schema, patch) = load(registry, bytes)?;
    let new_schema = registry.resolve(new_pcid)?;
    store(&new_schema, &algebra::set_pcid(&schema, &patch, &new_schema)?)
}

//==================================================================================
// 4. Header-Only Queries
//==================================================================================

/// The summary as JSON.
pub fn patch_summary(registry: &SchemaRegistry, bytes: &[u8]) -> Result<String> {
    let (schema, patch) = load(registry, bytes)?;
    algebra::summary(&schema, &patch)?.to_json()
}

pub fn patch_memory_size(registry: &SchemaRegistry, bytes: &[u8]) -> Result<usize> {
    let (schema, header) = Patch::peek_header_with_schema(registry, bytes)?;
    Ok(header.npoints as usize * schema.size())
}

pub fn patch_bounds(registry: &SchemaRegistry, bytes: &[u8]) -> Result<Bounds> {
    Ok(Patch::peek_header(registry, bytes)?.bounds)
}

/// Size breakdown of a serialized patch, without decoding its payload.
pub fn analyze_patch(registry: &SchemaRegistry, bytes: &[u8]) -> Result<PatchAnalysis> {
    let (schema, header) = Patch::peek_header_with_schema(registry, bytes)?;
    Ok(PatchAnalysis {
        pcid: header.pcid,
        compression: header.compression,
        npoints: header.npoints,
        header_size: header.header_size,
        payload_size: header.payload_size,
        total_size: bytes.len(),
        decoded_size: header.npoints as usize * schema.size(),
    })
}

// In: src/codec/hierarchical.rs

//! The Hierarchical scheme: spatial clustering plus shared-prefix delta coding.
//!
//! Every point gets a cluster key made of the top `key_bits` bits of the
//! order-preserving bit patterns of its X, Y (and Z, if present) words. Points
//! are stably grouped by key in ascending key order, so nearby points land in
//! the same cluster and share the high bits of every coordinate.
//!
//! Payload layout:
//!
//! ```text
//! [key_bits u8][cluster count LEB128]
//! per cluster:
//!   [point count LEB128]
//!   per dimension:
//!     [common bit count u8][common prefix LEB128][first low value LEB128]
//!     [zig-zag delta LEB128] x (point count - 1)
//! ```
//!
//! The common prefix is the run of high bits shared by the dimension's words
//! inside the cluster (stored shifted down); the low values are the remaining
//! bits. Points decode in cluster order, so a round trip preserves the multiset
//! of points, not their order.

use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::kernels::{leb128, sigbits, zigzag};
use crate::schema::{Dimension, Schema};
use crate::types::Endian;
use crate::utils::{checked_buffer_len, try_alloc, ByteReader};

use super::column_words;

//==================================================================================
// 1. Clustering
//==================================================================================

/// Positions of the axes that form the cluster key.
fn key_axes(schema: &Schema) -> Result<Vec<usize>> {
    let (x, y) = match (schema.x_position(), schema.y_position()) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            return Err(PatchError::InvalidSchema(format!(
                "Hierarchical compression needs X and Y dimensions; schema {} lacks one",
                schema.pcid()
            )))
        }
    };
    let mut axes = vec![x, y];
    axes.extend(schema.z_position());
    Ok(axes)
}

/// The top `key_bits` of the orderable form of `word`.
fn key_part(dim: &Dimension, word: u64, key_bits: u32) -> u64 {
    let width = dim.interpretation.bit_width();
    let bits = key_bits.min(width);
    if bits == 0 {
        return 0;
    }
    dim.interpretation.orderable(word) >> (width - bits)
}

/// Point indices grouped into clusters, clusters in ascending key order.
pub(crate) fn cluster_points(
    schema: &Schema,
    points_raw: &[u8],
    key_bits: u32,
) -> Result<Vec<Vec<usize>>> {
    let axes = key_axes(schema)?;
    let columns: Vec<(&Dimension, Vec<u64>)> = axes
        .iter()
        .filter_map(|&pos| schema.dimension(pos))
        .map(|dim| (dim, column_words(schema, points_raw, dim.position)))
        .collect();

    let npoints = points_raw.len() / schema.size();
    let keys: Vec<Vec<u64>> = (0..npoints)
        .map(|i| {
            columns
                .iter()
                .map(|(dim, words)| key_part(dim, words[i], key_bits))
                .collect()
        })
        .collect();

    let mut order: Vec<usize> = (0..npoints).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

    let mut clusters: Vec<Vec<usize>> = Vec::new();
    for idx in order {
        match clusters.last_mut() {
            Some(cluster) if keys[cluster[0]] == keys[idx] => cluster.push(idx),
            _ => clusters.push(vec![idx]),
        }
    }
    Ok(clusters)
}

//==================================================================================
// 2. Scheme Entry Points
//==================================================================================

pub fn compress(
    schema: &Schema,
    points_raw: &[u8],
    npoints: usize,
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    let key_bits = config.hierarchy_key_bits.min(64);
    let clusters = cluster_points(schema, points_raw, key_bits as u32)?;
    let columns: Vec<Vec<u64>> = schema
        .dimensions()
        .iter()
        .map(|d| column_words(schema, points_raw, d.position))
        .collect();

    let mut payload = Vec::new();
    payload.push(key_bits);
    leb128::encode_one(clusters.len() as u64, &mut payload)?;

    for cluster in &clusters {
        leb128::encode_one(cluster.len() as u64, &mut payload)?;
        for (dim, words) in schema.dimensions().iter().zip(&columns) {
            let cluster_words: Vec<u64> = cluster.iter().map(|&i| words[i]).collect();
            encode_cluster_dimension(dim, &cluster_words, &mut payload)?;
        }
    }

    log::debug!(
        "hierarchical: {} points in {} clusters ({} key bits), {} -> {} bytes",
        npoints,
        clusters.len(),
        key_bits,
        points_raw.len(),
        payload.len()
    );
    Ok(payload)
}

fn encode_cluster_dimension(dim: &Dimension, words: &[u64], out: &mut Vec<u8>) -> Result<()> {
    let width = dim.interpretation.bit_width();
    let (common, common_value) = sigbits::common_bits(words, width);
    let unique = width - common;
    let low_mask = low_mask(unique);

    out.push(common as u8);
    leb128::encode_one(shift_down(common_value, unique), out)?;

    let mut prev = match words.first() {
        Some(&w) => w & low_mask,
        None => 0,
    };
    leb128::encode_one(prev, out)?;
    for &w in words.iter().skip(1) {
        let low = w & low_mask;
        leb128::encode_one(zigzag::encode_val(low.wrapping_sub(prev) as i64), out)?;
        prev = low;
    }
    Ok(())
}

pub fn decompress(schema: &Schema, payload: &[u8], npoints: usize) -> Result<Vec<u8>> {
    let endian = schema.endian();
    let size = schema.size();
    let total = checked_buffer_len(npoints, size)?;
    let mut points_raw = try_alloc(total)?;
    points_raw.resize(total, 0);

    let mut reader = ByteReader::new(payload, endian);
    let key_bits = reader.read_u8()?;
    if key_bits > 64 {
        return Err(PatchError::CorruptPatch(format!(
            "Hierarchical key width {} exceeds 64 bits",
            key_bits
        )));
    }

    let nclusters = reader.read_varint()?;
    let mut next_point = 0usize;
    for _ in 0..nclusters {
        let count = reader.read_varint()?;
        let count = usize::try_from(count)
            .ok()
            .filter(|&c| c > 0 && c <= npoints - next_point)
            .ok_or_else(|| {
                PatchError::CorruptPatch(format!(
                    "Hierarchical cluster of {} points overflows patch of {}",
                    count, npoints
                ))
            })?;

        let cluster = &mut points_raw[next_point * size..(next_point + count) * size];
        for dim in schema.dimensions() {
            decode_cluster_dimension(dim, &mut reader, cluster, size, endian)?;
        }
        next_point += count;
    }

    if next_point != npoints {
        return Err(PatchError::CorruptPatch(format!(
            "Hierarchical payload holds {} points, header says {}",
            next_point, npoints
        )));
    }
    reader.expect_end("Hierarchical payload")?;
    Ok(points_raw)
}

fn decode_cluster_dimension(
    dim: &Dimension,
    reader: &mut ByteReader,
    cluster: &mut [u8],
    size: usize,
    endian: Endian,
) -> Result<()> {
    let width = dim.interpretation.bit_width();
    let common = reader.read_u8()? as u32;
    if common > width {
        return Err(PatchError::CorruptPatch(format!(
            "dimension '{}' claims {} common bits of {}",
            dim.name, common, width
        )));
    }
    let unique = width - common;
    let low_mask = low_mask(unique);
    let prefix = shift_up(reader.read_varint()?, unique);

    let mut low = reader.read_varint()?;
    for (i, point) in cluster.chunks_exact_mut(size).enumerate() {
        if i > 0 {
            let delta = zigzag::decode_val(reader.read_varint()?);
            low = low.wrapping_add(delta as u64);
        }
        if low & !low_mask != 0 {
            return Err(PatchError::CorruptPatch(format!(
                "dimension '{}' low value exceeds {} unique bits",
                dim.name, unique
            )));
        }
        dim.write_word(point, prefix | low, endian);
    }
    Ok(())
}

//==================================================================================
// 3. Bit Helpers
//==================================================================================

fn low_mask(bits: u32) -> u64 {
    match bits {
        0 => 0,
        64 => u64::MAX,
        b => (1u64 << b) - 1,
    }
}

fn shift_down(value: u64, bits: u32) -> u64 {
    value.checked_shr(bits).unwrap_or(0)
}

fn shift_up(value: u64, bits: u32) -> u64 {
    value.checked_shl(bits).unwrap_or(0)
}

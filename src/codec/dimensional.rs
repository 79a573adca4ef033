// In: src/codec/dimensional.rs

//! The Dimensional scheme: per-dimension columns, each compressed independently.
//!
//! The point-major buffer is transposed into one column of words per dimension.
//! Each column is stored as `[method u8][encoded length u32][encoded bytes]`,
//! where the method is picked by the planner at compress time and recorded
//! inline, so decoding is a plain lookup on the tag.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::column_words;
use super::dimstats::DimensionStats;
use super::planner;
use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::kernels::{deflate, rle, sigbits};
use crate::schema::{Dimension, Schema};
use crate::types::Endian;
use crate::utils::{checked_buffer_len, try_alloc, write_u32, ByteReader};

//==================================================================================
// 1. Column Methods
//==================================================================================

/// How one column is stored. The discriminant is the wire tag.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum ColumnMethod {
    None = 0,
    Rle = 1,
    Sigbits = 2,
    Deflate = 3,
}

impl ColumnMethod {
    /// Methods that may encode a column of `dim`. Word-level methods only apply
    /// to integer dimensions.
    pub fn candidates(dim: &Dimension) -> &'static [ColumnMethod] {
        if dim.interpretation.is_integer() {
            &[
                ColumnMethod::None,
                ColumnMethod::Rle,
                ColumnMethod::Sigbits,
                ColumnMethod::Deflate,
            ]
        } else {
            &[ColumnMethod::None, ColumnMethod::Deflate]
        }
    }
}

impl From<ColumnMethod> for u8 {
    fn from(method: ColumnMethod) -> u8 {
        method as u8
    }
}

impl TryFrom<u8> for ColumnMethod {
    type Error = PatchError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(ColumnMethod::None),
            1 => Ok(ColumnMethod::Rle),
            2 => Ok(ColumnMethod::Sigbits),
            3 => Ok(ColumnMethod::Deflate),
            other => Err(PatchError::CorruptPatch(format!(
                "unknown column method tag {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ColumnMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

//==================================================================================
// 2. Column Encode / Decode
//==================================================================================

/// A column ready for encoding: its words and their byte image.
pub(crate) struct Column<'a> {
    pub dim: &'a Dimension,
    pub endian: Endian,
    pub words: Vec<u64>,
    pub bytes: Vec<u8>,
}

impl<'a> Column<'a> {
    pub(crate) fn new(schema: &'a Schema, dim: &'a Dimension, points_raw: &[u8]) -> Self {
        let words = column_words(schema, points_raw, dim.position);
        let mut bytes = Vec::with_capacity(words.len() * dim.size);
        for &w in &words {
            schema.endian().write_word(&mut bytes, w, dim.size);
        }
        Self {
            dim,
            endian: schema.endian(),
            words,
            bytes,
        }
    }

    /// Encodes the column with `method`.
    pub(crate) fn encode(&self, method: ColumnMethod, config: &PatchConfig) -> Result<Vec<u8>> {
        match method {
            ColumnMethod::None => Ok(self.bytes.clone()),
            ColumnMethod::Rle => {
                let mut out = Vec::new();
                rle::encode(&self.words, self.dim.size, self.endian, &mut out)?;
                Ok(out)
            }
            ColumnMethod::Sigbits => {
                let mut out = Vec::new();
                sigbits::encode(&self.words, self.dim.size, self.endian, &mut out)?;
                Ok(out)
            }
            ColumnMethod::Deflate => deflate::encode(&self.bytes, config.effective_deflate_level()),
        }
    }
}

fn decode_column(
    method: ColumnMethod,
    encoded: &[u8],
    dim: &Dimension,
    endian: Endian,
    npoints: usize,
) -> Result<Vec<u64>> {
    let bytes_to_words = |bytes: &[u8]| -> Result<Vec<u64>> {
        if bytes.len() != checked_buffer_len(npoints, dim.size)? {
            return Err(PatchError::CorruptPatch(format!(
                "column '{}' holds {} bytes, expected {} values of {} bytes",
                dim.name,
                bytes.len(),
                npoints,
                dim.size
            )));
        }
        Ok(bytes
            .chunks_exact(dim.size)
            .map(|b| endian.read_word(b, dim.size))
            .collect())
    };

    match method {
        ColumnMethod::None => bytes_to_words(encoded),
        ColumnMethod::Rle => rle::decode(encoded, dim.size, endian, npoints),
        ColumnMethod::Sigbits => sigbits::decode(encoded, dim.size, endian, npoints),
        ColumnMethod::Deflate => {
            let inflated = deflate::decode(encoded, checked_buffer_len(npoints, dim.size)?)?;
            bytes_to_words(&inflated)
        }
    }
}

fn write_column(payload: &mut Vec<u8>, method: ColumnMethod, encoded: &[u8], endian: Endian) -> Result<()> {
    let len = u32::try_from(encoded.len()).map_err(|_| {
        PatchError::CorruptPatch(format!(
            "encoded column of {} bytes exceeds the u32 length field",
            encoded.len()
        ))
    })?;
    payload.push(method.into());
    write_u32(payload, len, endian);
    payload.extend_from_slice(encoded);
    Ok(())
}

//==================================================================================
// 3. Scheme Entry Points
//==================================================================================

pub fn compress(
    schema: &Schema,
    points_raw: &[u8],
    _npoints: usize,
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    for dim in schema.dimensions() {
        let column = Column::new(schema, dim, points_raw);
        let (method, encoded) = planner::plan_column(&column, config)?;
        write_column(&mut payload, method, &encoded, schema.endian())?;
    }
    Ok(payload)
}

/// Compresses with the methods recommended by accumulated statistics instead
/// of planning each column afresh. A recommendation that does not beat the raw
/// column falls back to `None`.
pub fn compress_with_stats(
    schema: &Schema,
    points_raw: &[u8],
    npoints: usize,
    stats: &DimensionStats,
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    if points_raw.len() != checked_buffer_len(npoints, schema.size())? {
        return Err(PatchError::CorruptPatch(format!(
            "point buffer of {} bytes does not hold {} points",
            points_raw.len(),
            npoints
        )));
    }
    if stats.ndims != schema.ndims() {
        return Err(PatchError::InvalidSchema(format!(
            "statistics track {} dimensions, schema has {}",
            stats.ndims,
            schema.ndims()
        )));
    }

    let mut payload = Vec::new();
    for dim in schema.dimensions() {
        let column = Column::new(schema, dim, points_raw);
        let recommended = stats
            .recommended(dim.position)
            .filter(|m| ColumnMethod::candidates(dim).contains(m))
            .unwrap_or(ColumnMethod::Deflate);
        let (method, encoded) = planner::encode_or_raw(&column, recommended, config)?;
        write_column(&mut payload, method, &encoded, schema.endian())?;
    }
    Ok(payload)
}

pub fn decompress(schema: &Schema, payload: &[u8], npoints: usize) -> Result<Vec<u8>> {
    let endian = schema.endian();
    let size = schema.size();
    let total = checked_buffer_len(npoints, size)?;

    let mut points_raw = try_alloc(total)?;
    points_raw.resize(total, 0);

    let mut reader = ByteReader::new(payload, endian);
    for dim in schema.dimensions() {
        let method = ColumnMethod::try_from(reader.read_u8()?)?;
        let len = reader.read_u32()? as usize;
        let encoded = reader.take(len)?;
        let words = decode_column(method, encoded, dim, endian, npoints)?;
        for (point, word) in points_raw.chunks_exact_mut(size).zip(words) {
            dim.write_word(point, word, endian);
        }
    }
    reader.expect_end("Dimensional payload")?;
    Ok(points_raw)
}

//==================================================================================
// 4. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompressionProfile;
    use crate::point::Point;
    use crate::types::Interpretation;

    fn schema(endian: Endian) -> Schema {
        Schema::new(
            1,
            0,
            endian,
            vec![
                Dimension::new("X", 0, Interpretation::Int32).with_scale(0.01),
                Dimension::new("Y", 1, Interpretation::Int32).with_scale(0.01),
                Dimension::new("Classification", 2, Interpretation::UInt8),
                Dimension::new("GpsTime", 3, Interpretation::Float64),
            ],
        )
        .unwrap()
    }

    fn points(schema: &Schema, n: usize) -> Vec<u8> {
        (0..n)
            .flat_map(|i| {
                Point::from_values(
                    schema,
                    &[
                        5000.0 + i as f64 * 0.01,
                        -20.0 + (i % 7) as f64,
                        (i / 100) as f64,
                        1.0e6 + i as f64 * 0.5,
                    ],
                )
                .unwrap()
                .into_raw()
            })
            .collect()
    }

    /// Method tag of each column, walking the payload framing.
    fn methods(schema: &Schema, payload: &[u8]) -> Vec<ColumnMethod> {
        let mut reader = ByteReader::new(payload, schema.endian());
        schema
            .dimensions()
            .iter()
            .map(|_| {
                let method = ColumnMethod::try_from(reader.read_u8().unwrap()).unwrap();
                let len = reader.read_u32().unwrap() as usize;
                reader.take(len).unwrap();
                method
            })
            .collect()
    }

    #[test]
    fn test_roundtrip_every_profile_and_endian() {
        for endian in [Endian::Little, Endian::Big] {
            let schema = schema(endian);
            let raw = points(&schema, 500);
            for profile in [
                CompressionProfile::Fast,
                CompressionProfile::Balanced,
                CompressionProfile::HighCompression,
            ] {
                let config = PatchConfig::with_profile(profile);
                let payload = compress(&schema, &raw, 500, &config).unwrap();
                assert!(payload.len() < raw.len());
                assert_eq!(decompress(&schema, &payload, 500).unwrap(), raw);
            }
        }
    }

    #[test]
    fn test_long_runs_use_rle() {
        let schema = schema(Endian::Little);
        // Classification holds three runs of 100.
        let raw = points(&schema, 300);
        let payload = compress(&schema, &raw, 300, &PatchConfig::default()).unwrap();
        let methods = methods(&schema, &payload);
        assert_eq!(methods[2], ColumnMethod::Rle);
        // Floats never get word-level methods.
        assert!(matches!(methods[3], ColumnMethod::None | ColumnMethod::Deflate));
    }

    #[test]
    fn test_single_point_prefers_raw() {
        let schema = schema(Endian::Little);
        let raw = points(&schema, 1);
        let payload = compress(&schema, &raw, 1, &PatchConfig::default()).unwrap();
        assert!(methods(&schema, &payload)
            .iter()
            .all(|m| *m == ColumnMethod::None));
        assert_eq!(decompress(&schema, &payload, 1).unwrap(), raw);
    }

    #[test]
    fn test_empty_patch_roundtrip() {
        let schema = schema(Endian::Big);
        let payload = compress(&schema, &[], 0, &PatchConfig::default()).unwrap();
        assert!(decompress(&schema, &payload, 0).unwrap().is_empty());
    }

    #[test]
    fn test_stats_guided_compression() {
        let schema = schema(Endian::Little);
        let raw = points(&schema, 400);
        let mut stats = DimensionStats::new(&schema);
        stats.update(&schema, &raw, 400).unwrap();

        let payload =
            compress_with_stats(&schema, &raw, 400, &stats, &PatchConfig::default()).unwrap();
        assert_eq!(methods(&schema, &payload)[2], ColumnMethod::Rle);
        assert_eq!(decompress(&schema, &payload, 400).unwrap(), raw);
    }

    #[test]
    fn test_corrupt_payloads() {
        let schema = schema(Endian::Little);
        let raw = points(&schema, 50);
        let payload = compress(&schema, &raw, 50, &PatchConfig::default()).unwrap();

        let mut bad_tag = payload.clone();
        bad_tag[0] = 9;
        assert!(matches!(
            decompress(&schema, &bad_tag, 50),
            Err(PatchError::CorruptPatch(_))
        ));

        let truncated = &payload[..payload.len() - 1];
        assert!(decompress(&schema, truncated, 50).is_err());

        let mut trailing = payload.clone();
        trailing.push(0);
        assert!(matches!(
            decompress(&schema, &trailing, 50),
            Err(PatchError::CorruptPatch(_))
        ));
    }
}

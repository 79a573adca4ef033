// In: src/patch/artifact.rs

//! The serialized form of a patch. This module is the single source of truth
//! for writing, reading and header-only peeking of patch bytes.
//!
//! Layout, every multi-byte field in the schema's declared byte order:
//!
//! ```text
//! [endian u8][pcid u32][compression u8][npoints u32]
//! [bounds min f64 x ndims][bounds max f64 x ndims]
//! [stats flag u8][stats min, max, avg f64 x ndims (flag = 1 only)]
//! [payload]
//! ```
//!
//! Empty bounds are written as `+inf` minima and `-inf` maxima.

use std::sync::Arc;

use super::{Bounds, Patch, PatchStats};
use crate::codec::Compression;
use crate::error::{PatchError, Result};
use crate::schema::{Schema, SchemaRegistry};
use crate::types::Endian;
use crate::utils::{write_f64, write_u32, ByteReader};

/// Metadata parsed from a patch header without touching the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchHeader {
    pub endian: Endian,
    pub pcid: u32,
    pub compression: Compression,
    pub npoints: u32,
    pub bounds: Bounds,
    pub stats: Option<PatchStats>,
    /// Size of everything before the payload.
    pub header_size: usize,
    pub payload_size: usize,
}

impl Patch {
    /// Serializes the patch in `schema`'s byte order.
    pub fn to_bytes(&self, schema: &Schema) -> Result<Vec<u8>> {
        schema.check_pcid(self.pcid)?;
        let endian = schema.endian();
        let ndims = schema.ndims();

        let stats_len = if self.stats.is_some() { 3 * ndims * 8 } else { 0 };
        let mut out = Vec::with_capacity(11 + 2 * ndims * 8 + stats_len + self.payload.len());
        out.push(endian.marker());
        write_u32(&mut out, self.pcid, endian);
        out.push(self.compression.tag());
        write_u32(&mut out, self.npoints, endian);

        match &self.bounds {
            Bounds::Empty => {
                (0..ndims).for_each(|_| write_f64(&mut out, f64::INFINITY, endian));
                (0..ndims).for_each(|_| write_f64(&mut out, f64::NEG_INFINITY, endian));
            }
            Bounds::Extent { min, max } => {
                check_len("bounds", min.len().max(max.len()), ndims)?;
                min.iter().chain(max).for_each(|&v| write_f64(&mut out, v, endian));
            }
        }

        match &self.stats {
            None => out.push(0),
            Some(stats) => {
                check_len("stats", stats.min.len(), ndims)?;
                check_len("stats", stats.max.len(), ndims)?;
                check_len("stats", stats.avg.len(), ndims)?;
                out.push(1);
                for &v in stats.min.iter().chain(&stats.max).chain(&stats.avg) {
                    write_f64(&mut out, v, endian);
                }
            }
        }

        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Parses serialized patch bytes, resolving the schema through `registry`.
    /// The payload is copied as-is and only decoded on demand.
    pub fn from_bytes(registry: &SchemaRegistry, bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_bytes_with_schema(registry, bytes)?.1)
    }

    /// Like [`Patch::from_bytes`], also returning the schema snapshot the
    /// header was parsed under. Callers that go on to decode the payload use
    /// this snapshot so a concurrent re-registration cannot split the two.
    pub fn from_bytes_with_schema(
        registry: &SchemaRegistry,
        bytes: &[u8],
    ) -> Result<(Arc<Schema>, Self)> {
        let (schema, header) = Self::peek_header_with_schema(registry, bytes)?;
        let patch = Patch {
            pcid: header.pcid,
            compression: header.compression,
            npoints: header.npoints,
            bounds: header.bounds,
            stats: header.stats,
            payload: bytes[header.header_size..].to_vec(),
        };
        Ok((schema, patch))
    }

    /// Parses only the header.
    pub fn peek_header(registry: &SchemaRegistry, bytes: &[u8]) -> Result<PatchHeader> {
        Ok(Self::peek_header_with_schema(registry, bytes)?.1)
    }

    pub fn peek_header_with_schema(
        registry: &SchemaRegistry,
        bytes: &[u8],
    ) -> Result<(Arc<Schema>, PatchHeader)> {
        let mut reader = ByteReader::new(bytes, Endian::Little);
        let found = Endian::from_marker(reader.read_u8()?)?;
        reader.set_endian(found);

        let pcid = reader.read_u32()?;
        let schema = registry.resolve(pcid)?;
        if schema.endian() != found {
            return Err(PatchError::EndiannessMismatch {
                declared: schema.endian(),
                found,
            });
        }

        let compression = Compression::try_from(reader.read_u8()?)?;
        let npoints = reader.read_u32()?;
        let ndims = schema.ndims();

        let min = reader.read_f64_vec(ndims)?;
        let max = reader.read_f64_vec(ndims)?;
        let bounds = if npoints == 0 {
            Bounds::Empty
        } else {
            Bounds::Extent { min, max }
        };

        let stats = match reader.read_u8()? {
            0 => None,
            1 if npoints > 0 => Some(PatchStats {
                min: reader.read_f64_vec(ndims)?,
                max: reader.read_f64_vec(ndims)?,
                avg: reader.read_f64_vec(ndims)?,
            }),
            flag => {
                return Err(PatchError::CorruptPatch(format!(
                    "invalid stats flag {} for a patch of {} points",
                    flag, npoints
                )))
            }
        };

        let header_size = reader.position();
        let header = PatchHeader {
            endian: found,
            pcid,
            compression,
            npoints,
            bounds,
            stats,
            header_size,
            payload_size: bytes.len() - header_size,
        };
        Ok((schema, header))
    }
}

fn check_len(what: &str, len: usize, ndims: usize) -> Result<()> {
    if len != ndims {
        return Err(PatchError::CorruptPatch(format!(
            "{} hold {} entries for {} dimensions",
            what, len, ndims
        )));
    }
    Ok(())
}

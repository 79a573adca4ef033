// In: src/point.rs

//! The point codec: a single point's raw bytes, encoded and decoded against a
//! schema.
//!
//! A `Point` is a plain value: its pcid plus exactly `schema.size()` bytes laid
//! out dimension by dimension in the schema's byte order. Decoded values are
//! `raw * scale + offset` for integer dimensions and the literal IEEE value for
//! float dimensions.

use std::collections::BTreeMap;

use crate::error::{PatchError, Result};
use crate::schema::{Schema, SchemaRegistry};
use crate::types::Endian;
use crate::utils::{write_u32, ByteReader};

/// One encoded point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    pcid: u32,
    raw: Vec<u8>,
}

impl Point {
    //------------------------------------------------------------------------------
    // Construction
    //------------------------------------------------------------------------------

    /// Encodes named values. Every schema dimension must be supplied exactly by
    /// name; a repeated name keeps its last value.
    pub fn encode<'a>(
        schema: &Schema,
        values: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<Self> {
        let mut by_position: Vec<Option<f64>> = vec![None; schema.ndims()];
        for (name, value) in values {
            let dim = schema.dimension_by_name(name)?;
            by_position[dim.position] = Some(value);
        }

        let mut raw = vec![0u8; schema.size()];
        for (dim, value) in schema.dimensions().iter().zip(by_position) {
            let value = value.ok_or_else(|| PatchError::MissingDimension(dim.name.clone()))?;
            dim.write_word(&mut raw, dim.value_to_word(value)?, schema.endian());
        }
        Ok(Self {
            pcid: schema.pcid(),
            raw,
        })
    }

    /// Encodes values given in schema position order.
    pub fn from_values(schema: &Schema, values: &[f64]) -> Result<Self> {
        if let Some(missing) = schema.dimensions().get(values.len()) {
            return Err(PatchError::MissingDimension(missing.name.clone()));
        }
        if values.len() > schema.ndims() {
            return Err(PatchError::UnknownDimension(format!(
                "position {}",
                schema.ndims()
            )));
        }

        let mut raw = vec![0u8; schema.size()];
        for (dim, &value) in schema.dimensions().iter().zip(values) {
            dim.write_word(&mut raw, dim.value_to_word(value)?, schema.endian());
        }
        Ok(Self {
            pcid: schema.pcid(),
            raw,
        })
    }

    /// Wraps an existing raw buffer.
    pub fn from_raw(schema: &Schema, raw: &[u8]) -> Result<Self> {
        if raw.len() != schema.size() {
            return Err(PatchError::CorruptPatch(format!(
                "point buffer of {} bytes does not match schema {} point size {}",
                raw.len(),
                schema.pcid(),
                schema.size()
            )));
        }
        Ok(Self {
            pcid: schema.pcid(),
            raw: raw.to_vec(),
        })
    }

    /// Trusted constructor for buffers sliced out of a decoded patch.
    pub(crate) fn from_parts(pcid: u32, raw: Vec<u8>) -> Self {
        Self { pcid, raw }
    }

    //------------------------------------------------------------------------------
    // Accessors
    //------------------------------------------------------------------------------

    pub fn pcid(&self) -> u32 {
        self.pcid
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.raw
    }

    /// Fails unless this point was encoded for `schema`.
    fn check_schema(&self, schema: &Schema) -> Result<()> {
        schema.check_pcid(self.pcid)?;
        if self.raw.len() != schema.size() {
            return Err(PatchError::CorruptPatch(format!(
                "point buffer of {} bytes does not match point size {}",
                self.raw.len(),
                schema.size()
            )));
        }
        Ok(())
    }

    //------------------------------------------------------------------------------
    // Decoding
    //------------------------------------------------------------------------------

    /// All values keyed by dimension name.
    pub fn decode(&self, schema: &Schema) -> Result<BTreeMap<String, f64>> {
        self.check_schema(schema)?;
        Ok(schema
            .dimensions()
            .iter()
            .map(|dim| {
                let word = dim.read_word(&self.raw, schema.endian());
                (dim.name.clone(), dim.word_to_value(word))
            })
            .collect())
    }

    /// All values in position order.
    pub fn values(&self, schema: &Schema) -> Result<Vec<f64>> {
        self.check_schema(schema)?;
        Ok(schema
            .dimensions()
            .iter()
            .map(|dim| dim.word_to_value(dim.read_word(&self.raw, schema.endian())))
            .collect())
    }

    pub fn value(&self, schema: &Schema, name: &str) -> Result<f64> {
        self.check_schema(schema)?;
        let dim = schema.dimension_by_name(name)?;
        Ok(dim.word_to_value(dim.read_word(&self.raw, schema.endian())))
    }

    pub fn value_at(&self, schema: &Schema, position: usize) -> Result<f64> {
        self.check_schema(schema)?;
        let dim = schema
            .dimension(position)
            .ok_or_else(|| PatchError::UnknownDimension(format!("position {}", position)))?;
        Ok(dim.word_to_value(dim.read_word(&self.raw, schema.endian())))
    }

    /// A copy of this point with one dimension re-encoded.
    pub fn with_value(&self, schema: &Schema, name: &str, value: f64) -> Result<Self> {
        self.check_schema(schema)?;
        let dim = schema.dimension_by_name(name)?;
        let word = dim.value_to_word(value)?;
        let mut raw = self.raw.clone();
        dim.write_word(&mut raw, word, schema.endian());
        Ok(Self {
            pcid: self.pcid,
            raw,
        })
    }

    //------------------------------------------------------------------------------
    // Serialization
    //------------------------------------------------------------------------------

    /// `[endian u8][pcid u32][raw]`, with the pcid in the schema's byte order.
    pub fn to_bytes(&self, schema: &Schema) -> Result<Vec<u8>> {
        self.check_schema(schema)?;
        let endian = schema.endian();
        let mut out = Vec::with_capacity(5 + self.raw.len());
        out.push(endian.marker());
        write_u32(&mut out, self.pcid, endian);
        out.extend_from_slice(&self.raw);
        Ok(out)
    }

    /// Parses a serialized point, resolving its schema through `registry`.
    pub fn from_bytes(registry: &SchemaRegistry, bytes: &[u8]) -> Result<Self> {
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
        Point::from_raw(&schema, reader.rest())
    }
}

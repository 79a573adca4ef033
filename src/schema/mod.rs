// In: src/schema/mod.rs

//! The schema model: the immutable description of a point's dimension layout.
//!
//! A `Schema` is validated once, at construction, and never mutated afterwards.
//! It is shared as `Arc<Schema>` snapshots through the [`SchemaRegistry`], so a
//! patch decoded against a snapshot keeps a consistent layout even if the pcid
//! is later re-registered.

use serde::Serialize;

use crate::error::{PatchError, Result};
use crate::types::Endian;

pub mod description;
pub mod dimension;
pub mod registry;

pub use description::{DimensionDescription, SchemaDescription};
pub use dimension::Dimension;
pub use registry::SchemaRegistry;

/// A validated, immutable point layout. Build it with [`Schema::new`] or
/// [`Schema::from_description`]; there is no unvalidated path.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Schema {
    pcid: u32,
    srid: i32,
    endian: Endian,
    dimensions: Vec<Dimension>,
    size: usize,
    x_position: Option<usize>,
    y_position: Option<usize>,
    z_position: Option<usize>,
}

impl Schema {
    /// Validates the dimension list and derives sizes, byte offsets and the
    /// spatial axes. Dimensions may be given in any order; they are stored by
    /// position.
    pub fn new(pcid: u32, srid: i32, endian: Endian, mut dimensions: Vec<Dimension>) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(PatchError::InvalidSchema(format!(
                "schema {} has no dimensions",
                pcid
            )));
        }

        dimensions.sort_by_key(|d| d.position);
        for (expected, dim) in dimensions.iter().enumerate() {
            if dim.position != expected {
                return Err(PatchError::InvalidSchema(format!(
                    "dimension positions must be unique and dense from 0; '{}' has position {}, expected {}",
                    dim.name, dim.position, expected
                )));
            }
            if dim.scale == 0.0 || !dim.scale.is_finite() {
                return Err(PatchError::InvalidSchema(format!(
                    "dimension '{}' has invalid scale {}",
                    dim.name, dim.scale
                )));
            }
            if !dim.offset.is_finite() {
                return Err(PatchError::InvalidSchema(format!(
                    "dimension '{}' has invalid offset {}",
                    dim.name, dim.offset
                )));
            }
        }

        {
            let mut names = hashbrown::HashSet::with_capacity(dimensions.len());
            for dim in &dimensions {
                if !names.insert(dim.name.as_str()) {
                    return Err(PatchError::InvalidSchema(format!(
                        "duplicate dimension name '{}'",
                        dim.name
                    )));
                }
            }
        }

        let mut byte_offset = 0;
        for dim in dimensions.iter_mut() {
            dim.size = dim.interpretation.size();
            dim.byte_offset = byte_offset;
            byte_offset += dim.size;
        }

        let find_axis = |axis: &str| {
            dimensions
                .iter()
                .find(|d| d.name.eq_ignore_ascii_case(axis))
                .map(|d| d.position)
        };
        let (x_position, y_position, z_position) = (find_axis("X"), find_axis("Y"), find_axis("Z"));

        Ok(Self {
            pcid,
            srid,
            endian,
            dimensions,
            size: byte_offset,
            x_position,
            y_position,
            z_position,
        })
    }

    /// Builds a schema from a parsed external definition.
    pub fn from_description(description: &SchemaDescription) -> Result<Self> {
        let dimensions = description
            .dimensions
            .iter()
            .enumerate()
            .map(|(index, d)| d.to_dimension(index))
            .collect();
        Self::new(description.pcid, description.srid, description.endian, dimensions)
    }

    pub fn pcid(&self) -> u32 {
        self.pcid
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Width of one point buffer in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn ndims(&self) -> usize {
        self.dimensions.len()
    }

    /// Dimensions in position (on-wire) order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, position: usize) -> Option<&Dimension> {
        self.dimensions.get(position)
    }

    /// Exact, case-sensitive lookup.
    pub fn dimension_by_name(&self, name: &str) -> Result<&Dimension> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| PatchError::UnknownDimension(name.to_string()))
    }

    pub fn x_position(&self) -> Option<usize> {
        self.x_position
    }

    pub fn y_position(&self) -> Option<usize> {
        self.y_position
    }

    pub fn z_position(&self) -> Option<usize> {
        self.z_position
    }

    /// True when raw points of `self` can be reinterpreted under `other`
    /// without re-encoding.
    pub fn is_binary_compatible(&self, other: &Schema) -> bool {
        self.endian == other.endian
            && self.ndims() == other.ndims()
            && self.dimensions.iter().zip(&other.dimensions).all(|(a, b)| {
                a.position == b.position
                    && a.interpretation == b.interpretation
                    && a.scale == b.scale
                    && a.offset == b.offset
            })
    }

    /// Fails with `SchemaMismatch` unless `pcid` matches this schema.
    pub(crate) fn check_pcid(&self, pcid: u32) -> Result<()> {
        if pcid != self.pcid {
            return Err(PatchError::SchemaMismatch {
                expected: self.pcid,
                found: pcid,
            });
        }
        Ok(())
    }
}

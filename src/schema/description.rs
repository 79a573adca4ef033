// In: src/schema/description.rs

//! The already-parsed external schema definition.
//!
//! Document parsing (XML or otherwise) belongs to the binding layer. The core
//! accepts this serde model, which the binding layer can hand over as JSON.

use serde::{Deserialize, Serialize};

use super::Dimension;
use crate::error::Result;
use crate::types::{Endian, Interpretation};

/// A point-cloud schema definition as supplied by the host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SchemaDescription {
    pub pcid: u32,
    #[serde(default)]
    pub srid: i32,
    #[serde(default)]
    pub endian: Endian,
    pub dimensions: Vec<DimensionDescription>,
}

/// One dimension record of a [`SchemaDescription`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DimensionDescription {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to the record's index in the list.
    #[serde(default)]
    pub position: Option<usize>,
    pub interpretation: Interpretation,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl SchemaDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl DimensionDescription {
    pub(crate) fn to_dimension(&self, index: usize) -> Dimension {
        let mut dim = Dimension::new(
            self.name.clone(),
            self.position.unwrap_or(index),
            self.interpretation,
        )
        .with_scale(self.scale)
        .with_offset(self.offset);
        dim.description = self.description.clone();
        dim
    }
}

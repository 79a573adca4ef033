//! This file is the root of the `pcpatch` Rust crate: a codec and algebra for
//! point-cloud patches.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library so the Rust compiler
//!     knows they exist.
//! 2.  Re-exporting the types most callers need, so `use pcpatch::{...}` covers
//!     the common path: register a schema, build a patch, run algebra on it,
//!     serialize it.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod algebra;
pub mod bridge;
pub mod codec;
pub mod config;
pub mod error;
pub mod kernels;
pub mod patch;
pub mod point;
pub mod schema;
pub mod types;

mod utils;

//==================================================================================
// 2. Re-exports
//==================================================================================
pub use algebra::Predicate;
pub use codec::Compression;
pub use config::{CompressionProfile, PatchConfig};
pub use error::{PatchError, Result};
pub use observability::enable_verbose_logging;
pub use patch::{Bounds, Patch, PatchStats, PatchSummary};
pub use point::Point;
pub use schema::{Dimension, Schema, SchemaDescription, SchemaRegistry};
pub use types::{Endian, Interpretation};

//! This module defines the core, strongly-typed data representations shared by
//! the schema model, the point codec and every compression scheme.
//!
//! It includes the canonical `Interpretation` enum (the storage type of one
//! dimension) and the `Endian` byte-order declaration carried by each schema.

pub mod endian;
pub mod interpretation;

// Re-export the main types for easier access.
pub use endian::Endian;
pub use interpretation::Interpretation;

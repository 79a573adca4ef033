// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the collaborator-facing surface of the pcpatch library. A binding
// layer (a database extension, an FFI shim) calls one function per operation with
// serialized patches and points, the schema registry and the configuration, and
// gets serialized results back. No state lives in the bridge itself.
//
// Data Flow:
//
//   1. [Stateless API (e.g. filter_patch)]  -> Receives `&[u8]`
//         |
//         `-> a. `Patch::from_bytes` parses the header and resolves the schema
//         |
//         `-> b. Calls the pure algebra (`algebra::filter`, `algebra::merge`, ...)
//         |
//         `-> c. `Patch::to_bytes` serializes the new patch
//
//   2. [Header-only queries (patch_bounds, patch_memory_size, analyze_patch)]
//         |
//         `-> `Patch::peek_header`; the payload is never decoded
//
// ====================================================================================
pub mod format;
pub mod stateless_api;

pub use format::PatchAnalysis;
pub use stateless_api::{
    analyze_patch, compress_patch, construct_patch, construct_point, filter_patch,
    intersect_patch, is_sorted_patch, patch_bounds, patch_memory_size, patch_summary,
    point_at_index, set_patch_pcid, sort_patch, uncompress_patch, union_patches,
};

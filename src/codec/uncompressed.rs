// In: src/codec/uncompressed.rs

//! The identity scheme: the payload is the point-major raw buffer.

use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::schema::Schema;
use crate::utils::{checked_buffer_len, try_alloc};

pub fn compress(
    _schema: &Schema,
    points_raw: &[u8],
    _npoints: usize,
    _config: &PatchConfig,
) -> Result<Vec<u8>> {
    Ok(points_raw.to_vec())
}

pub fn decompress(schema: &Schema, payload: &[u8], npoints: usize) -> Result<Vec<u8>> {
    let expected = checked_buffer_len(npoints, schema.size())?;
    if payload.len() != expected {
        return Err(PatchError::CorruptPatch(format!(
            "Uncompressed payload of {} bytes, expected {} points x {} bytes",
            payload.len(),
            npoints,
            schema.size()
        )));
    }
    let mut out = try_alloc(expected)?;
    out.extend_from_slice(payload);
    Ok(out)
}

// In: src/codec/external.rs

//! The ExternalLossless scheme.
//!
//! Stands in for an external lossless point-cloud transform. The codec treats it
//! as a black box over the point-major buffer; this crate ships a zstd-backed
//! implementation whose payload is the zstd kernel's output
//! (`[uncompressed length u64 LE][zstd frame]`).

use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::kernels::zstd;
use crate::schema::Schema;
use crate::utils::checked_buffer_len;

pub fn compress(
    _schema: &Schema,
    points_raw: &[u8],
    _npoints: usize,
    config: &PatchConfig,
) -> Result<Vec<u8>> {
    zstd::encode(points_raw, config.effective_zstd_level())
}

pub fn decompress(schema: &Schema, payload: &[u8], npoints: usize) -> Result<Vec<u8>> {
    let expected = checked_buffer_len(npoints, schema.size())?;

    // Check the length header before the kernel sizes its buffer from it.
    if expected > 0 {
        let header = payload.get(..8).ok_or_else(|| {
            PatchError::CorruptPatch("ExternalLossless payload lacks its length header".to_string())
        })?;
        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(header);
        let declared = u64::from_le_bytes(len_bytes);
        if declared != expected as u64 {
            return Err(PatchError::CorruptPatch(format!(
                "ExternalLossless payload declares {} bytes, expected {}",
                declared, expected
            )));
        }
    } else if !payload.is_empty() {
        return Err(PatchError::CorruptPatch(
            "ExternalLossless payload for an empty patch is not empty".to_string(),
        ));
    }

    zstd::decode(payload)
}

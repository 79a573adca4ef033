// In: src/patch/builder.rs

//! Assembles patches from points.
//!
//! Every entry point funnels into `build_from_raw`, which computes the bounding
//! box and (if configured) the statistics from the uncompressed buffer, then
//! hands the buffer to the chosen scheme. Points are never dropped.

use std::time::Instant;

use super::{bounds_of, stats_of, Patch};
use crate::codec::{self, Compression};
use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::point::Point;
use crate::schema::Schema;
use crate::utils::{checked_buffer_len, try_alloc};

/// Builds a patch from points that were all encoded for `schema`.
pub fn build(
    schema: &Schema,
    points: &[Point],
    compression: Compression,
    config: &PatchConfig,
) -> Result<Patch> {
    let mut points_raw = try_alloc(checked_buffer_len(points.len(), schema.size())?)?;
    for (i, point) in points.iter().enumerate() {
        schema.check_pcid(point.pcid())?;
        if point.raw().len() != schema.size() {
            return Err(PatchError::CorruptPatch(format!(
                "point {} holds {} bytes, schema {} points hold {}",
                i,
                point.raw().len(),
                schema.pcid(),
                schema.size()
            )));
        }
        points_raw.extend_from_slice(point.raw());
    }
    build_from_raw(schema, &points_raw, points.len(), compression, config)
}

/// Builds a patch from rows of values given in schema position order.
pub fn build_from_values<R: AsRef<[f64]>>(
    schema: &Schema,
    rows: &[R],
    compression: Compression,
    config: &PatchConfig,
) -> Result<Patch> {
    let mut points_raw = try_alloc(checked_buffer_len(rows.len(), schema.size())?)?;
    for row in rows {
        points_raw.extend(Point::from_values(schema, row.as_ref())?.into_raw());
    }
    build_from_raw(schema, &points_raw, rows.len(), compression, config)
}

/// Builds a patch from an already concatenated point-major buffer.
pub fn build_from_raw(
    schema: &Schema,
    points_raw: &[u8],
    npoints: usize,
    compression: Compression,
    config: &PatchConfig,
) -> Result<Patch> {
    let start = Instant::now();
    let npoints_u32 = u32::try_from(npoints).map_err(|_| {
        PatchError::CorruptPatch(format!("{} points exceed the u32 point count", npoints))
    })?;

    // The scheme checks the buffer length before anything else reads it.
    let payload = codec::compress(compression, schema, points_raw, npoints, config)?;
    let bounds = bounds_of(schema, points_raw, npoints);
    let stats = if config.compute_stats {
        stats_of(schema, points_raw, npoints)
    } else {
        None
    };

    log::debug!(
        "built {} patch of {} points for pcid {}: {} -> {} bytes in {:.2?}",
        compression,
        npoints,
        schema.pcid(),
        points_raw.len(),
        payload.len(),
        start.elapsed()
    );
    log_metric!(
        "event" = "build_patch",
        "compression" = &compression,
        "npoints" = &npoints,
        "raw_size" = &points_raw.len(),
        "payload_size" = &payload.len()
    );

    Ok(Patch {
        pcid: schema.pcid(),
        compression,
        npoints: npoints_u32,
        bounds,
        stats,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Bounds;
    use crate::schema::Dimension;
    use crate::types::{Endian, Interpretation};

    fn xyz(pcid: u32) -> Schema {
        Schema::new(
            pcid,
            0,
            Endian::Little,
            vec![
                Dimension::new("X", 0, Interpretation::Int32).with_scale(0.01),
                Dimension::new("Y", 1, Interpretation::Int32).with_scale(0.01),
                Dimension::new("Z", 2, Interpretation::Int32).with_scale(0.01),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_single_point_patch() {
        let schema = xyz(1);
        let point = Point::from_values(&schema, &[1.0, 2.0, 3.0]).unwrap();
        let patch = build(
            &schema,
            std::slice::from_ref(&point),
            Compression::Uncompressed,
            &PatchConfig::default(),
        )
        .unwrap();

        assert_eq!(patch.npoints(), 1);
        assert_eq!(patch.payload(), point.raw());
        assert_eq!(
            *patch.bounds(),
            Bounds::Extent {
                min: vec![1.0, 2.0, 3.0],
                max: vec![1.0, 2.0, 3.0],
            }
        );
        let stats = patch.stats().unwrap();
        assert_eq!(stats.avg, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rejects_foreign_points() {
        let schema = xyz(1);
        let other = xyz(2);
        let foreign = Point::from_values(&other, &[0.0, 0.0, 0.0]).unwrap();
        assert!(matches!(
            build(&schema, &[foreign], Compression::Dimensional, &PatchConfig::default()),
            Err(PatchError::SchemaMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_stats_can_be_disabled() {
        let schema = xyz(1);
        let config = PatchConfig {
            compute_stats: false,
            ..PatchConfig::default()
        };
        let patch = build_from_values(&schema, &[[1.0, 1.0, 1.0]], Compression::Dimensional, &config)
            .unwrap();
        assert!(patch.stats().is_none());
        assert!(!patch.bounds().is_empty());
    }

    #[test]
    fn test_empty_build() {
        let schema = xyz(1);
        for compression in Compression::ALL {
            let patch = build(&schema, &[], compression, &PatchConfig::default()).unwrap();
            assert!(patch.is_empty());
            assert!(patch.bounds().is_empty());
            assert!(patch.decode(&schema).unwrap().is_empty());
        }
    }

    #[test]
    fn test_raw_length_checked() {
        let schema = xyz(1);
        assert!(matches!(
            build_from_raw(&schema, &[0u8; 13], 1, Compression::Uncompressed, &PatchConfig::default()),
            Err(PatchError::CorruptPatch(_))
        ));
    }
}

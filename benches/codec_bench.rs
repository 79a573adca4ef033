// In pcpatch-core/benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pcpatch::codec::{self, Compression};
use pcpatch::{CompressionProfile, Dimension, Endian, Interpretation, PatchConfig, Point, Schema};

// --- Mock LIDAR Data ---

fn lidar_schema() -> Schema {
    Schema::new(
        1,
        4326,
        Endian::Little,
        vec![
            Dimension::new("X", 0, Interpretation::Int32).with_scale(0.01),
            Dimension::new("Y", 1, Interpretation::Int32).with_scale(0.01),
            Dimension::new("Z", 2, Interpretation::Int32).with_scale(0.01),
            Dimension::new("Intensity", 3, Interpretation::UInt16),
            Dimension::new("ReturnNumber", 4, Interpretation::UInt8),
            Dimension::new("Classification", 5, Interpretation::UInt8),
            Dimension::new("GpsTime", 6, Interpretation::Float64),
        ],
    )
    .unwrap()
}

/// A scan line sweeping across a small tile: coherent coordinates, few
/// distinct classes, monotonically increasing time.
fn generate_scan(schema: &Schema, npoints: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut raw = Vec::with_capacity(npoints * schema.size());
    for i in 0..npoints {
        let t = i as f64;
        let values = [
            500_000.0 + (t * 0.05) % 100.0 + rng.random_range(0.0..0.5),
            4_100_000.0 + (t / 2000.0).floor() * 0.5,
            120.0 + rng.random_range(-2.0..2.0),
            rng.random_range(0..4096) as f64,
            rng.random_range(1..4) as f64,
            [2.0, 2.0, 2.0, 5.0, 6.0][i % 5],
            300_000.0 + t * 1.0e-5,
        ];
        raw.extend(Point::from_values(schema, &values).unwrap().into_raw());
    }
    raw
}

// --- Benchmark Suite ---

const BENCH_POINTS: usize = 16_384;

fn bench_schemes(c: &mut Criterion) {
    let schema = lidar_schema();
    let raw = generate_scan(&schema, BENCH_POINTS);

    let mut group = c.benchmark_group("Patch Schemes");
    group.throughput(Throughput::Bytes(raw.len() as u64));

    for profile in [CompressionProfile::Fast, CompressionProfile::Balanced] {
        let config = PatchConfig::with_profile(profile);
        for compression in Compression::ALL {
            let payload = codec::compress(compression, &schema, &raw, BENCH_POINTS, &config).unwrap();

            group.bench_function(format!("Compress {} ({:?})", compression, profile), |b| {
                b.iter(|| {
                    black_box(codec::compress(
                        compression,
                        &schema,
                        black_box(&raw),
                        BENCH_POINTS,
                        &config,
                    ))
                })
            });
            group.bench_function(format!("Decompress {} ({:?})", compression, profile), |b| {
                b.iter(|| {
                    black_box(codec::decompress(
                        compression,
                        &schema,
                        black_box(&payload),
                        BENCH_POINTS,
                    ))
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_schemes);
criterion_main!(benches);

//! Scenario and property tests for the patch algebra.

use proptest::prelude::*;

use super::*;
use crate::codec::decode_counter;
use crate::error::PatchError;
use crate::patch::{build, build_from_values, Bounds};
use crate::point::Point;
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

fn xy_intensity() -> Schema {
    Schema::new(
        3,
        0,
        Endian::Big,
        vec![
            Dimension::new("X", 0, Interpretation::Int16),
            Dimension::new("Y", 1, Interpretation::Int16),
            Dimension::new("Intensity", 2, Interpretation::UInt16),
        ],
    )
    .unwrap()
}

fn patch_of(schema: &Schema, rows: &[[f64; 3]], compression: Compression) -> Patch {
    build_from_values(schema, rows, compression, &PatchConfig::default()).unwrap()
}

fn column(schema: &Schema, patch: &Patch, name: &str) -> Vec<f64> {
    patch
        .points(schema)
        .unwrap()
        .iter()
        .map(|p| p.value(schema, name).unwrap())
        .collect()
}

//==================================================================================
// 1. Concrete Scenarios
//==================================================================================

#[test]
fn test_scaled_xyz_point_and_single_point_patch() {
    let schema = xyz(1);
    let raw: Vec<u8> = [100i32, 200, 300]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let point = Point::from_raw(&schema, &raw).unwrap();
    assert_eq!(point.values(&schema).unwrap(), vec![1.0, 2.0, 3.0]);

    let config = PatchConfig::default();
    let patch = build(&schema, &[point.clone()], Compression::Uncompressed, &config).unwrap();
    assert_eq!(patch.npoints(), 1);
    assert_eq!(
        *patch.bounds(),
        Bounds::Extent {
            min: vec![1.0, 2.0, 3.0],
            max: vec![1.0, 2.0, 3.0],
        }
    );

    let dimensional = recompress(&schema, &patch, Compression::Dimensional, &config).unwrap();
    assert_eq!(dimensional.compression(), Compression::Dimensional);
    assert_eq!(dimensional.decode(&schema).unwrap(), raw);
    let back = recompress(&schema, &dimensional, Compression::Uncompressed, &config).unwrap();
    assert_eq!(back, patch);
}

#[test]
fn test_union_of_two_three_point_patches() {
    let schema = xyz(1);
    let a = patch_of(
        &schema,
        &[[0.0, 0.0, 0.0], [1.0, 5.0, 2.0], [2.0, 1.0, 1.0]],
        Compression::Dimensional,
    );
    let b = patch_of(
        &schema,
        &[[-1.0, 3.0, 9.0], [4.0, 4.0, 4.0], [0.5, 0.5, 0.5]],
        Compression::Uncompressed,
    );

    let u = union(&schema, &a, &b, None, &PatchConfig::default()).unwrap();
    assert_eq!(u.npoints(), 6);
    assert_eq!(
        *u.bounds(),
        Bounds::Extent {
            min: vec![-1.0, 0.0, 0.0],
            max: vec![4.0, 5.0, 9.0],
        }
    );
    assert_eq!(*u.bounds(), a.bounds().merge(b.bounds()));
    // A's points first, then B's.
    assert_eq!(column(&schema, &u, "X"), vec![0.0, 1.0, 2.0, -1.0, 4.0, 0.5]);
}

#[test]
fn test_union_rejects_mixed_schemas() {
    let one = xyz(1);
    let two = xyz(2);
    let a = patch_of(&one, &[[0.0, 0.0, 0.0]], Compression::Uncompressed);
    let b = patch_of(&two, &[[0.0, 0.0, 0.0]], Compression::Uncompressed);
    assert!(matches!(
        union(&one, &a, &b, None, &PatchConfig::default()),
        Err(PatchError::SchemaMismatch {
            expected: 1,
            found: 2
        })
    ));
}

#[test]
fn test_binary_ops_prefer_the_denser_scheme() {
    let schema = xyz(1);
    let sparse = patch_of(&schema, &[[1.0, 1.0, 1.0]; 3], Compression::Uncompressed);
    let dense = patch_of(&schema, &[[2.0, 2.0, 2.0]; 100], Compression::Dimensional);
    let empty = patch_of(&schema, &[], Compression::Hierarchical);
    let config = PatchConfig::default();

    let u = union(&schema, &sparse, &dense, None, &config).unwrap();
    assert_eq!(u.compression(), Compression::Dimensional);

    // The empty first input decides, and its Hierarchical scheme gives way
    // to an order-preserving one.
    let with_empty = union(&schema, &empty, &dense, None, &config).unwrap();
    assert_eq!(with_empty.compression(), Compression::Dimensional);
    assert_eq!(with_empty.npoints(), 100);

    let forced = union(&schema, &sparse, &dense, Some(Compression::ExternalLossless), &config)
        .unwrap();
    assert_eq!(forced.compression(), Compression::ExternalLossless);
}

#[test]
fn test_merge_keeps_list_order() {
    let schema = xyz(1);
    let config = PatchConfig::default();
    let patches: Vec<Patch> = (0..4)
        .map(|i| patch_of(&schema, &[[i as f64, 0.0, 0.0]], Compression::Dimensional))
        .collect();
    let merged = merge(&schema, &patches, None, &config).unwrap();
    assert_eq!(column(&schema, &merged, "X"), vec![0.0, 1.0, 2.0, 3.0]);

    assert!(matches!(
        merge(&schema, &[], Some(Compression::Dimensional), &config),
        Err(PatchError::EmptyPatchList)
    ));
}

//==================================================================================
// 2. Filter
//==================================================================================

#[test]
fn test_filter_predicates() {
    let schema = xyz(1);
    let config = PatchConfig::default();
    let rows: Vec<[f64; 3]> = (0..10).map(|i| [i as f64 * 0.25, 0.0, 0.0]).collect();
    let patch = patch_of(&schema, &rows, Compression::Dimensional);

    let less = filter(&schema, &patch, "X", Predicate::Less(1.0), None, &config).unwrap();
    assert_eq!(column(&schema, &less, "X"), vec![0.0, 0.25, 0.5, 0.75]);

    let between =
        filter(&schema, &patch, "X", Predicate::Between(0.5, 1.25), None, &config).unwrap();
    assert_eq!(column(&schema, &between, "X"), vec![0.5, 0.75, 1.0, 1.25]);

    let equal = filter(&schema, &patch, "X", Predicate::Equal(2.0), None, &config).unwrap();
    assert_eq!(equal.npoints(), 1);

    let none = filter(&schema, &patch, "X", Predicate::Greater(100.0), None, &config).unwrap();
    assert!(none.is_empty());
    assert!(none.bounds().is_empty());
    assert_eq!(none.compression(), Compression::Dimensional);

    assert!(matches!(
        filter(&schema, &patch, "W", Predicate::Equal(0.0), None, &config),
        Err(PatchError::UnknownDimension(_))
    ));
}

//==================================================================================
// 3. Sort
//==================================================================================

#[test]
fn test_sort_is_stable_and_idempotent() {
    let schema = xy_intensity();
    let config = PatchConfig::default();
    let rows: Vec<[f64; 3]> = [2.0, 1.0, 2.0, 1.0, 0.0]
        .iter()
        .enumerate()
        .map(|(i, &x)| [x, -(i as f64), i as f64])
        .collect();
    let patch = patch_of(&schema, &rows, Compression::Dimensional);
    assert!(!is_sorted(&schema, &patch, &["X"], false).unwrap());

    let sorted = sort(&schema, &patch, &["X"], None, &config).unwrap();
    assert_eq!(column(&schema, &sorted, "X"), vec![0.0, 1.0, 1.0, 2.0, 2.0]);
    // Ties keep their original relative order.
    assert_eq!(
        column(&schema, &sorted, "Intensity"),
        vec![4.0, 1.0, 3.0, 0.0, 2.0]
    );

    assert!(is_sorted(&schema, &sorted, &["X"], false).unwrap());
    assert!(!is_sorted(&schema, &sorted, &["X"], true).unwrap());
    assert!(!is_sorted(&schema, &sorted, &["X", "Y"], true).unwrap());
    assert_eq!(sort(&schema, &sorted, &["X"], None, &config).unwrap(), sorted);
}

#[test]
fn test_sort_lexicographic_and_signed() {
    let schema = xy_intensity();
    let config = PatchConfig::default();
    let rows = [
        [1.0, 5.0, 0.0],
        [-3.0, 2.0, 1.0],
        [1.0, -5.0, 2.0],
        [-3.0, -7.0, 3.0],
    ];
    let patch = patch_of(&schema, &rows, Compression::Uncompressed);
    let sorted = sort(&schema, &patch, &["X", "Y"], None, &config).unwrap();
    assert_eq!(column(&schema, &sorted, "Intensity"), vec![3.0, 1.0, 2.0, 0.0]);
    assert!(is_sorted(&schema, &sorted, &["X", "Y"], true).unwrap());
}

#[test]
fn test_sort_honours_negative_scale() {
    let schema = Schema::new(
        9,
        0,
        Endian::Little,
        vec![Dimension::new("Depth", 0, Interpretation::Int32).with_scale(-0.5)],
    )
    .unwrap();
    let rows: Vec<[f64; 1]> = vec![[3.0], [-1.0], [0.5]];
    let patch = build_from_values(&schema, &rows, Compression::Dimensional, &PatchConfig::default())
        .unwrap();
    let sorted = sort(&schema, &patch, &["Depth"], None, &PatchConfig::default()).unwrap();
    assert_eq!(column(&schema, &sorted, "Depth"), vec![-1.0, 0.5, 3.0]);
}

#[test]
fn test_signed_zeros_sort_as_equal() {
    let schema = Schema::new(
        10,
        0,
        Endian::Little,
        vec![
            Dimension::new("T", 0, Interpretation::Float64),
            Dimension::new("Tag", 1, Interpretation::UInt8),
        ],
    )
    .unwrap();
    let config = PatchConfig::default();
    let rows = [[0.0, 0.0], [-0.0, 1.0], [-1.0, 2.0]];
    let patch = build_from_values(&schema, &rows, Compression::Uncompressed, &config).unwrap();

    let sorted = sort(&schema, &patch, &["T"], None, &config).unwrap();
    // The zeros tie, so they keep their input order.
    assert_eq!(column(&schema, &sorted, "Tag"), vec![2.0, 0.0, 1.0]);
    assert!(is_sorted(&schema, &sorted, &["T"], false).unwrap());
    assert!(!is_sorted(&schema, &sorted, &["T"], true).unwrap());
}

//==================================================================================
// 4. Order-Dependent Results over Hierarchical Inputs
//==================================================================================

/// 50 points whose Y order differs from their spatial cluster order. X steps
/// are wide enough that every point lands in its own cluster.
fn scattered(schema: &Schema) -> Patch {
    let rows: Vec<[f64; 3]> = (0..50)
        .map(|i| {
            let x = ((i * 37) % 50) as f64 - 25.0;
            [x * 500_000.0, (50 - i) as f64, i as f64]
        })
        .collect();
    patch_of(schema, &rows, Compression::Hierarchical)
}

#[test]
fn test_sort_of_hierarchical_patch_stays_sorted() {
    let schema = xyz(1);
    let config = PatchConfig::default();
    let patch = scattered(&schema);

    let sorted = sort(&schema, &patch, &["Y"], None, &config).unwrap();
    assert_eq!(sorted.compression(), Compression::Dimensional);
    assert!(is_sorted(&schema, &sorted, &["Y"], true).unwrap());

    let forced = sort(&schema, &patch, &["Y"], Some(Compression::Hierarchical), &config).unwrap();
    assert!(is_sorted(&schema, &forced, &["Y"], true).unwrap());
}

#[test]
fn test_union_of_hierarchical_patches_keeps_a_then_b() {
    let schema = xyz(1);
    let config = PatchConfig::default();
    let a = patch_of(&schema, &[[5.0, 5.0, 0.0]], Compression::Hierarchical);
    let b = patch_of(&schema, &[[-5.0, -5.0, 0.0]], Compression::Hierarchical);

    let u = union(&schema, &a, &b, None, &config).unwrap();
    assert_eq!(u.compression(), Compression::Dimensional);
    assert_eq!(column(&schema, &u, "X"), vec![5.0, -5.0]);

    let merged = merge(&schema, &[b.clone(), a.clone()], Some(Compression::Hierarchical), &config)
        .unwrap();
    assert_eq!(column(&schema, &merged, "X"), vec![-5.0, 5.0]);
}

#[test]
fn test_range_of_sorted_points_under_hierarchical_target() {
    let schema = xyz(1);
    let config = PatchConfig::default();
    let sorted = sort(&schema, &scattered(&schema), &["Y"], None, &config).unwrap();

    let middle = range(&schema, &sorted, 10, 20, Some(Compression::Hierarchical), &config).unwrap();
    assert_eq!(middle.npoints(), 20);
    assert_eq!(middle.compression(), Compression::Dimensional);
    let ys = column(&schema, &middle, "Y");
    assert_eq!(ys.first(), Some(&11.0));
    assert!(is_sorted(&schema, &middle, &["Y"], true).unwrap());
}

//==================================================================================
// 5. Intersection
//==================================================================================

#[test]
fn test_disjoint_intersection_decodes_nothing() {
    let schema = xyz(1);
    let a = patch_of(&schema, &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]], Compression::Dimensional);
    let b = patch_of(&schema, &[[5.0, 5.0, 5.0], [6.0, 6.0, 6.0]], Compression::Dimensional);

    decode_counter::reset();
    let result = intersection(&schema, &a, &b, None, &PatchConfig::default()).unwrap();
    assert_eq!(decode_counter::get(), 0);
    assert_eq!(result.npoints(), 0);
    assert!(result.bounds().is_empty());
}

#[test]
fn test_intersection_is_an_envelope_filter_on_a() {
    let schema = xyz(1);
    let config = PatchConfig::default();
    let a = patch_of(
        &schema,
        &[[0.0, 0.0, 0.0], [2.0, 2.0, 2.0], [3.0, 3.0, 3.0], [9.0, 9.0, 9.0]],
        Compression::Dimensional,
    );
    let b = patch_of(&schema, &[[1.0, 1.0, 1.0], [3.0, 3.0, 3.0]], Compression::Uncompressed);

    decode_counter::reset();
    let ab = intersection(&schema, &a, &b, None, &config).unwrap();
    assert_eq!(decode_counter::get(), 1);
    assert_eq!(column(&schema, &ab, "X"), vec![2.0, 3.0]);

    // Asymmetric: B filtered by A's box keeps both of B's points.
    let ba = intersection(&schema, &b, &a, None, &config).unwrap();
    assert_eq!(column(&schema, &ba, "X"), vec![1.0, 3.0]);
}

//==================================================================================
// 6. Extraction & Schema Operations
//==================================================================================

#[test]
fn test_point_at_and_range() {
    let schema = xyz(1);
    let config = PatchConfig::default();
    let rows: Vec<[f64; 3]> = (0..5).map(|i| [i as f64, 0.0, 0.0]).collect();
    let patch = patch_of(&schema, &rows, Compression::Dimensional);

    let p = point_at(&schema, &patch, 3).unwrap();
    assert_eq!(p.value(&schema, "X").unwrap(), 3.0);
    assert!(matches!(
        point_at(&schema, &patch, 5),
        Err(PatchError::IndexOutOfRange {
            index: 5,
            npoints: 5
        })
    ));

    let tail = range(&schema, &patch, 3, 10, None, &config).unwrap();
    assert_eq!(column(&schema, &tail, "X"), vec![3.0, 4.0]);
    assert!(range(&schema, &patch, 5, 1, None, &config).unwrap().is_empty());
    assert!(range(&schema, &patch, 6, 1, None, &config).is_err());
}

#[test]
fn test_set_pcid_requires_binary_compatibility() {
    let one = xyz(1);
    let two = xyz(2);
    let other = Schema::new(
        3,
        0,
        Endian::Little,
        vec![
            Dimension::new("X", 0, Interpretation::Int32).with_scale(0.001),
            Dimension::new("Y", 1, Interpretation::Int32).with_scale(0.01),
            Dimension::new("Z", 2, Interpretation::Int32).with_scale(0.01),
        ],
    )
    .unwrap();
    let patch = patch_of(&one, &[[1.0, 2.0, 3.0]], Compression::Dimensional);

    decode_counter::reset();
    let retagged = set_pcid(&one, &patch, &two).unwrap();
    assert_eq!(decode_counter::get(), 0);
    assert_eq!(retagged.pcid(), 2);
    assert_eq!(retagged.payload(), patch.payload());
    assert_eq!(retagged.decode(&two).unwrap(), patch.decode(&one).unwrap());

    assert!(matches!(
        set_pcid(&one, &patch, &other),
        Err(PatchError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_transform_by_dimension_name() {
    let old = xyz(1);
    let new = Schema::new(
        7,
        0,
        Endian::Big,
        vec![
            Dimension::new("Classification", 0, Interpretation::UInt8),
            Dimension::new("X", 1, Interpretation::Float64),
            Dimension::new("Y", 2, Interpretation::Int32).with_scale(0.1),
        ],
    )
    .unwrap();
    let config = PatchConfig::default();
    let patch = patch_of(&old, &[[1.5, 2.5, 3.0], [-1.0, 0.0, 3.0]], Compression::Dimensional);

    let moved = transform(&old, &patch, &new, 7.0, None, &config).unwrap();
    assert_eq!(moved.pcid(), 7);
    assert_eq!(column(&new, &moved, "Classification"), vec![7.0, 7.0]);
    assert_eq!(column(&new, &moved, "X"), vec![1.5, -1.0]);
    assert_eq!(column(&new, &moved, "Y"), vec![2.5, 0.0]);

    let elsewhere = Schema::new(8, 3857, Endian::Big, vec![Dimension::new("X", 0, Interpretation::Float64)])
        .unwrap();
    assert!(matches!(
        transform(&old, &patch, &elsewhere, 0.0, None, &config),
        Err(PatchError::InvalidSchema(_))
    ));
}

#[test]
fn test_map_points_applies_transform() {
    let schema = xyz(1);
    let config = PatchConfig::default();
    let patch = patch_of(&schema, &[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]], Compression::Hierarchical);

    let shifted = map_points(
        &schema,
        &patch,
        |p| {
            let x = p.value(&schema, "X")?;
            p.with_value(&schema, "X", x + 10.0)
        },
        Some(Compression::Uncompressed),
        &config,
    )
    .unwrap();
    let mut xs = column(&schema, &shifted, "X");
    xs.sort_by(f64::total_cmp);
    assert_eq!(xs, vec![11.0, 12.0]);
    assert_eq!(shifted.bounds().min().unwrap()[0], 11.0);
}

#[test]
fn test_summary_and_memory_size() {
    let schema = xyz(1);
    let patch = patch_of(&schema, &[[1.0, 2.0, 3.0], [3.0, 2.0, 1.0]], Compression::Dimensional);
    assert_eq!(memory_size(&schema, &patch).unwrap(), 24);

    let s = summary(&schema, &patch).unwrap();
    assert_eq!(s.npoints, 2);
    assert_eq!(s.dimensions, vec!["X", "Y", "Z"]);
    assert_eq!(s.stats.as_ref().unwrap().avg, vec![2.0, 2.0, 2.0]);
    let json = s.to_json().unwrap();
    assert!(json.contains("\"compression\":\"dimensional\""));
    assert!(json.contains("\"npoints\":2"));
}

//==================================================================================
// 7. Properties
//==================================================================================

fn stat_schema() -> Schema {
    Schema::new(
        4,
        0,
        Endian::Little,
        vec![
            Dimension::new("X", 0, Interpretation::Int32),
            Dimension::new("Y", 1, Interpretation::Int64),
            Dimension::new("Z", 2, Interpretation::Float64),
        ],
    )
    .unwrap()
}

/// Fractional scales and nonzero offsets on the integer dimensions.
fn scaled_schema() -> Schema {
    Schema::new(
        5,
        0,
        Endian::Big,
        vec![
            Dimension::new("X", 0, Interpretation::Int32).with_scale(0.01).with_offset(1000.5),
            Dimension::new("Y", 1, Interpretation::Int32).with_scale(0.25).with_offset(-3.0),
            Dimension::new("Z", 2, Interpretation::Float64),
        ],
    )
    .unwrap()
}

fn scaled_rows(raws: &[i32]) -> Vec<[f64; 3]> {
    raws.iter()
        .map(|&r| [r as f64 * 0.01 + 1000.5, r as f64 * 0.25 - 3.0, r as f64])
        .collect()
}

fn arb_rows() -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec(
        (any::<i32>(), -(1i64 << 52)..(1i64 << 52), -1.0e12f64..1.0e12),
        1..64,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(x, y, z)| [x as f64, y as f64, z])
            .collect()
    })
}

proptest! {
    #[test]
    fn average_is_permutation_invariant(
        (rows, shuffled) in arb_rows().prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle()))
    ) {
        let schema = stat_schema();
        let config = PatchConfig::default();
        let a = build_from_values(&schema, &rows, Compression::Uncompressed, &config).unwrap();
        let b = build_from_values(&schema, &shuffled, Compression::Uncompressed, &config).unwrap();
        prop_assert_eq!(a.stats(), b.stats());
        prop_assert_eq!(a.bounds(), b.bounds());
    }

    #[test]
    fn bounds_contain_every_point_and_are_tight(rows in arb_rows()) {
        let schema = stat_schema();
        let patch = build_from_values(&schema, &rows, Compression::Dimensional, &PatchConfig::default()).unwrap();
        prop_assert!(!patch.bounds().is_empty());
        let min = patch.bounds().min().unwrap_or_default().to_vec();
        let max = patch.bounds().max().unwrap_or_default().to_vec();
        for point in patch.points(&schema).unwrap() {
            prop_assert!(patch.bounds().contains(&point.values(&schema).unwrap()));
        }
        for d in 0..3 {
            prop_assert!(rows.iter().any(|r| r[d] == min[d]));
            prop_assert!(rows.iter().any(|r| r[d] == max[d]));
        }
    }

    #[test]
    fn filter_is_correct_and_idempotent(
        xs in prop::collection::vec(-1000i16..1000, 0..80),
        threshold in -1000i16..1000,
    ) {
        let schema = xy_intensity();
        let config = PatchConfig::default();
        let rows: Vec<[f64; 3]> = xs.iter().enumerate().map(|(i, &x)| [x as f64, 0.0, i as f64]).collect();
        let patch = patch_of(&schema, &rows, Compression::Dimensional);
        let predicate = Predicate::Less(threshold as f64);

        let once = filter(&schema, &patch, "X", predicate, None, &config).unwrap();
        let expected: Vec<f64> = xs.iter().filter(|&&x| x < threshold).map(|&x| x as f64).collect();
        prop_assert_eq!(column(&schema, &once, "X"), expected);

        let twice = filter(&schema, &once, "X", predicate, None, &config).unwrap();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn scaled_bounds_are_exact_decoded_extremes(raws in prop::collection::vec(-1_000_000i32..1_000_000, 1..60)) {
        let schema = scaled_schema();
        let patch = patch_of(&schema, &scaled_rows(&raws), Compression::Dimensional);
        let min = patch.bounds().min().unwrap_or_default().to_vec();
        let max = patch.bounds().max().unwrap_or_default().to_vec();
        for (d, name) in ["X", "Y", "Z"].iter().enumerate() {
            let values = column(&schema, &patch, name);
            prop_assert!(values.iter().all(|v| min[d] <= *v && *v <= max[d]));
            prop_assert!(values.contains(&min[d]));
            prop_assert!(values.contains(&max[d]));
        }
    }

    #[test]
    fn scaled_filter_keeps_exactly_the_matching_decoded_values(
        raws in prop::collection::vec(-1_000_000i32..1_000_000, 1..60),
        pick in any::<prop::sample::Index>(),
        span in 0i32..5000,
    ) {
        let schema = scaled_schema();
        let config = PatchConfig::default();
        let patch = patch_of(&schema, &scaled_rows(&raws), Compression::Dimensional);
        let xs = column(&schema, &patch, "X");
        let v = xs[pick.index(xs.len())];
        let low = patch.bounds().min().unwrap_or_default()[0];

        for predicate in [
            Predicate::Equal(v),
            Predicate::Between(v, v + span as f64 * 0.01),
            Predicate::Between(low, v),
        ] {
            let once = filter(&schema, &patch, "X", predicate, None, &config).unwrap();
            let expected: Vec<f64> = xs.iter().copied().filter(|x| predicate.matches(*x)).collect();
            prop_assert!(expected.contains(&v));
            prop_assert_eq!(column(&schema, &once, "X"), expected);

            let twice = filter(&schema, &once, "X", predicate, None, &config).unwrap();
            prop_assert_eq!(twice, once);
        }
    }

    #[test]
    fn sort_then_is_sorted(xs in prop::collection::vec(any::<i16>(), 0..80)) {
        let schema = xy_intensity();
        let config = PatchConfig::default();
        let rows: Vec<[f64; 3]> = xs.iter().map(|&x| [x as f64, (x % 7) as f64, 1.0]).collect();
        let patch = patch_of(&schema, &rows, Compression::Uncompressed);

        let sorted = sort(&schema, &patch, &["X", "Y"], None, &config).unwrap();
        prop_assert!(is_sorted(&schema, &sorted, &["X", "Y"], false).unwrap());
        prop_assert_eq!(sorted.npoints(), patch.npoints());
        let resorted = sort(&schema, &sorted, &["X", "Y"], None, &config).unwrap();
        prop_assert_eq!(resorted, sorted);
    }
}

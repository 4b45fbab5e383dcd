//! Selectivity shaping against the in-memory table.

use optcal_core::config::CalibrationConfig;
use optcal_core::selectivity::{resolve_specs, Selectivity, SelectivitySpec};
use optcal_shape::{
    bounce_value, MemoryTable, Predicate, SelectivityShaper, ShapeError, ShapeOptions,
};

fn options(batch: u64) -> ShapeOptions {
    ShapeOptions {
        populate_batch_rows: batch,
        shape_batch_rows: batch,
        max_iterations: Some(100_000),
    }
}

fn ratios(values: &[f64]) -> Vec<Selectivity> {
    values.iter().map(|&v| Selectivity::Ratio(v)).collect()
}

#[test]
fn test_ten_percent_of_a_thousand_rows() {
    let specs = resolve_specs(1000, &ratios(&[0.1])).unwrap();
    assert_eq!(specs, vec![SelectivitySpec { rows: 1000, cardinality: 100 }]);

    let mut table = MemoryTable::new("t1K", 11);
    let mut shaper = SelectivityShaper::new(options(256), Some(3));
    shaper.shape(&mut table, 1000, &specs).unwrap();

    assert_eq!(table.count_value(100), 100);
    assert_eq!(table.len(), 1000);
}

#[test]
fn test_every_spec_matches_exactly_across_seeds() {
    let selectivities = ratios(&[0.02, 0.05, 0.075, 0.1, 0.15, 0.2]);
    for (rows, seed) in [(1_000u64, 1u64), (1_000, 2), (5_000, 3), (10_000, 4)] {
        let specs = resolve_specs(rows, &selectivities).unwrap();
        let mut table = MemoryTable::new("t", seed);
        let mut shaper = SelectivityShaper::new(options(700), Some(seed));
        let report = shaper.shape(&mut table, rows, &specs).unwrap();

        assert_eq!(table.len() as u64, rows, "rows={rows} seed={seed}");
        for spec in &specs {
            assert_eq!(
                table.count_value(spec.value()),
                spec.cardinality,
                "rows={rows} seed={seed} value={}",
                spec.value()
            );
        }
        assert_eq!(table.count_matching(&Predicate::NonPositive), 0);
        assert_eq!(report.verified.len(), specs.len());
    }
}

#[test]
fn test_reshaping_issues_no_updates() {
    let specs = resolve_specs(2_000, &ratios(&[0.05, 0.1])).unwrap();
    let mut table = MemoryTable::new("t2K", 5);
    let mut shaper = SelectivityShaper::new(options(128), Some(5));
    shaper.shape(&mut table, 2_000, &specs).unwrap();

    let before = table.mutations();
    let report = shaper.shape(&mut table, 2_000, &specs).unwrap();
    assert_eq!(table.mutations(), before);
    assert_eq!(report.updates, 0);
    assert!(!report.recreated);
}

#[test]
fn test_missized_table_is_rebuilt() {
    let mut table = MemoryTable::with_values("t1K", vec![100; 400], 9);
    let specs = resolve_specs(1000, &ratios(&[0.1])).unwrap();
    let mut shaper = SelectivityShaper::new(options(100), Some(9));
    let report = shaper.shape(&mut table, 1000, &specs).unwrap();
    assert!(report.recreated);
    assert_eq!(table.len(), 1000);
    assert_eq!(table.count_value(100), 100);
}

#[test]
fn test_overpopulated_value_is_trimmed_in_place() {
    // Right size, but every row already carries the target value.
    let mut table = MemoryTable::with_values("t1K", vec![100; 1000], 9);
    let specs = resolve_specs(1000, &ratios(&[0.1])).unwrap();
    let mut shaper = SelectivityShaper::new(options(64), Some(9));
    let report = shaper.shape(&mut table, 1000, &specs).unwrap();
    assert!(!report.recreated);
    assert_eq!(table.count_value(100), 100);
    assert_eq!(table.len(), 1000);
}

#[test]
fn test_oversubscribed_selectivities_fail_before_any_mutation() {
    let err = CalibrationConfig {
        row_counts: vec![100],
        selectivities: ratios(&[0.6, 0.5]),
        ..Default::default()
    }
    .validate()
    .unwrap_err();
    assert!(err.to_string().contains("110"), "{err}");

    let specs = vec![
        SelectivitySpec { rows: 100, cardinality: 60 },
        SelectivitySpec { rows: 100, cardinality: 50 },
    ];
    let mut table = MemoryTable::new("t100", 1);
    let mut shaper = SelectivityShaper::new(options(10), Some(1));
    let err = shaper.shape(&mut table, 100, &specs).unwrap_err();
    assert!(matches!(err, ShapeError::Config(_)));
    assert_eq!(table.mutations(), 0);
    assert!(!table.exists());
}

#[test]
fn test_stuck_table_reports_no_progress() {
    let mut table = MemoryTable::with_values("t1K", vec![100; 1000], 2);
    table.freeze();
    let specs = resolve_specs(1000, &ratios(&[0.1])).unwrap();
    let mut shaper = SelectivityShaper::new(options(64), Some(2));
    let err = shaper.shape(&mut table, 1000, &specs).unwrap_err();
    assert!(matches!(err, ShapeError::NoProgress { .. }), "{err}");
}

#[test]
fn test_iteration_cap_stops_shaping() {
    let mut table = MemoryTable::new("t1K", 4);
    let specs = resolve_specs(1000, &ratios(&[0.1])).unwrap();
    let mut shaper = SelectivityShaper::new(
        ShapeOptions {
            populate_batch_rows: 10,
            shape_batch_rows: 10,
            max_iterations: Some(3),
        },
        Some(4),
    );
    let err = shaper.shape(&mut table, 1000, &specs).unwrap_err();
    assert!(matches!(err, ShapeError::ConvergenceFailed { iterations: 3, .. }), "{err}");
}

#[test]
fn test_bounce_restores_the_distribution() {
    let specs = resolve_specs(1000, &ratios(&[0.1, 0.02])).unwrap();
    let mut table = MemoryTable::new("t1K", 8);
    let opts = options(30);
    SelectivityShaper::new(opts, Some(8))
        .shape(&mut table, 1000, &specs)
        .unwrap();

    let report = bounce_value(&mut table, 100, &opts).unwrap();
    assert_eq!(report.rows, 100);
    // 100 rows in batches of 30, each way.
    assert_eq!(report.updates, 8);
    assert_eq!(table.count_value(100), 100);
    assert_eq!(table.count_value(20), 20);
    assert_eq!(table.count_value(-100), 0);
}

// End-to-end checks for the density-weighted pipeline.

mod common;

use arealize::{disaggregate_by_density, DensityParams, RTreeEngine};
use common::{assert_close, control_layer, number, source_layer, square, target_layer};

fn params(exponent: f64) -> DensityParams {
    DensityParams { exponent, ..Default::default() }
}

#[test]
fn count_shares_split_the_source_total() {
    // One source zone (Spop=100) over two targets holding 3 and 1 controls.
    let targets = target_layer(&["T1", "T2"], vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)]);
    let sources = source_layer(&["S1"], &[100.0], vec![square(0.0, 0.0, 2.0)]);
    let controls = control_layer(&[(0.2, 0.2), (0.4, 0.4), (0.6, 0.6), (1.5, 0.5)]);

    let result =
        disaggregate_by_density(&targets, &sources, &controls, &RTreeEngine, &params(1.0)).unwrap();

    assert_close(number(&result.table, "T1", "ratio"), 0.75);
    assert_close(number(&result.table, "T2", "ratio"), 0.25);
    assert_close(number(&result.table, "T1", "weight"), 0.75);
    assert_close(number(&result.table, "T1", "sum_weight"), 1.0);
    assert_close(number(&result.table, "T1", "scale"), 100.0);
    assert_close(number(&result.table, "T1", "value"), 75.0);
    assert_close(number(&result.table, "T2", "value"), 25.0);
}

#[test]
fn values_conserve_each_source_total() {
    // Two source zones side by side, two targets each, uneven counts, q=2.
    let targets = target_layer(
        &["T1", "T2", "T3", "T4"],
        vec![
            square(0.0, 0.0, 1.0),
            square(1.0, 0.0, 1.0),
            square(2.0, 0.0, 1.0),
            square(3.0, 0.0, 1.0),
        ],
    );
    let sources = source_layer(
        &["S1", "S2"],
        &[120.0, 7.5],
        vec![square(0.0, 0.0, 2.0), square(2.0, 0.0, 2.0)],
    );
    let controls =
        control_layer(&[(0.5, 0.5), (0.6, 0.6), (1.5, 0.5), (2.5, 0.5), (3.5, 0.2), (3.4, 0.8)]);

    let result =
        disaggregate_by_density(&targets, &sources, &controls, &RTreeEngine, &params(2.0)).unwrap();

    let s1 = number(&result.table, "T1", "value") + number(&result.table, "T2", "value");
    let s2 = number(&result.table, "T3", "value") + number(&result.table, "T4", "value");
    assert_close(s1, 120.0);
    assert_close(s2, 7.5);
    for id in ["T1", "T2", "T3", "T4"] {
        assert!(number(&result.table, id, "value") >= 0.0);
    }
}

#[test]
fn source_without_controls_falls_back_to_uniform() {
    let targets = target_layer(&["T1", "T2"], vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)]);
    let sources = source_layer(&["S1"], &[30.0], vec![square(0.0, 0.0, 2.0)]);
    let controls = control_layer(&[(50.0, 50.0)]); // outside every target

    let result =
        disaggregate_by_density(&targets, &sources, &controls, &RTreeEngine, &params(1.0)).unwrap();

    assert!(result.aggregates[0].uniform_fallback);
    assert_close(number(&result.table, "T1", "value"), 15.0);
    assert_close(number(&result.table, "T2", "value"), 15.0);
}

#[test]
fn more_controls_never_means_less_value() {
    let targets = target_layer(&["T1", "T2"], vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)]);
    let sources = source_layer(&["S1"], &[10.0], vec![square(0.0, 0.0, 2.0)]);
    // T1 holds 5 controls, T2 holds 2.
    let controls = control_layer(&[
        (0.1, 0.1),
        (0.2, 0.2),
        (0.3, 0.3),
        (0.4, 0.4),
        (0.5, 0.5),
        (1.2, 0.2),
        (1.8, 0.8),
    ]);

    let result =
        disaggregate_by_density(&targets, &sources, &controls, &RTreeEngine, &params(3.0)).unwrap();

    assert!(number(&result.table, "T1", "value") >= number(&result.table, "T2", "value"));
}

#[test]
fn reruns_produce_identical_values() {
    let targets = target_layer(&["T1", "T2"], vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)]);
    let sources = source_layer(&["S1"], &[42.0], vec![square(0.0, 0.0, 2.0)]);
    let controls = control_layer(&[(0.3, 0.3), (1.5, 0.5), (1.6, 0.4)]);

    let first =
        disaggregate_by_density(&targets, &sources, &controls, &RTreeEngine, &params(1.7)).unwrap();
    let second =
        disaggregate_by_density(&targets, &sources, &controls, &RTreeEngine, &params(1.7)).unwrap();

    assert_eq!(first.records, second.records);
}

#[test]
fn negative_population_is_rejected() {
    let targets = target_layer(&["T1"], vec![square(0.0, 0.0, 1.0)]);
    let sources = source_layer(&["S1"], &[-1.0], vec![square(0.0, 0.0, 1.0)]);
    let controls = control_layer(&[(0.5, 0.5)]);

    let err = disaggregate_by_density(&targets, &sources, &controls, &RTreeEngine, &params(1.0))
        .unwrap_err();
    assert!(err.to_string().contains("non-negative"), "{err}");
}

#[test]
fn non_positive_exponent_is_rejected() {
    let targets = target_layer(&["T1"], vec![square(0.0, 0.0, 1.0)]);
    let sources = source_layer(&["S1"], &[1.0], vec![square(0.0, 0.0, 1.0)]);
    let controls = control_layer(&[(0.5, 0.5)]);

    assert!(
        disaggregate_by_density(&targets, &sources, &controls, &RTreeEngine, &params(0.0)).is_err()
    );
}

#[test]
fn orphan_target_zone_aborts_the_run() {
    let targets = target_layer(&["T1", "T2"], vec![square(0.0, 0.0, 1.0), square(10.0, 0.0, 1.0)]);
    let sources = source_layer(&["S1"], &[5.0], vec![square(0.0, 0.0, 2.0)]);
    let controls = control_layer(&[(0.5, 0.5)]);

    let err = disaggregate_by_density(&targets, &sources, &controls, &RTreeEngine, &params(1.0))
        .unwrap_err();
    assert!(err.to_string().contains("T2"), "{err}");
}

use proptest::prelude::*;

use vmc_stats::binning::{Binning, MIN_BINS};

#[test]
fn zero_levels_are_rejected() {
    let err = Binning::new(0).unwrap_err();
    assert_eq!(err.info().code, "no-levels");
}

#[test]
fn level_bookkeeping_follows_the_cascade() {
    let mut binning = Binning::new(4).unwrap();
    for value in [1.0, 2.0, 3.0, 4.0] {
        binning.push(value);
    }

    // Level 0 completed the pairs (1,2) -> 1.5 and (3,4) -> 3.5; level 1
    // completed their average 2.5; nothing reached level 2.
    assert_eq!(binning.n(), 4);
    assert_eq!(binning.mean(), 2.5);
    assert_eq!(binning.bins_at_level(0), 2);
    assert_eq!(binning.bins_at_level(1), 1);
    assert_eq!(binning.bins_at_level(2), 0);
    let level0 = binning.variance_at_level(0).unwrap();
    assert!((level0 - 1.0).abs() < 1e-12);
    assert_eq!(binning.variance_at_level(1), Some(0.0));
    assert_eq!(binning.variance_at_level(2), None);
}

#[test]
fn cascade_is_dropped_past_the_top_level() {
    // A single level keeps pairing raw samples but has nowhere to forward
    // completed bins; the engine must stay bounded and consistent.
    let mut binning = Binning::new(1).unwrap();
    for i in 0..1000 {
        binning.push(i as f64);
    }
    assert_eq!(binning.n(), 1000);
    assert_eq!(binning.bins_at_level(0), 500);
    assert_eq!(binning.bins_at_level(1), 0);
}

#[test]
fn error_is_unavailable_until_enough_bins() {
    let mut binning = Binning::new(8).unwrap();
    // Level 0 completes one bin per two pushes; MIN_BINS bins need twice
    // that many samples.
    for i in 0..(2 * MIN_BINS - 1) {
        binning.push(i as f64);
        assert_eq!(binning.error_of_mean(), None);
        assert_eq!(binning.tau_corr(), None);
    }
    binning.push(0.0);
    assert!(binning.error_of_mean().is_some());
    assert!(binning.tau_corr().is_some());
}

#[test]
fn constant_stream_has_exact_mean_and_zero_error() {
    let mut binning = Binning::new(8).unwrap();
    for pushes in 1..200u64 {
        binning.push(5.0);
        assert_eq!(binning.n(), pushes);
        assert_eq!(binning.mean(), 5.0);
        match binning.error_of_mean() {
            // Never a spurious nonzero error for constant data.
            Some(sigma) => assert_eq!(sigma, 0.0),
            None => assert!(pushes < 2 * MIN_BINS),
        }
        if let Some(tau) = binning.tau_corr() {
            assert_eq!(tau, 0.0);
        }
    }
}

#[test]
fn stats_are_idempotent() {
    let mut binning = Binning::new(8).unwrap();
    for i in 0..500 {
        binning.push((i % 7) as f64);
    }
    let first = binning.stats();
    let second = binning.stats();
    assert_eq!(first, second);
}

#[test]
fn reset_discards_all_history() {
    let mut binning = Binning::new(8).unwrap();
    for i in 0..500 {
        binning.push(i as f64);
    }
    binning.reset();
    assert_eq!(binning.n(), 0);
    assert_eq!(binning.mean(), 0.0);
    assert_eq!(binning.error_of_mean(), None);
    assert_eq!(binning.tau_corr(), None);
    assert_eq!(binning.bins_at_level(0), 0);

    // The engine keeps working after a reset.
    binning.push(3.0);
    assert_eq!(binning.n(), 1);
    assert_eq!(binning.mean(), 3.0);
}

proptest! {
    #[test]
    fn sample_count_always_matches_pushes(values in prop::collection::vec(-1e6f64..1e6, 0..256)) {
        let mut binning = Binning::new(6).unwrap();
        for &value in &values {
            binning.push(value);
        }
        prop_assert_eq!(binning.n(), values.len() as u64);
        binning.reset();
        prop_assert_eq!(binning.n(), 0);
    }

    #[test]
    fn mean_matches_direct_average(values in prop::collection::vec(-1e3f64..1e3, 1..256)) {
        let mut binning = Binning::new(6).unwrap();
        for &value in &values {
            binning.push(value);
        }
        let direct = values.iter().sum::<f64>() / values.len() as f64;
        prop_assert!((binning.mean() - direct).abs() < 1e-9);
    }
}

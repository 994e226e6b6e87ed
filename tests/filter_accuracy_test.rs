//! Tests for cursor smoothing output against the closed-form Kalman behaviour

use gesture_gallery::filters::kalman::{KalmanParams, ScalarKalman};
use gesture_gallery::filters::create_filter;

/// Test that the default filter reaches a step target without overshoot
#[test]
fn test_step_response_converges_monotonically() {
    let mut filter = create_filter("kalman").unwrap();
    let target = (320.0, 240.0);

    let mut previous = (0.0, 0.0);
    for _ in 0..20 {
        let (x, y) = filter.apply(target.0, target.1);
        assert!(x >= previous.0 && x <= target.0, "x overshot: {x}");
        assert!(y >= previous.1 && y <= target.1, "y overshot: {y}");
        previous = (x, y);
    }

    assert!((previous.0 - target.0).abs() < 1e-6);
    assert!((previous.1 - target.1).abs() < 1e-6);
}

/// Test the first update against hand-computed values
#[test]
fn test_first_update_matches_closed_form() {
    let mut kf = ScalarKalman::default();
    // P = 1 + 0.1, K = 1.1 / 1.11
    let k = 1.1 / 1.11;
    let out = kf.filter(100.0);
    assert!((out - 100.0 * k).abs() < 1e-9);
    assert!((kf.covariance() - (1.0 - k) * 1.1).abs() < 1e-12);
}

/// Test that the gain settles at the Riccati fixed point
#[test]
fn test_gain_reaches_steady_state() {
    let params = KalmanParams::default();
    let mut kf = ScalarKalman::new(params);
    for i in 0..50 {
        kf.filter(f64::from(i));
    }
    let expected = params.steady_state_gain();
    assert!((kf.gain() - expected).abs() < 1e-9, "gain {} vs {expected}", kf.gain());
    assert!(expected > 0.9 && expected < 0.93);
}

/// A single outlier moves the estimate by at most gain times the jump
#[test]
fn test_outlier_effect_is_bounded() {
    let mut kf = ScalarKalman::default();
    for _ in 0..50 {
        kf.filter(200.0);
    }
    let before = kf.estimate();
    let gain_before = {
        // Gain applied to the next sample
        let p = kf.covariance() + kf.params().process_noise;
        p / (p + kf.params().measurement_noise)
    };

    let after = kf.filter(600.0);
    assert!((after - before - gain_before * 400.0).abs() < 1e-9);
    assert!(after < 600.0);

    // One clean sample brings it most of the way back
    let recovered = kf.filter(200.0);
    assert!((recovered - 200.0).abs() < 0.1 * 400.0);
}

/// Test that noise on a constant signal is attenuated
#[test]
fn test_noise_variance_reduced() {
    use rand::{Rng, SeedableRng};

    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let params = KalmanParams {
        measurement_noise: 25.0,
        process_noise: 0.5,
        ..KalmanParams::default()
    };
    let mut kf = ScalarKalman::new(params);
    for _ in 0..50 {
        kf.filter(300.0 + rng.gen_range(-5.0..5.0));
    }

    let mut raw_var = 0.0;
    let mut filtered_var = 0.0;
    let n = 500;
    for _ in 0..n {
        let z = 300.0 + rng.gen_range(-5.0..5.0);
        let x = kf.filter(z);
        raw_var += (z - 300.0) * (z - 300.0);
        filtered_var += (x - 300.0) * (x - 300.0);
    }
    assert!(filtered_var < raw_var / 2.0, "{filtered_var} vs {raw_var}");
}

/// Test reset restores the initial state
#[test]
fn test_reset_between_sessions() {
    let mut filter = create_filter("kalman").unwrap();
    let first = filter.apply(50.0, 80.0);
    for _ in 0..10 {
        filter.apply(500.0, 400.0);
    }
    filter.reset();
    assert_eq!(filter.apply(50.0, 80.0), first);
}

/// Test that the passthrough filter leaves values untouched
#[test]
fn test_no_filter_passthrough() {
    let mut filter = create_filter("none").unwrap();
    for &(x, y) in &[(1.23, 4.56), (-10.0, 20.0), (0.0, 0.0), (639.0, 479.0)] {
        assert_eq!(filter.apply(x, y), (x, y));
    }
}

#[test]
fn test_unknown_filter_rejected() {
    assert!(create_filter("median:5").is_err());
    assert!(create_filter("").is_err());
}

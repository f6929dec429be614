use phylonco_rs::io::params::GompertzConfig;
use phylonco_rs::parameter::{Bounds, RealParameter};
use phylonco_rs::population::gompertz::MIN_POP_SIZE;
use phylonco_rs::quadrature::{DegradeReason, Integral, IterativeLegendreGauss};
use phylonco_rs::report::{TraceLog, trajectory};
use phylonco_rs::{GompertzGrowth, PopulationFunction};

fn approx_eq(a: f64, b: f64, eps: f64) {
    assert!(
        (a - b).abs() <= eps,
        "expected {a} ~= {b} within eps={eps}, got diff={}",
        (a - b).abs()
    );
}

/// Composite Simpson reference for the intensity integral.
fn simpson_intensity(model: &GompertzGrowth, t: f64, n: usize) -> f64 {
    let h = t / n as f64;
    let f = |s: f64| 1.0 / model.population_size(s).max(MIN_POP_SIZE);
    let mut sum = f(0.0) + f(t);
    for k in 1..n {
        let w = if k % 2 == 1 { 4.0 } else { 2.0 };
        sum += w * f(k as f64 * h);
    }
    sum * h / 3.0
}

#[test]
fn size_starts_at_n0_and_approaches_carrying_capacity() {
    let model = GompertzGrowth::from_values(0.1, 0.5, 100.0);
    approx_eq(model.n_infinity(), 1000.0, 1e-9);
    assert_eq!(model.population_size(0.0), 100.0);

    // time runs backwards, so the population grows as t decreases
    let mut prev = model.population_size(0.0);
    for k in 1..=40 {
        let size = model.population_size(-0.5 * k as f64);
        assert!(size > prev, "size must increase going forward in time");
        assert!(size < 1000.0);
        prev = size;
    }
    approx_eq(prev, 1000.0, 0.2);
    assert!(model.population_size(1.0) < 100.0);
}

#[test]
fn size_at_zero_is_exactly_n0_for_any_parameters() {
    for (f0, b, n0) in [
        (0.1, 0.5, 100.0),
        (0.9, 3.0, 12.5),
        (0.01, 0.01, 1e6),
        (1.0, 0.0, 7.0),
        (0.0, 0.5, 100.0),
        (0.5, 1.0, 0.0),
    ] {
        let model = GompertzGrowth::from_values(f0, b, n0);
        assert_eq!(model.population_size(0.0), n0);
    }
}

#[test]
fn intensity_is_zero_at_zero_and_non_decreasing() {
    for (f0, b, n0) in [(0.1, 0.5, 100.0), (0.5, 1.0, 50.0), (0.2, 0.1, 1000.0)] {
        let model = GompertzGrowth::from_values(f0, b, n0);
        assert_eq!(model.intensity(0.0), 0.0);
        let mut prev = 0.0;
        for k in 1..=12 {
            let t = 0.25 * k as f64;
            let integral = model.intensity_detailed(t);
            assert!(integral.is_converged(), "intensity({t}) should converge");
            assert!(integral.value() >= prev);
            prev = integral.value();
        }
    }
}

#[test]
fn constant_population_has_linear_intensity() {
    // f0 = 1 means N_inf = N0, so N(t) = N0 everywhere
    let model = GompertzGrowth::from_values(1.0, 0.5, 100.0);
    approx_eq(model.intensity(2.0), 0.02, 1e-12);
    approx_eq(model.integral(0.5, 2.0), 0.015, 1e-12);
}

#[test]
fn intensity_matches_simpson_reference() {
    let model = GompertzGrowth::from_values(0.1, 0.5, 100.0);
    let t = 2.0;
    let reference = simpson_intensity(&model, t, 20_000);
    let value = model.intensity(t);
    approx_eq(value / reference, 1.0, 1e-7);
}

#[test]
fn exhausted_budget_returns_finite_fallback() {
    let model = GompertzGrowth::from_values(0.1, 0.5, 100.0)
        .with_integrator(IterativeLegendreGauss::default().with_max_evaluations(7));
    let integral = model.intensity_detailed(3.0);
    match integral {
        Integral::Degraded {
            best,
            evaluations,
            reason,
        } => {
            assert!(best.is_finite() && best > 0.0);
            assert_eq!(evaluations, 5);
            assert_eq!(reason, DegradeReason::EvaluationBudget);
        }
        other => panic!("expected degraded result, got {other:?}"),
    }
    assert_eq!(model.intensity(3.0), integral.value());

    let starved = GompertzGrowth::from_values(0.1, 0.5, 100.0)
        .with_integrator(IterativeLegendreGauss::default().with_max_evaluations(3));
    assert_eq!(starved.intensity(3.0), 0.0);
}

#[test]
fn negative_time_integrates_backwards() {
    let model = GompertzGrowth::from_values(0.1, 0.5, 100.0);
    let back = model.intensity(-1.0);
    assert!(back < 0.0);
    approx_eq(model.integral(-1.0, 0.0), -back, 1e-15);
}

#[test]
fn inverse_intensity_is_not_available() {
    let model = GompertzGrowth::from_values(0.1, 0.5, 100.0);
    assert_eq!(model.inverse_intensity(0.3), 0.0);
}

#[test]
fn parameter_bounds_are_clamped_at_construction() {
    let mut f0 = RealParameter::new("f0", 0.2);
    f0.restrict_bounds(-5.0, 1.0);
    let mut n0 = RealParameter::new("N0", 10.0);
    n0.restrict_bounds(-1.0, f64::INFINITY);
    let model = GompertzGrowth::new(f0, RealParameter::new("b", 0.3), n0);

    assert_eq!(model.f0_parameter().bounds(), Bounds { lo: 0.0, hi: 1.0 });
    assert_eq!(model.b_parameter().bounds().lo, 0.0);
    assert_eq!(model.n0_parameter().bounds().lo, 0.0);
}

#[test]
fn up_down_proposal_pairs_growth_with_tree_height() {
    let model = GompertzGrowth::from_values(0.1, 0.5, 100.0).with_id("gompertz");
    let op = model.up_down_proposal("tree");
    assert_eq!(op.id, "gompertzUptreeDownOperator");
    assert_eq!(op.up, vec!["f0".to_string(), "b".to_string()]);
    assert_eq!(op.down, vec!["tree".to_string()]);
    assert_eq!(op.scale_factor, 0.75);
    assert_eq!(op.weight, 3.0);
    assert_eq!(model.parameter_ids(), vec!["N0".to_string()]);
}

#[test]
fn trace_log_hooks_write_nothing() {
    let model = GompertzGrowth::from_values(0.1, 0.5, 100.0);
    let mut out = Vec::new();
    model.init(&mut out).expect("init failed");
    model.log(1, &mut out).expect("log failed");
    model.close(&mut out).expect("close failed");
    assert!(out.is_empty());
}

#[test]
fn trajectory_reports_degraded_points() {
    let model = GompertzGrowth::from_values(0.1, 0.5, 100.0)
        .with_integrator(IterativeLegendreGauss::default().with_max_evaluations(7));
    let points = trajectory(&model, 2.0, 3);
    assert_eq!(points.len(), 3);

    assert!(points[0].converged);
    assert_eq!(points[0].degraded, None);
    assert_eq!(points[0].evaluations, 0);
    for p in &points[1..] {
        assert!(!p.converged);
        assert_eq!(p.degraded, Some(DegradeReason::EvaluationBudget));
        assert_eq!(p.evaluations, 5);
    }

    let row = serde_json::to_value(&points[1]).expect("serialize failed");
    assert_eq!(row["degraded"].as_str(), Some("EvaluationBudget"));
    let row = serde_json::to_value(&points[0]).expect("serialize failed");
    assert!(row.get("degraded").is_none());
}

#[test]
fn config_sets_id_and_budget() {
    let cfg = GompertzConfig {
        f0: 0.1,
        b: 0.5,
        n0: 100.0,
        id: Some("growth".to_string()),
        tree_id: None,
        max_evaluations: Some(50),
    };
    let model = GompertzGrowth::from_config(&cfg).expect("config rejected");
    assert_eq!(model.id(), "growth");
    assert_eq!(model.integrator().max_evaluations, 50);

    let bad = GompertzConfig { f0: f64::NAN, ..cfg };
    assert!(GompertzGrowth::from_config(&bad).is_err());
}

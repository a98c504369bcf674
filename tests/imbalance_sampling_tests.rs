//! Imbalance-adaptive sampling integration tests.
//!
//! Covers the anchored-and-deduplicated boundary sequence, the tick rule's
//! run-forward behavior inside a real scan, the frozen vs EWMA estimator
//! variants (tested separately: they are different designs, not a bug in
//! one of them), diagnostic trajectories, and the divergence guard.

use bar_sampler::{
    AdaptiveConfig, BarSampler, BarType, EstimatorUpdate, SamplerConfig, SamplerError, Tick,
    WarmupEstimator,
};

fn ticks_from(prices: &[f64], volumes: &[f64]) -> Vec<Tick> {
    prices
        .iter()
        .zip(volumes.iter())
        .enumerate()
        .map(|(i, (&price, &volume))| Tick::new(i as u64 * 1_000_000, price, volume))
        .collect()
}

fn manual(bar_type: BarType, e_t: f64, e_imb: f64) -> SamplerConfig {
    SamplerConfig::imbalance_with(
        bar_type,
        AdaptiveConfig {
            warmup: WarmupEstimator::Manual { e_t, e_imb },
            ..AdaptiveConfig::default()
        },
    )
}

// =============================================================================
// Boundary sequence shape
// =============================================================================

#[test]
fn test_anchor_duplicate_removed() {
    // threshold 0.5: the first tick itself crosses, duplicating the
    // seeded anchor at index 0
    let config = manual(BarType::Tick, 1.0, 0.5);
    let ticks = ticks_from(&[50.0, 51.0, 52.0], &[1.0, 1.0, 1.0]);

    let mut sampler = BarSampler::from_config(config).unwrap();
    let boundaries = sampler.sample(&ticks).unwrap();

    assert_eq!(boundaries, vec![0, 1, 2]);
    for pair in boundaries.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn test_anchor_present_without_early_crossing() {
    // high threshold: no crossing at all, only the anchor remains
    let config = manual(BarType::Tick, 100.0, 1.0);
    let ticks = ticks_from(&[50.0, 51.0, 51.0], &[1.0, 1.0, 1.0]);

    let mut sampler = BarSampler::from_config(config).unwrap();
    assert_eq!(sampler.sample(&ticks).unwrap(), vec![0]);
}

#[test]
fn test_empty_input_yields_empty_output() {
    let mut sampler =
        BarSampler::from_config(SamplerConfig::imbalance(BarType::Volume, 10.0)).unwrap();
    assert_eq!(sampler.sample(&[]).unwrap(), Vec::<usize>::new());
    assert_eq!(sampler.threshold(), 0.0);
}

#[test]
fn test_replay_is_deterministic() {
    let prices: Vec<f64> = (0..500)
        .map(|i| 100.0 + ((i * 29) % 17) as f64 * 0.25 - 2.0)
        .collect();
    let volumes: Vec<f64> = (0..500).map(|i| 1.0 + ((i * 11) % 7) as f64).collect();
    let ticks = ticks_from(&prices, &volumes);

    for update in [EstimatorUpdate::Frozen, EstimatorUpdate::Ewma] {
        let config = SamplerConfig::imbalance_with(
            BarType::Dollar,
            AdaptiveConfig {
                target_bars: 20.0,
                estimator_update: update,
                ..AdaptiveConfig::default()
            },
        );
        let mut sampler = BarSampler::from_config(config).unwrap();
        let first = sampler.sample(&ticks).unwrap();
        let second = sampler.sample(&ticks).unwrap();
        assert_eq!(first, second, "{update:?} replay diverged");
        assert!(!first.is_empty());
    }
}

// =============================================================================
// Tick rule inside a scan
// =============================================================================

#[test]
fn test_run_forward_carries_sign_through_flat_prices() {
    // signs: +1, +1, +1 (flat), +1 (flat), -1; theta peaks at 4 before
    // the down-tick pulls it back
    let config = manual(BarType::Tick, 100.0, 1.0);
    let ticks = ticks_from(&[50.0, 51.0, 51.0, 51.0, 50.0], &[1.0; 5]);

    let mut sampler = BarSampler::from_config(config).unwrap();
    let boundaries = sampler.sample(&ticks).unwrap();

    assert_eq!(boundaries, vec![0]);
    assert_eq!(
        sampler.diagnostics().abs_thetas,
        vec![0.0, 1.0, 2.0, 3.0, 4.0, 3.0]
    );
}

#[test]
fn test_zero_first_price_contributes_nothing() {
    // price 0.0 against the 0.0 seed runs the seed sign (0) forward:
    // the first tick contributes zero imbalance, deterministically
    let config = manual(BarType::Tick, 2.0, 1.0);
    let ticks = ticks_from(&[0.0, 1.0, 2.0], &[1.0; 3]);

    let mut sampler = BarSampler::from_config(config).unwrap();
    assert_eq!(sampler.sample(&ticks).unwrap(), vec![0, 2]);
}

// =============================================================================
// Estimator variants
// =============================================================================

#[test]
fn test_frozen_update_holds_threshold_constant() {
    let config = manual(BarType::Tick, 2.0, 1.0);
    let ticks = ticks_from(&[10.0, 11.0, 12.0, 13.0, 14.0], &[1.0; 5]);

    let mut sampler = BarSampler::from_config(config).unwrap();
    let boundaries = sampler.sample(&ticks).unwrap();

    // closes every 2 up-ticks
    assert_eq!(boundaries, vec![0, 1, 3]);
    assert_eq!(sampler.run_lengths(), &[2, 2]);
    assert!(sampler
        .diagnostics()
        .thresholds
        .iter()
        .all(|&t| (t - 2.0).abs() < 1e-12));
}

#[test]
fn test_ewma_update_adapts_threshold() {
    // Identical streams, differing only in the estimator update. Rising
    // prices make every sign +1; volumes [3, 1, 5, 5].
    //
    // Frozen keeps threshold 4, closing at ticks 1, 2 and 3. The EWMA
    // variant drops the threshold to 2 after the first close, then raises
    // it to 20/3 after the second, so tick 3 no longer closes a bar.
    let ticks = ticks_from(&[10.0, 11.0, 12.0, 13.0], &[3.0, 1.0, 5.0, 5.0]);

    let base = AdaptiveConfig {
        warmup: WarmupEstimator::Manual {
            e_t: 2.0,
            e_imb: 2.0,
        },
        imbalance_window: 1,
        ..AdaptiveConfig::default()
    };

    let frozen_config = SamplerConfig::imbalance_with(
        BarType::Volume,
        AdaptiveConfig {
            estimator_update: EstimatorUpdate::Frozen,
            ..base.clone()
        },
    );
    let ewma_config = SamplerConfig::imbalance_with(
        BarType::Volume,
        AdaptiveConfig {
            estimator_update: EstimatorUpdate::Ewma,
            ..base
        },
    );

    let mut frozen = BarSampler::from_config(frozen_config).unwrap();
    let mut ewma = BarSampler::from_config(ewma_config).unwrap();

    assert_eq!(frozen.sample(&ticks).unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(ewma.sample(&ticks).unwrap(), vec![0, 1, 2]);
    assert!((ewma.threshold() - 20.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_log_ratio_warmup_threshold() {
    // target_bars = 3: implied bar length ln(1/3)/ln(0.5) ~= 1.585, so
    // tick-imbalance bars start with threshold 1 * |1.585| and close on
    // every second up-tick
    let config = SamplerConfig::imbalance_with(
        BarType::Tick,
        AdaptiveConfig {
            target_bars: 3.0,
            ..AdaptiveConfig::default()
        },
    );
    let ticks = ticks_from(&[10.0, 11.0, 12.0, 13.0, 14.0], &[1.0; 5]);

    let mut sampler = BarSampler::from_config(config).unwrap();
    let boundaries = sampler.sample(&ticks).unwrap();

    let expected = (1.0_f64 / 3.0).ln() / 0.5_f64.ln();
    assert!((sampler.threshold() - expected).abs() < 1e-12);
    assert_eq!(boundaries, vec![0, 1, 3]);
}

#[test]
fn test_threshold_bounds_clamp_warmup() {
    let config = SamplerConfig::imbalance_with(
        BarType::Tick,
        AdaptiveConfig {
            warmup: WarmupEstimator::Manual {
                e_t: 2.0,
                e_imb: 1.0,
            },
            threshold_bounds: Some((0.5, 1.0)),
            ..AdaptiveConfig::default()
        },
    );
    let ticks = ticks_from(&[10.0, 11.0, 12.0], &[1.0; 3]);

    let mut sampler = BarSampler::from_config(config).unwrap();
    // clamped to 1.0: every up-tick closes a bar
    let boundaries = sampler.sample(&ticks).unwrap();
    assert_eq!(boundaries, vec![0, 1, 2]);
    assert!((sampler.threshold() - 1.0).abs() < 1e-12);
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_diagnostics_record_warmup_plus_one_entry_per_tick() {
    let config = manual(BarType::Tick, 2.0, 1.0);
    let ticks = ticks_from(&[10.0, 11.0, 12.0, 13.0, 14.0], &[1.0; 5]);

    let mut sampler = BarSampler::from_config(config).unwrap();
    sampler.sample(&ticks).unwrap();

    let diagnostics = sampler.diagnostics();
    assert_eq!(diagnostics.len(), ticks.len() + 1);
    assert_eq!(diagnostics.abs_thetas.len(), ticks.len() + 1);
    assert_eq!(diagnostics.thresholds.len(), ticks.len() + 1);
    assert_eq!(diagnostics.e_ts.len(), ticks.len() + 1);
    assert_eq!(diagnostics.e_imbs.len(), ticks.len() + 1);

    // theta resets to zero after each close
    assert_eq!(
        diagnostics.abs_thetas,
        vec![0.0, 1.0, 2.0, 1.0, 2.0, 1.0]
    );
}

#[test]
fn test_fixed_mode_records_no_diagnostics() {
    let mut sampler = BarSampler::from_config(SamplerConfig::fixed(BarType::Tick, 2.0)).unwrap();
    sampler
        .sample(&ticks_from(&[10.0, 11.0], &[1.0; 2]))
        .unwrap();
    assert!(sampler.diagnostics().is_empty());
}

// =============================================================================
// Divergence guard
// =============================================================================

#[test]
fn test_nan_volume_fails_with_numeric_divergence() {
    let config = manual(BarType::Volume, 2.0, 1.0);
    let ticks = vec![
        Tick::new(0, 10.0, 1.0),
        Tick::new(1, 11.0, f64::NAN),
    ];

    let mut sampler = BarSampler::from_config(config).unwrap();
    let result = sampler.sample(&ticks);
    assert!(matches!(
        result,
        Err(SamplerError::NumericDivergence { index: 1, .. })
    ));
}

#[test]
fn test_infinite_dollar_increment_fails() {
    let config = manual(BarType::Dollar, 2.0, 1.0);
    let ticks = vec![Tick::new(0, f64::MAX, f64::MAX)];

    let mut sampler = BarSampler::from_config(config).unwrap();
    assert!(matches!(
        sampler.sample(&ticks),
        Err(SamplerError::NumericDivergence { index: 0, .. })
    ));
}

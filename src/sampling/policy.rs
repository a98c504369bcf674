//! Threshold policies: when does accumulated activity close a bar?
//!
//! Two variants share the [`super::BarSampler`] driver by composition:
//!
//! - [`FixedPolicy`]: the threshold is computed once, before scanning,
//!   from summary statistics of the entire historical tick set, and never
//!   changes mid-stream. This is inherently non-streaming: the full slice
//!   must be known up front.
//! - [`ImbalancePolicy`]: the threshold is `E_T * |E_imb|`, the product of
//!   the expected bar run-length and the absolute expected per-tick
//!   imbalance, recomputed after every completed bar. Whether the two
//!   estimates are refreshed (EWMA over observed history) or frozen at
//!   their warm-up values is a configuration choice; the two variants
//!   behave quite differently on skewed order flow.

use super::ewma::ewma_last;
use crate::config::{AdaptiveConfig, EstimatorUpdate, WarmupEstimator};
use crate::error::{Result, SamplerError};
use crate::types::{BarType, Tick};

/// Whole-stream volume and price means.
fn stream_averages(ticks: &[Tick]) -> (f64, f64) {
    if ticks.is_empty() {
        return (0.0, 0.0);
    }
    let n = ticks.len() as f64;
    let total_volume: f64 = ticks.iter().map(|t| t.volume).sum();
    let total_price: f64 = ticks.iter().map(|t| t.price).sum();
    (total_volume / n, total_price / n)
}

/// Threshold producing a bar roughly every `target_len` ticks, scaled by
/// the bar family's increment averages.
fn static_threshold(bar_type: BarType, target_len: f64, avg_volume: f64, avg_price: f64) -> f64 {
    match bar_type {
        BarType::Tick => target_len,
        BarType::Volume => target_len * avg_volume,
        BarType::Dollar => target_len * avg_volume * avg_price,
    }
}

/// Static threshold from whole-stream averages.
#[derive(Debug, Clone)]
pub struct FixedPolicy {
    bar_type: BarType,
    target_bar_length: f64,
    threshold: f64,
}

impl FixedPolicy {
    pub(crate) fn new(bar_type: BarType, target_bar_length: f64) -> Self {
        Self {
            bar_type,
            target_bar_length,
            threshold: 0.0,
        }
    }

    /// Reset to the pre-scan sentinel state.
    pub(crate) fn reset(&mut self) {
        self.threshold = 0.0;
    }

    /// Compute the threshold from the full tick slice. Empty input leaves
    /// the sentinel `0.0` in place.
    pub(crate) fn prepare(&mut self, ticks: &[Tick]) {
        if ticks.is_empty() {
            self.threshold = 0.0;
            return;
        }

        let (avg_volume, avg_price) = stream_averages(ticks);
        self.threshold =
            static_threshold(self.bar_type, self.target_bar_length, avg_volume, avg_price);

        if self.threshold <= 0.0 {
            log::warn!(
                "degenerate fixed threshold {} for {:?} bars; every tick will close a bar",
                self.threshold,
                self.bar_type
            );
        }
    }

    /// Unsigned per-tick increment.
    #[inline]
    pub(crate) fn increment(&self, tick: &Tick) -> f64 {
        self.bar_type.increment(tick)
    }

    /// Current crossing bound.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Adaptive threshold driven by running `E_T` / `E_imb` estimates.
#[derive(Debug, Clone)]
pub struct ImbalancePolicy {
    bar_type: BarType,
    config: AdaptiveConfig,
    e_t: f64,
    e_imb: f64,
    threshold: f64,
}

impl ImbalancePolicy {
    pub(crate) fn new(bar_type: BarType, config: AdaptiveConfig) -> Self {
        Self {
            bar_type,
            config,
            e_t: 1.0,
            e_imb: 0.0,
            threshold: 0.0,
        }
    }

    /// Reset estimates to the pre-warm-up sentinel state.
    pub(crate) fn reset(&mut self) {
        self.e_t = 1.0;
        self.e_imb = 0.0;
        self.threshold = 0.0;
    }

    /// Warm up `E_T` / `E_imb` and the initial threshold.
    ///
    /// The `LogRatio` estimator needs the same whole-stream averages the
    /// fixed policy uses; `Manual` ignores the tick data entirely.
    pub(crate) fn prepare(&mut self, ticks: &[Tick]) -> Result<()> {
        match self.config.warmup {
            WarmupEstimator::LogRatio => {
                self.e_t = 1.0;
                let implied_len = (1.0 / self.config.target_bars).ln() / 0.5_f64.ln();
                let (avg_volume, avg_price) = stream_averages(ticks);
                self.e_imb = static_threshold(self.bar_type, implied_len, avg_volume, avg_price);
            }
            WarmupEstimator::Manual { e_t, e_imb } => {
                self.e_t = e_t;
                self.e_imb = e_imb;
            }
        }

        self.threshold = self.e_t * self.e_imb.abs();
        if !self.threshold.is_finite() {
            return Err(SamplerError::InvalidConfiguration {
                reason: format!("warm-up produced a non-finite threshold {}", self.threshold),
            });
        }
        if self.threshold <= 0.0 {
            log::warn!(
                "degenerate imbalance threshold {}; every tick will close a bar",
                self.threshold
            );
        }
        if let Some((lo, hi)) = self.config.threshold_bounds {
            self.threshold = self.threshold.clamp(lo, hi);
        }

        Ok(())
    }

    /// Unsigned per-tick increment. The caller multiplies by the tick-rule
    /// sign to form the signed imbalance contribution.
    #[inline]
    pub(crate) fn increment(&self, tick: &Tick) -> f64 {
        self.bar_type.increment(tick)
    }

    /// Recompute the threshold after a bar closed at tick `index`.
    ///
    /// With the `Ewma` update, `E_T` is smoothed over all observed
    /// run-lengths (span = number of observations) and `E_imb` over the
    /// full signed imbalance history (span = `imbalance_window`). With
    /// `Frozen`, the warm-up estimates are held.
    pub(crate) fn on_bar_close(
        &mut self,
        run_lengths: &[usize],
        imbalance_history: &[f64],
        index: usize,
    ) -> Result<()> {
        match self.config.estimator_update {
            EstimatorUpdate::Frozen => {}
            EstimatorUpdate::Ewma => {
                let runs: Vec<f64> = run_lengths.iter().map(|&t| t as f64).collect();
                if let Some(e_t) = ewma_last(&runs, runs.len().max(1)) {
                    self.e_t = e_t;
                }
                if let Some(e_imb) = ewma_last(imbalance_history, self.config.imbalance_window) {
                    self.e_imb = e_imb;
                }
            }
        }

        self.threshold = self.e_t * self.e_imb.abs();
        if !self.threshold.is_finite() {
            return Err(SamplerError::NumericDivergence {
                index,
                value: self.threshold,
            });
        }
        if let Some((lo, hi)) = self.config.threshold_bounds {
            self.threshold = self.threshold.clamp(lo, hi);
        }

        log::debug!(
            "bar closed at tick {index}: e_t={}, e_imb={}, threshold={}",
            self.e_t,
            self.e_imb,
            self.threshold
        );

        Ok(())
    }

    /// Current crossing bound.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Current expected bar run-length estimate.
    #[inline]
    pub fn e_t(&self) -> f64 {
        self.e_t
    }

    /// Current expected per-tick imbalance estimate.
    #[inline]
    pub fn e_imb(&self) -> f64 {
        self.e_imb
    }
}

/// Tagged threshold policy owned by the sampler driver.
#[derive(Debug, Clone)]
pub enum ThresholdPolicy {
    /// Static threshold from whole-stream averages.
    Fixed(FixedPolicy),
    /// Adaptive `E_T * |E_imb|` threshold.
    Imbalance(ImbalancePolicy),
}

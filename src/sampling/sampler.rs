//! Bar sampler driver.
//!
//! Walks an ordered tick slice exactly once, accumulating a running
//! statistic (`theta`) and emitting a bar boundary whenever `theta` crosses
//! the policy's current threshold, then resetting. All bookkeeping is
//! internal; callers observe only the boundary sequence and, for imbalance
//! mode, the diagnostic trajectories.
//!
//! # Guarantees
//!
//! - Single forward pass, O(n) in the number of ticks
//! - Boundaries are strictly increasing indices into the input slice, and
//!   every boundary is a position where the crossing test held at that tick
//!   (no retroactive placement)
//! - Replaying the identical slice and configuration yields an identical
//!   boundary sequence: all state is reset at the start of every scan
//!
//! # Example
//!
//! ```
//! use bar_sampler::{BarSampler, BarType, SamplerConfig, Tick};
//!
//! let ticks: Vec<Tick> = (0..10)
//!     .map(|i| Tick::new(i * 1_000, 100.0 + i as f64, 10.0))
//!     .collect();
//!
//! let mut sampler = BarSampler::from_config(SamplerConfig::fixed(BarType::Tick, 3.0))?;
//! assert_eq!(sampler.sample(&ticks)?, vec![2, 5, 8]);
//! # Ok::<(), bar_sampler::SamplerError>(())
//! ```

use super::policy::{FixedPolicy, ImbalancePolicy, ThresholdPolicy};
use super::tick_rule::TickRule;
use crate::config::{SamplerConfig, SamplerMode};
use crate::error::{Result, SamplerError};
use crate::types::Tick;

/// Per-tick trajectories recorded during an imbalance scan, for offline
/// inspection and plotting. Each vector holds one warm-up entry followed by
/// one entry per tick, so the length is `ticks.len() + 1`.
///
/// Fixed-mode scans leave the trajectories empty.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// `|theta|` after each tick's update.
    pub abs_thetas: Vec<f64>,

    /// Threshold in force while each tick was processed.
    pub thresholds: Vec<f64>,

    /// Expected bar run-length estimate over time.
    pub e_ts: Vec<f64>,

    /// Expected per-tick imbalance estimate over time.
    pub e_imbs: Vec<f64>,
}

impl Diagnostics {
    fn clear(&mut self) {
        self.abs_thetas.clear();
        self.thresholds.clear();
        self.e_ts.clear();
        self.e_imbs.clear();
    }

    fn record(&mut self, abs_theta: f64, threshold: f64, e_t: f64, e_imb: f64) {
        self.abs_thetas.push(abs_theta);
        self.thresholds.push(threshold);
        self.e_ts.push(e_t);
        self.e_imbs.push(e_imb);
    }

    /// Number of recorded entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.abs_thetas.len()
    }

    /// True when no entries have been recorded (fixed mode, or no scan yet).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.abs_thetas.is_empty()
    }
}

/// Mutable scan state, owned exclusively by one sampler and recreated at
/// the start of every scan.
#[derive(Debug, Clone)]
struct SamplerState {
    /// Running accumulator since the last emitted boundary.
    theta: f64,

    /// Tick-rule outputs, seeded with one `0` entry so the previous-sign
    /// lookup is always defined. The seed is never the sign of a real tick.
    sign_history: Vec<i8>,

    /// Signed per-tick increments, append-only for the whole stream.
    imbalance_history: Vec<f64>,

    /// Observed ticks-per-bar, one entry per completed bar.
    run_lengths: Vec<usize>,
}

impl SamplerState {
    fn new() -> Self {
        Self {
            theta: 0.0,
            sign_history: vec![0],
            imbalance_history: Vec::new(),
            run_lengths: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.theta = 0.0;
        self.sign_history.clear();
        self.sign_history.push(0);
        self.imbalance_history.clear();
        self.run_lengths.clear();
    }
}

/// Single-pass bar sampler over an ordered tick slice.
///
/// Owns a [`ThresholdPolicy`] (fixed or imbalance-adaptive) and drives it
/// over the stream. Construct one sampler per configuration; samplers are
/// cheap and share nothing, so independent configurations can run on
/// separate threads without coordination (see [`crate::batch`]).
pub struct BarSampler {
    policy: ThresholdPolicy,
    tick_rule: TickRule,
    state: SamplerState,
    diagnostics: Diagnostics,
}

impl BarSampler {
    /// Build a sampler from a validated configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the configuration fails validation; the
    /// sampler never starts scanning with bad parameters.
    pub fn from_config(config: SamplerConfig) -> Result<Self> {
        config.validate()?;

        let policy = match config.mode {
            SamplerMode::Fixed => ThresholdPolicy::Fixed(FixedPolicy::new(
                config.bar_type,
                config.target_bar_length,
            )),
            SamplerMode::ImbalanceAdaptive => {
                let adaptive = config.adaptive.ok_or_else(|| {
                    SamplerError::InvalidConfiguration {
                        reason: "ImbalanceAdaptive mode requires adaptive parameters".to_string(),
                    }
                })?;
                ThresholdPolicy::Imbalance(ImbalancePolicy::new(config.bar_type, adaptive))
            }
        };

        Ok(Self {
            policy,
            tick_rule: TickRule::new(),
            state: SamplerState::new(),
            diagnostics: Diagnostics::default(),
        })
    }

    /// Sample the tick slice into an ordered sequence of bar boundaries.
    ///
    /// Imbalance mode anchors the output at the first tick's position, so
    /// index `0` always opens the sequence; a threshold crossing at the
    /// first tick would duplicate it, and the output is de-duplicated.
    ///
    /// An empty slice yields an empty boundary sequence with the threshold
    /// left at the `0.0` sentinel.
    ///
    /// # Errors
    ///
    /// `NumericDivergence` if a signed increment or a recomputed threshold
    /// is non-finite mid-scan.
    pub fn sample(&mut self, ticks: &[Tick]) -> Result<Vec<usize>> {
        let crossings = self.scan(ticks)?;

        match self.policy {
            ThresholdPolicy::Fixed(_) => Ok(crossings),
            ThresholdPolicy::Imbalance(_) => {
                if ticks.is_empty() {
                    return Ok(Vec::new());
                }
                let mut boundaries = Vec::with_capacity(crossings.len() + 1);
                boundaries.push(0);
                boundaries.extend(crossings);
                // Positions are non-decreasing, so the anchor duplicate is
                // always adjacent.
                boundaries.dedup();
                Ok(boundaries)
            }
        }
    }

    /// Position of the first threshold crossing, or `None` if the stream
    /// never crosses. Unlike [`sample`](Self::sample), imbalance mode does
    /// not anchor the result at index `0`.
    pub fn next_boundary(&mut self, ticks: &[Tick]) -> Result<Option<usize>> {
        Ok(self.scan(ticks)?.into_iter().next())
    }

    /// Threshold currently in force (after the last scan).
    pub fn threshold(&self) -> f64 {
        match &self.policy {
            ThresholdPolicy::Fixed(p) => p.threshold(),
            ThresholdPolicy::Imbalance(p) => p.threshold(),
        }
    }

    /// Observed ticks-per-bar for each completed bar of the last scan.
    /// Fixed-mode scans do not record run lengths.
    pub fn run_lengths(&self) -> &[usize] {
        &self.state.run_lengths
    }

    /// Diagnostic trajectories recorded by the last imbalance scan.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Reset all mutable scan state so the next scan replays from scratch.
    fn reset(&mut self) {
        self.state.reset();
        self.diagnostics.clear();
        self.tick_rule = TickRule::new();
        match &mut self.policy {
            ThresholdPolicy::Fixed(p) => p.reset(),
            ThresholdPolicy::Imbalance(p) => p.reset(),
        }
    }

    /// Forward pass returning raw crossing positions (no anchoring).
    fn scan(&mut self, ticks: &[Tick]) -> Result<Vec<usize>> {
        self.reset();
        if ticks.is_empty() {
            return Ok(Vec::new());
        }

        match &mut self.policy {
            ThresholdPolicy::Fixed(policy) => {
                policy.prepare(ticks);
                let threshold = policy.threshold();

                let mut crossings = Vec::new();
                for (i, tick) in ticks.iter().enumerate() {
                    self.state.theta += policy.increment(tick);
                    if self.state.theta >= threshold {
                        crossings.push(i);
                        self.state.theta = 0.0;
                    }
                }
                Ok(crossings)
            }
            ThresholdPolicy::Imbalance(policy) => {
                policy.prepare(ticks)?;
                self.diagnostics
                    .record(0.0, policy.threshold(), policy.e_t(), policy.e_imb());

                let mut crossings = Vec::new();
                for (i, tick) in ticks.iter().enumerate() {
                    let prev_sign = self.state.sign_history.last().copied().unwrap_or(0);
                    let sign = self.tick_rule.sign(tick.price, prev_sign);
                    self.state.sign_history.push(sign);

                    let imbalance = f64::from(sign) * policy.increment(tick);
                    if !imbalance.is_finite() {
                        return Err(SamplerError::NumericDivergence {
                            index: i,
                            value: imbalance,
                        });
                    }

                    self.state.imbalance_history.push(imbalance);
                    self.state.theta += imbalance;
                    self.diagnostics.record(
                        self.state.theta.abs(),
                        policy.threshold(),
                        policy.e_t(),
                        policy.e_imb(),
                    );

                    if self.state.theta.abs() >= policy.threshold() {
                        let consumed: usize = self.state.run_lengths.iter().sum();
                        self.state
                            .run_lengths
                            .push(self.state.imbalance_history.len() - consumed);
                        policy.on_bar_close(
                            &self.state.run_lengths,
                            &self.state.imbalance_history,
                            i,
                        )?;
                        self.state.theta = 0.0;
                        crossings.push(i);
                    }
                }
                Ok(crossings)
            }
        }
    }
}

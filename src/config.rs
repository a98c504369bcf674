//! Sampler configuration management.
//!
//! This module provides the configuration surface for a sampling run, with
//! serialization support for experiment reproducibility.
//!
//! # Features
//!
//! - **Unified Configuration**: One struct describing bar type, sampling
//!   mode and (for imbalance bars) the adaptive-threshold parameters
//! - **Serialization**: Save/load configurations to TOML or JSON
//! - **Validation**: Configurations are validated before any scanning begins
//!
//! # Example
//!
//! ```
//! use bar_sampler::{BarType, SamplerConfig};
//!
//! // Fixed volume bars closing roughly every 100 ticks' worth of volume
//! let config = SamplerConfig::fixed(BarType::Volume, 100.0);
//! assert!(config.validate().is_ok());
//!
//! // Adaptive tick imbalance bars targeting ~50 bars per stream
//! let config = SamplerConfig::imbalance(BarType::Tick, 50.0);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Result, SamplerError};
use crate::types::BarType;
use std::fs;
use std::path::Path;

/// Sampling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SamplerMode {
    /// Static threshold computed once from whole-stream averages.
    Fixed,

    /// Signed order-flow accumulation with a threshold recomputed after
    /// every completed bar.
    ImbalanceAdaptive,
}

/// Warm-up strategy for the adaptive threshold's initial estimates.
///
/// The log-ratio bootstrap is acknowledged to be rough and the downstream
/// behavior is sensitive to it, so it is kept pluggable: a run calibrated
/// elsewhere can inject its estimates directly via `Manual`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum WarmupEstimator {
    /// Derive the implied per-tick imbalance from the desired
    /// bars-per-stream count: the static-threshold formula evaluated at
    /// `ln(1 / target_bars) / ln(0.5)` in place of the bar-length target.
    LogRatio,

    /// Skip the heuristic and seed the estimators directly.
    Manual {
        /// Initial expected bar run-length (ticks per bar).
        e_t: f64,
        /// Initial expected per-tick imbalance.
        e_imb: f64,
    },
}

/// How `E_T` / `E_imb` are refreshed when a bar closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EstimatorUpdate {
    /// Hold the warm-up estimates for the whole scan. The threshold is
    /// still recomputed as `E_T * |E_imb|` at every bar close, but with
    /// frozen inputs it stays constant in practice.
    Frozen,

    /// Refresh `E_T` from an EWMA over observed run-lengths and `E_imb`
    /// from an EWMA over the signed imbalance history at every bar close.
    Ewma,
}

/// Parameters for the imbalance-adaptive threshold policy.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdaptiveConfig {
    /// Desired number of bars per stream, used by the `LogRatio` warm-up.
    /// Must be > 1 so the implied bar length is positive.
    pub target_bars: f64,

    /// Estimator refresh behavior at bar close.
    pub estimator_update: EstimatorUpdate,

    /// EWMA span for the `E_imb` refresh (`Ewma` update only). A larger
    /// span reacts more slowly to bulk orders but generates more bars.
    pub imbalance_window: usize,

    /// Optional `(min, max)` clamp applied to every recomputed threshold,
    /// bounding runaway or collapsing adaptation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_bounds: Option<(f64, f64)>,

    /// Warm-up strategy for the initial `E_T` / `E_imb` estimates.
    pub warmup: WarmupEstimator,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            target_bars: 100.0,
            estimator_update: EstimatorUpdate::Frozen,
            imbalance_window: 300,
            threshold_bounds: None,
            warmup: WarmupEstimator::LogRatio,
        }
    }
}

/// Unified sampler configuration.
///
/// Construct via [`SamplerConfig::fixed`], [`SamplerConfig::imbalance`] or
/// [`SamplerConfig::imbalance_with`], or deserialize from TOML/JSON.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SamplerConfig {
    /// Bar family determining the per-tick increment.
    pub bar_type: BarType,

    /// Sampling mode.
    pub mode: SamplerMode,

    /// Desired ticks-per-bar for `Fixed` mode. Ignored by
    /// `ImbalanceAdaptive` mode.
    pub target_bar_length: f64,

    /// Adaptive-threshold parameters. Required when `mode` is
    /// `ImbalanceAdaptive`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adaptive: Option<AdaptiveConfig>,
}

impl SamplerConfig {
    /// Fixed-threshold configuration closing a bar roughly every
    /// `target_bar_length` ticks' worth of activity.
    pub fn fixed(bar_type: BarType, target_bar_length: f64) -> Self {
        Self {
            bar_type,
            mode: SamplerMode::Fixed,
            target_bar_length,
            adaptive: None,
        }
    }

    /// Imbalance-adaptive configuration targeting roughly `target_bars`
    /// bars per stream, with default warm-up and a frozen estimator.
    pub fn imbalance(bar_type: BarType, target_bars: f64) -> Self {
        Self::imbalance_with(
            bar_type,
            AdaptiveConfig {
                target_bars,
                ..AdaptiveConfig::default()
            },
        )
    }

    /// Imbalance-adaptive configuration with explicit adaptive parameters.
    pub fn imbalance_with(bar_type: BarType, adaptive: AdaptiveConfig) -> Self {
        Self {
            bar_type,
            mode: SamplerMode::ImbalanceAdaptive,
            target_bar_length: 0.0,
            adaptive: Some(adaptive),
        }
    }

    /// Validate the configuration.
    ///
    /// Called by `BarSampler::from_config` and after every file load, so a
    /// bad configuration fails fast rather than mid-scan.
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            SamplerMode::Fixed => {
                if !self.target_bar_length.is_finite() || self.target_bar_length <= 0.0 {
                    return Err(SamplerError::InvalidConfiguration {
                        reason: format!(
                            "target_bar_length must be a positive finite number, got {}",
                            self.target_bar_length
                        ),
                    });
                }
            }
            SamplerMode::ImbalanceAdaptive => {
                let adaptive = self.adaptive.as_ref().ok_or_else(|| {
                    SamplerError::InvalidConfiguration {
                        reason: "ImbalanceAdaptive mode requires adaptive parameters".to_string(),
                    }
                })?;
                adaptive.validate()?;
            }
        }
        Ok(())
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from a TOML file, validating it.
    pub fn load_toml<P: AsRef<Path>>(
        path: P,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: SamplerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_json<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from a JSON file, validating it.
    pub fn load_json<P: AsRef<Path>>(
        path: P,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: SamplerConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

impl AdaptiveConfig {
    /// Validate the adaptive parameters.
    pub fn validate(&self) -> Result<()> {
        match self.warmup {
            WarmupEstimator::LogRatio => {
                // ln(1/target_bars) / ln(0.5) is positive only for
                // target_bars > 1; at exactly 1 the implied threshold is 0.
                if !self.target_bars.is_finite() || self.target_bars <= 1.0 {
                    return Err(SamplerError::InvalidConfiguration {
                        reason: format!(
                            "target_bars must be a finite number > 1, got {}",
                            self.target_bars
                        ),
                    });
                }
            }
            WarmupEstimator::Manual { e_t, e_imb } => {
                if !e_t.is_finite() || e_t <= 0.0 {
                    return Err(SamplerError::InvalidConfiguration {
                        reason: format!(
                            "manual warm-up e_t must be positive and finite, got {e_t}"
                        ),
                    });
                }
                if !e_imb.is_finite() || e_imb == 0.0 {
                    return Err(SamplerError::InvalidConfiguration {
                        reason: format!(
                            "manual warm-up e_imb must be non-zero and finite, got {e_imb}"
                        ),
                    });
                }
            }
        }

        if self.imbalance_window == 0 {
            return Err(SamplerError::InvalidConfiguration {
                reason: "imbalance_window must be >= 1".to_string(),
            });
        }

        if let Some((lo, hi)) = self.threshold_bounds {
            if !(lo.is_finite() && hi.is_finite()) || lo <= 0.0 || lo > hi {
                return Err(SamplerError::InvalidConfiguration {
                    reason: format!(
                        "threshold_bounds must satisfy 0 < min <= max, got ({lo}, {hi})"
                    ),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_config_valid() {
        let config = SamplerConfig::fixed(BarType::Dollar, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_config_rejects_zero_target() {
        let config = SamplerConfig::fixed(BarType::Tick, 0.0);
        assert!(matches!(
            config.validate(),
            Err(SamplerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_fixed_config_rejects_nan_target() {
        let config = SamplerConfig::fixed(BarType::Tick, f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_imbalance_config_requires_adaptive_params() {
        let config = SamplerConfig {
            bar_type: BarType::Tick,
            mode: SamplerMode::ImbalanceAdaptive,
            target_bar_length: 0.0,
            adaptive: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_imbalance_config_rejects_target_bars_of_one() {
        // target_bars == 1 implies a zero warm-up threshold
        let config = SamplerConfig::imbalance(BarType::Volume, 1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_manual_warmup_rejects_zero_imbalance() {
        let config = SamplerConfig::imbalance_with(
            BarType::Tick,
            AdaptiveConfig {
                warmup: WarmupEstimator::Manual {
                    e_t: 100.0,
                    e_imb: 0.0,
                },
                ..AdaptiveConfig::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_manual_warmup_accepts_negative_imbalance() {
        // The threshold uses |e_imb|, so a negative estimate is fine
        let config = SamplerConfig::imbalance_with(
            BarType::Tick,
            AdaptiveConfig {
                warmup: WarmupEstimator::Manual {
                    e_t: 100.0,
                    e_imb: -3_000.0,
                },
                ..AdaptiveConfig::default()
            },
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_threshold_bounds_rejected() {
        let config = SamplerConfig::imbalance_with(
            BarType::Tick,
            AdaptiveConfig {
                threshold_bounds: Some((10.0, 1.0)),
                ..AdaptiveConfig::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_imbalance_window_rejected() {
        let config = SamplerConfig::imbalance_with(
            BarType::Tick,
            AdaptiveConfig {
                imbalance_window: 0,
                ..AdaptiveConfig::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sampler.toml");

        let config = SamplerConfig::imbalance_with(
            BarType::Dollar,
            AdaptiveConfig {
                target_bars: 50.0,
                estimator_update: EstimatorUpdate::Ewma,
                imbalance_window: 150,
                threshold_bounds: Some((1.0, 1e9)),
                ..AdaptiveConfig::default()
            },
        );

        config.save_toml(&path).unwrap();
        let loaded = SamplerConfig::load_toml(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sampler.json");

        let config = SamplerConfig::fixed(BarType::Volume, 250.0);
        config.save_json(&path).unwrap();
        let loaded = SamplerConfig::load_json(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");

        let config = SamplerConfig::fixed(BarType::Tick, -5.0);
        config.save_toml(&path).unwrap();
        assert!(SamplerConfig::load_toml(&path).is_err());
    }
}

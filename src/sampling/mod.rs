//! Information-driven bar sampling.
//!
//! This module contains the sampling core: the single-pass driver and the
//! pieces it composes.
//!
//! - **Tick rule**: sign-of-price-change classifier with run-forward
//!   semantics on unchanged prices
//! - **EWMA**: span-parameterized exponential smoothing used to refresh
//!   the adaptive estimator after each completed bar
//! - **Threshold policies**: a static whole-stream threshold and an
//!   adaptive `E_T * |E_imb|` threshold, sharing one driver by composition
//! - **Driver**: [`BarSampler`], walking the tick stream once and emitting
//!   boundary positions on every threshold crossing
//!
//! # Example
//!
//! ```
//! use bar_sampler::{BarSampler, BarType, SamplerConfig, Tick};
//!
//! let ticks = vec![
//!     Tick::new(0, 50.0, 100.0),
//!     Tick::new(1, 51.0, 150.0),
//!     Tick::new(2, 50.5, 50.0),
//!     Tick::new(3, 49.8, 120.0),
//!     Tick::new(4, 47.6, 80.0),
//! ];
//!
//! let mut sampler = BarSampler::from_config(SamplerConfig::fixed(BarType::Volume, 2.0))?;
//! assert_eq!(sampler.sample(&ticks)?, vec![1, 4]);
//! # Ok::<(), bar_sampler::SamplerError>(())
//! ```

pub mod ewma;
pub mod policy;
pub mod sampler;
pub mod tick_rule;

// Re-export commonly used types for convenience
pub use ewma::{ewma, ewma_last};
pub use policy::{FixedPolicy, ImbalancePolicy, ThresholdPolicy};
pub use sampler::{BarSampler, Diagnostics};
pub use tick_rule::TickRule;

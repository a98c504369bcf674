//! Bar Sampler
//!
//! Information-driven bar sampling for trade tick streams.
//!
//! # Overview
//!
//! This library reduces a time-ordered stream of trade ticks (timestamp,
//! price, volume) to a sequence of bar boundaries: positions where enough
//! trading activity has accumulated to justify a new sampling point. Two
//! families are supported:
//!
//! - **Fixed-threshold bars**: tick, volume and dollar bars with a static
//!   threshold derived once from whole-stream averages
//! - **Adaptive imbalance bars**: signed order-flow accumulation with a
//!   threshold recomputed after every completed bar from running estimates
//!   of expected bar length and expected per-tick imbalance
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Bar Sampler                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  types.rs       - Tick, BarType                                │
//! │  config.rs      - SamplerConfig, validation, TOML/JSON I/O     │
//! │  sampling/      - tick rule, EWMA, threshold policies, driver  │
//! │  batch.rs       - parallel runs across configurations          │
//! │  validation.rs  - advisory tick-stream sanity checks           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The driver walks the tick slice exactly once; for each tick it asks its
//! threshold policy for the per-tick increment, updates the running
//! accumulator `theta`, and emits a boundary whenever `theta` crosses the
//! current threshold, then resets. Boundaries are strictly increasing
//! indices into the input, never interpolated.
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
//! // Tick bars closing every 2 trades
//! let mut sampler = BarSampler::from_config(SamplerConfig::fixed(BarType::Tick, 2.0))?;
//! assert_eq!(sampler.sample(&ticks)?, vec![1, 3]);
//! # Ok::<(), bar_sampler::SamplerError>(())
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod sampling;
pub mod types;
pub mod validation;

// Re-exports - Types
pub use types::{BarType, Tick};

// Re-exports - Config
pub use config::{AdaptiveConfig, EstimatorUpdate, SamplerConfig, SamplerMode, WarmupEstimator};

// Re-exports - Errors
pub use error::{Result, SamplerError};

// Re-exports - Sampling
pub use sampling::{BarSampler, Diagnostics, TickRule};

// Re-exports - Batch
pub use batch::{BatchConfig, BatchItem, BatchOutput, BatchRunner};

// Re-exports - Validation
pub use validation::{validate_ticks, ValidationLevel, ValidationResult};

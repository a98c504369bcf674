//! Error types for bar sampling.
//!
//! There are deliberately few failure modes: configuration problems are
//! rejected before any scanning begins, and the only mid-scan failure is a
//! non-finite value escaping the adaptive estimator. An empty tick sequence
//! is *not* an error: sampling it yields an empty boundary sequence.

use thiserror::Error;

/// Errors produced by sampler construction and scanning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    /// Configuration rejected before any scanning begins.
    ///
    /// Raised for non-positive bar-length targets, a bars-per-stream target
    /// that cannot produce a positive warm-up threshold, manual warm-up
    /// estimates that are zero or non-finite, or inverted threshold bounds.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Human-readable description of the rejected parameter.
        reason: String,
    },

    /// The adaptive estimator produced a non-finite quantity mid-scan.
    ///
    /// The scan aborts rather than emitting garbage boundaries. `index` is
    /// the position of the tick being processed when divergence was
    /// detected; `value` is the offending quantity (a signed imbalance
    /// increment or a recomputed threshold).
    #[error("numeric divergence at tick {index}: non-finite value {value}")]
    NumericDivergence {
        /// Tick index at which divergence was detected.
        index: usize,
        /// The non-finite value (NaN or ±inf).
        value: f64,
    },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SamplerError>;

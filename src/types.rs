//! Core tick-stream types.
//!
//! A [`Tick`] is one observed trade event. The sampler consumes an ordered
//! slice of ticks and emits bar boundaries as indices into that slice; it
//! never fabricates or interpolates positions.
//!
//! Timestamps are nanoseconds since the epoch, declared as `u64` to match
//! the rest of the pipeline. The sampler itself only requires that ticks
//! arrive pre-sorted; it does not inspect timestamps beyond carrying them.

use serde::{Deserialize, Serialize};

/// One observed trade event.
///
/// # Example
///
/// ```
/// use bar_sampler::Tick;
///
/// let tick = Tick::new(1_700_000_000_000_000_000, 101.25, 300.0);
/// assert_eq!(tick.dollar_value(), 101.25 * 300.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Event timestamp (nanoseconds since epoch). Ticks arrive pre-sorted
    /// by this field; equal timestamps are permitted.
    pub timestamp_ns: u64,

    /// Trade price.
    pub price: f64,

    /// Trade volume (shares/contracts).
    pub volume: f64,
}

impl Tick {
    /// Create a new tick.
    #[inline]
    pub fn new(timestamp_ns: u64, price: f64, volume: f64) -> Self {
        Self {
            timestamp_ns,
            price,
            volume,
        }
    }

    /// Notional value traded: `price * volume`.
    #[inline]
    pub fn dollar_value(&self) -> f64 {
        self.price * self.volume
    }
}

/// Bar family, determining the per-tick increment accumulated toward the
/// bar-close threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarType {
    /// Every tick contributes `1` (bars close after a number of trades).
    Tick,

    /// Every tick contributes its volume (bars close after traded volume).
    Volume,

    /// Every tick contributes `volume * price` (bars close after traded
    /// notional value).
    Dollar,
}

impl BarType {
    /// Per-tick increment contributed toward the threshold.
    ///
    /// For imbalance bars this scalar is additionally multiplied by the
    /// tick-rule sign, producing a signed imbalance contribution.
    ///
    /// # Example
    ///
    /// ```
    /// use bar_sampler::{BarType, Tick};
    ///
    /// let tick = Tick::new(0, 50.0, 100.0);
    /// assert_eq!(BarType::Tick.increment(&tick), 1.0);
    /// assert_eq!(BarType::Volume.increment(&tick), 100.0);
    /// assert_eq!(BarType::Dollar.increment(&tick), 5_000.0);
    /// ```
    #[inline]
    pub fn increment(&self, tick: &Tick) -> f64 {
        match self {
            BarType::Tick => 1.0,
            BarType::Volume => tick.volume,
            BarType::Dollar => tick.dollar_value(),
        }
    }
}

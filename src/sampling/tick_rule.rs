//! Tick rule: sign-of-price-change classifier with run-forward ties.
//!
//! Classifies each trade as buyer-initiated (`+1`) or seller-initiated
//! (`-1`) from the direction of the price change since the previous trade.
//! A trade at an unchanged price inherits the previous sign, so runs of
//! no-change ticks carry the last observed direction forward.
//!
//! The very first tick has no real predecessor: the previous price is
//! seeded to `0.0` and the previous sign to `0`. Any positive first price
//! therefore classifies as `+1`; a first price of exactly `0.0` yields the
//! seed sign `0` (a zero imbalance contribution) rather than a crash.

/// Sign classifier over consecutive trade prices.
///
/// Holds only the previous price; the previous sign is supplied by the
/// caller from its sign history, so the history remains the single source
/// of truth for run-forward lookups.
///
/// # Example
///
/// ```
/// use bar_sampler::sampling::TickRule;
///
/// let mut rule = TickRule::new();
/// assert_eq!(rule.sign(50.0, 0), 1);  // first tick, price above seed
/// assert_eq!(rule.sign(51.0, 1), 1);  // up-tick
/// assert_eq!(rule.sign(51.0, 1), 1);  // no change, runs forward
/// assert_eq!(rule.sign(50.5, 1), -1); // down-tick
/// ```
#[derive(Debug, Clone)]
pub struct TickRule {
    prev_price: f64,
}

impl TickRule {
    /// Create a fresh rule with the previous price seeded to `0.0`.
    pub fn new() -> Self {
        Self { prev_price: 0.0 }
    }

    /// Classify the current price against the previous one.
    ///
    /// Returns `+1` for an up-tick, `-1` for a down-tick, and `prev_sign`
    /// when the price is unchanged. Updates the stored previous price.
    #[inline]
    pub fn sign(&mut self, curr_price: f64, prev_sign: i8) -> i8 {
        let delta = curr_price - self.prev_price;
        self.prev_price = curr_price;

        if delta > 0.0 {
            1
        } else if delta < 0.0 {
            -1
        } else {
            prev_sign
        }
    }
}

impl Default for TickRule {
    fn default() -> Self {
        Self::new()
    }
}

//! Tick-stream validation.
//!
//! Advisory sanity checks for tick data before sampling. The sampler
//! itself trusts its input (ticks are produced upstream and arrive
//! pre-sorted); these checks exist so a host application can surface data
//! problems (out-of-order timestamps, non-finite prices, all-zero volumes
//! that would degenerate a volume/dollar threshold) before they show up
//! as strange bar sequences.
//!
//! # Usage
//!
//! ```
//! use bar_sampler::{validate_ticks, Tick};
//!
//! let ticks = vec![Tick::new(0, 50.0, 100.0), Tick::new(1, 50.5, 120.0)];
//! let result = validate_ticks(&ticks);
//! assert!(result.is_valid());
//! ```

use crate::types::Tick;
use std::fmt;

/// Validation result for a single check.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    /// Data is valid.
    Valid,
    /// Data has minor issues.
    Warning(String),
    /// Data has serious issues.
    Error(String),
}

impl ValidationLevel {
    /// Check if this result indicates valid data.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationLevel::Valid)
    }

    /// Check if this result is a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, ValidationLevel::Warning(_))
    }

    /// Check if this result is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, ValidationLevel::Error(_))
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationLevel::Valid => write!(f, "Valid"),
            ValidationLevel::Warning(msg) => write!(f, "Warning: {msg}"),
            ValidationLevel::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

/// Aggregated validation result.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    results: Vec<(String, ValidationLevel)>,
}

impl ValidationResult {
    /// Create a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation result.
    pub fn add(&mut self, check_name: &str, level: ValidationLevel) {
        self.results.push((check_name.to_string(), level));
    }

    /// Check if all validations passed (no errors or warnings).
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|(_, level)| level.is_valid())
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|(_, level)| level.is_error())
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        self.results.iter().any(|(_, level)| level.is_warning())
    }

    /// Get all warnings.
    pub fn warnings(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(name, level)| match level {
                ValidationLevel::Warning(msg) => Some(format!("{name}: {msg}")),
                _ => None,
            })
            .collect()
    }

    /// Get all errors.
    pub fn errors(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(name, level)| match level {
                ValidationLevel::Error(msg) => Some(format!("{name}: {msg}")),
                _ => None,
            })
            .collect()
    }

    /// Get all results.
    pub fn all_results(&self) -> &[(String, ValidationLevel)] {
        &self.results
    }

    /// Get the number of checks performed.
    pub fn check_count(&self) -> usize {
        self.results.len()
    }

    /// Get the number of passed checks.
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|(_, l)| l.is_valid()).count()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.passed_count();
        let total = self.check_count();
        writeln!(f, "Validation: {passed}/{total} checks passed")?;

        for (name, level) in &self.results {
            if !level.is_valid() {
                writeln!(f, "  - {name}: {level}")?;
            }
        }
        Ok(())
    }
}

/// Run all sanity checks over a tick slice.
///
/// Checks performed:
/// 1. **timestamp_ordering**: timestamps never decrease (equal is allowed)
/// 2. **price_range**: prices are finite and non-negative; an exactly-zero
///    price is a warning (it degenerates dollar thresholds)
/// 3. **volume_range**: volumes are finite and non-negative; an all-zero
///    stream is a warning (it degenerates volume/dollar thresholds)
pub fn validate_ticks(ticks: &[Tick]) -> ValidationResult {
    let mut result = ValidationResult::new();

    if ticks.is_empty() {
        result.add(
            "input",
            ValidationLevel::Warning("empty tick sequence".to_string()),
        );
        return result;
    }

    // Check 1: timestamp ordering
    let mut ordering = ValidationLevel::Valid;
    for (i, pair) in ticks.windows(2).enumerate() {
        if pair[1].timestamp_ns < pair[0].timestamp_ns {
            ordering = ValidationLevel::Error(format!(
                "timestamp decreases at index {}: {} -> {}",
                i + 1,
                pair[0].timestamp_ns,
                pair[1].timestamp_ns
            ));
            break;
        }
    }
    result.add("timestamp_ordering", ordering);

    // Check 2: price range
    let mut price_level = ValidationLevel::Valid;
    for (i, tick) in ticks.iter().enumerate() {
        if !tick.price.is_finite() || tick.price < 0.0 {
            price_level =
                ValidationLevel::Error(format!("invalid price {} at index {i}", tick.price));
            break;
        }
        if tick.price == 0.0 && price_level.is_valid() {
            price_level = ValidationLevel::Warning(format!(
                "zero price at index {i} degenerates dollar thresholds"
            ));
        }
    }
    result.add("price_range", price_level);

    // Check 3: volume range
    let mut volume_level = ValidationLevel::Valid;
    for (i, tick) in ticks.iter().enumerate() {
        if !tick.volume.is_finite() || tick.volume < 0.0 {
            volume_level =
                ValidationLevel::Error(format!("invalid volume {} at index {i}", tick.volume));
            break;
        }
    }
    if volume_level.is_valid() && ticks.iter().all(|t| t.volume == 0.0) {
        volume_level = ValidationLevel::Warning(
            "all volumes are zero; volume/dollar thresholds degenerate".to_string(),
        );
    }
    result.add("volume_range", volume_level);

    result
}

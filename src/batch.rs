//! Parallel batch sampling across independent configurations.
//!
//! The sampling algorithm itself is strictly single-pass and
//! single-threaded, but independent configurations (different bar types,
//! modes or targets) over the same tick stream share nothing: each run owns
//! its sampler and state. This module fans such runs out over Rayon's
//! work-stealing thread pool with no coordination beyond collecting
//! results.
//!
//! # Thread Safety
//!
//! - No shared mutable state between threads
//! - Each thread builds its own `BarSampler` from a cloned configuration
//! - Results are collected via Rayon's parallel iterator in input order
//!
//! # Example
//!
//! ```
//! use bar_sampler::{BarType, BatchRunner, SamplerConfig, Tick};
//!
//! let ticks: Vec<Tick> = (0..100)
//!     .map(|i| Tick::new(i * 1_000, 100.0 + (i % 7) as f64, 10.0))
//!     .collect();
//!
//! let runner = BatchRunner::new(vec![
//!     SamplerConfig::fixed(BarType::Tick, 10.0),
//!     SamplerConfig::fixed(BarType::Volume, 10.0),
//!     SamplerConfig::imbalance(BarType::Dollar, 5.0),
//! ]);
//!
//! let output = runner.run(&ticks);
//! assert_eq!(output.successful_count(), 3);
//! ```

use crate::config::SamplerConfig;
use crate::error::Result;
use crate::sampling::BarSampler;
use crate::types::Tick;
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Batch execution settings.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Number of worker threads. `None` uses the global Rayon pool.
    pub num_threads: Option<usize>,
}

impl BatchConfig {
    /// Create a new batch configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the number of worker threads.
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }
}

/// Result of one configuration's run.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// The configuration that produced this item.
    pub config: SamplerConfig,

    /// Emitted bar boundaries (indices into the tick slice).
    pub boundaries: Vec<usize>,
}

impl BatchItem {
    /// Number of bars produced by this run.
    #[inline]
    pub fn bar_count(&self) -> usize {
        self.boundaries.len()
    }
}

/// Aggregated output of a batch run.
#[derive(Debug)]
pub struct BatchOutput {
    /// Per-configuration results, in input order. A failed run keeps its
    /// slot so callers can correlate errors with configurations.
    pub items: Vec<Result<BatchItem>>,

    /// Wall-clock time for the whole batch.
    pub elapsed: Duration,

    /// Length of the tick slice each run scanned.
    pub ticks_processed: usize,
}

impl BatchOutput {
    /// Number of runs that completed successfully.
    pub fn successful_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_ok()).count()
    }

    /// Number of runs that failed.
    pub fn failed_count(&self) -> usize {
        self.items.len() - self.successful_count()
    }

    /// Total bars produced across all successful runs.
    pub fn total_bars(&self) -> usize {
        self.items
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .map(BatchItem::bar_count)
            .sum()
    }

    /// Aggregate scan throughput in ticks per second (ticks × runs / wall
    /// time).
    pub fn throughput_ticks_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        (self.ticks_processed * self.items.len()) as f64 / secs
    }

    /// Render a console summary of the batch.
    pub fn print_summary(&self) {
        println!("═══════════════════════════════════════════════════════════════");
        println!("Batch Sampling Complete");
        println!("═══════════════════════════════════════════════════════════════");
        println!("  Runs succeeded:  {}", self.successful_count());
        println!("  Runs failed:     {}", self.failed_count());
        println!("  Ticks per run:   {}", self.ticks_processed);
        println!("  Total bars:      {}", self.total_bars());
        println!("  Total time:      {:?}", self.elapsed);
        println!(
            "  Throughput:      {:.2} ticks/sec",
            self.throughput_ticks_per_sec()
        );
        println!("═══════════════════════════════════════════════════════════════");
    }
}

/// Parallel runner for a set of sampler configurations.
pub struct BatchRunner {
    configs: Vec<SamplerConfig>,
    batch_config: BatchConfig,
}

impl BatchRunner {
    /// Create a runner over the given configurations, using the global
    /// thread pool.
    pub fn new(configs: Vec<SamplerConfig>) -> Self {
        Self {
            configs,
            batch_config: BatchConfig::default(),
        }
    }

    /// Override batch execution settings.
    pub fn with_batch_config(mut self, batch_config: BatchConfig) -> Self {
        self.batch_config = batch_config;
        self
    }

    /// Run every configuration over the tick slice in parallel.
    ///
    /// One failed configuration does not abort the others; its error is
    /// kept in the corresponding output slot.
    pub fn run(&self, ticks: &[Tick]) -> BatchOutput {
        let start = Instant::now();

        let exec = || {
            self.configs
                .par_iter()
                .map(|config| {
                    let mut sampler = BarSampler::from_config(config.clone())?;
                    let boundaries = sampler.sample(ticks)?;
                    Ok(BatchItem {
                        config: config.clone(),
                        boundaries,
                    })
                })
                .collect::<Vec<Result<BatchItem>>>()
        };

        let items = match self.batch_config.num_threads {
            Some(num_threads) => {
                match rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                {
                    Ok(pool) => pool.install(exec),
                    Err(e) => {
                        log::warn!("failed to build thread pool ({e}); using global pool");
                        exec()
                    }
                }
            }
            None => exec(),
        };

        BatchOutput {
            items,
            elapsed: start.elapsed(),
            ticks_processed: ticks.len(),
        }
    }
}

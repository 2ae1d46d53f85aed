// Copyright 2024-2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reporting of the benchmark results.

use crate::{Measurement, Method};
use std::fmt::{self, Display};
use std::num::NonZeroUsize;

/// Minimum and maximum number of blocks completed by a single worker thread.
///
/// A large spread indicates that some workers completed far fewer blocks than
/// others, e.g. because they were preempted, migrated or ran on slower CPUs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadBalance {
    /// Smallest number of blocks completed by a worker.
    pub min: usize,
    /// Largest number of blocks completed by a worker.
    pub max: usize,
}

impl LoadBalance {
    /// Computes the spread of the given per-worker counts, or returns [`None`]
    /// if there are no workers.
    pub fn from_counts(counts: &[usize]) -> Option<Self> {
        let min = counts.iter().copied().min()?;
        let max = counts.iter().copied().max()?;
        Some(Self { min, max })
    }
}

/// Result of a benchmark run, formatted as one line of comma-separated values.
///
/// ```
/// # use min_array_bench::{LoadBalance, Measurement, Method, Report};
/// # use std::num::NonZeroUsize;
/// # use std::time::Duration;
/// let report = Report {
///     method: Method::Farming,
///     num_threads: NonZeroUsize::try_from(4).unwrap(),
///     migration_allowed: false,
///     measurement: Measurement {
///         mean_elapsed: Duration::from_micros(12_345),
///         load_balance: Some(LoadBalance { min: 12_000, max: 12_500 }),
///     },
/// };
/// assert_eq!(report.to_string(), "farming,4,0,0.012345,12000,12500");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    /// Strategy that was measured.
    pub method: Method,
    /// Number of worker threads.
    pub num_threads: NonZeroUsize,
    /// Whether threads were allowed to migrate across CPUs.
    pub migration_allowed: bool,
    /// Aggregated statistics.
    pub measurement: Measurement,
}

impl Display for Report {
    /// Writes `method,threads,migration,seconds`, followed by
    /// `,min_blocks,max_blocks` when the load balance is known.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{:.6}",
            self.method,
            self.num_threads,
            u8::from(self.migration_allowed),
            self.measurement.mean_elapsed.as_secs_f64()
        )?;
        if let Some(balance) = self.measurement.load_balance {
            write!(f, ",{},{}", balance.min, balance.max)?;
        }
        Ok(())
    }
}

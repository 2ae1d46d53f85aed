// Copyright 2024-2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Timed trials of the element-wise minimum over freshly spawned threads.

use super::affinity::{pin_current_thread, CpuPinningPolicy, CPU_PINNING_SUPPORTED};
use super::dataset::{Dataset, MinKernel};
use super::range::{
    BlockLayout, BlockRangeFactory, CyclicRangeFactory, FarmingRangeFactory, Range, RangeFactory,
    RangeOrchestrator,
};
use crate::error::Error;
use crate::macros::{log_debug, log_error, log_warn};
use crate::report::LoadBalance;
use std::fmt::{self, Display};
use std::num::NonZeroUsize;
use std::thread::{Scope, ScopedJoinHandle};
use std::time::{Duration, Instant};

/// Strategy to distribute the output indices among worker threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Worker `id` processes the items `id`, `id + num_threads`,
    /// `id + 2 * num_threads`, etc.
    Cyclic,
    /// Worker `id` processes the blocks `id`, `id + num_threads`,
    /// `id + 2 * num_threads`, etc.
    Block,
    /// Workers claim the next unprocessed block from a shared counter until
    /// all the blocks are claimed.
    Farming,
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Cyclic => "cyclic",
            Method::Block => "block",
            Method::Farming => "farming",
        })
    }
}

/// Statistics aggregated over all the trials of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measurement {
    /// Arithmetic mean of the elapsed time of each trial.
    pub mean_elapsed: Duration,
    /// Spread of completed blocks among the workers in the last trial. Only
    /// available for the [`Method::Farming`] strategy.
    pub load_balance: Option<LoadBalance>,
}

/// Runs a number of timed trials of the element-wise minimum over a
/// [`Dataset`].
///
/// ```
/// # use min_array_bench::{CpuPinningPolicy, Dataset, Method, TrialRunner};
/// # use std::num::NonZeroUsize;
/// let runner = TrialRunner {
///     num_threads: NonZeroUsize::try_from(4).unwrap(),
///     method: Method::Farming,
///     cpu_pinning: CpuPinningPolicy::No,
///     block_size: NonZeroUsize::try_from(16).unwrap(),
///     num_trials: NonZeroUsize::try_from(3).unwrap(),
/// };
///
/// let mut dataset = Dataset::new(1000).unwrap();
/// let measurement = runner.run(&mut dataset).unwrap();
/// assert_eq!(dataset.output()[10], 10.0);
/// assert_eq!(dataset.output()[990], 10.0);
///
/// // 63 blocks of 16 items, the last one being truncated.
/// let balance = measurement.load_balance.unwrap();
/// assert!(balance.min <= balance.max && balance.max <= 63);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrialRunner {
    /// Number of worker threads to spawn in each trial.
    pub num_threads: NonZeroUsize,
    /// Strategy to distribute items among threads.
    pub method: Method,
    /// Policy to pin worker threads to CPUs.
    pub cpu_pinning: CpuPinningPolicy,
    /// Number of items per block, for the block-based strategies.
    pub block_size: NonZeroUsize,
    /// Number of back-to-back trials to average.
    pub num_trials: NonZeroUsize,
}

impl TrialRunner {
    /// Runs all the trials over the given dataset, overwriting its output
    /// array, and returns the aggregated statistics.
    ///
    /// Fails as soon as a worker thread cannot be spawned or panics, in which
    /// case no statistics are returned.
    pub fn run(&self, dataset: &mut Dataset) -> Result<Measurement, Error> {
        let layout = BlockLayout::new(dataset.len(), self.block_size);
        let num_threads = self.num_threads.get();
        log_debug!(
            "[main thread] Running {} trials of the {} method on {} elements ({} blocks) with {num_threads} threads",
            self.num_trials,
            self.method,
            layout.num_elements(),
            layout.num_blocks()
        );

        if self.cpu_pinning == CpuPinningPolicy::IfSupported && !CPU_PINNING_SUPPORTED {
            log_warn!("Pinning threads to CPUs is not implemented on this platform.");
        }

        match self.method {
            Method::Cyclic => {
                self.run_with_factory(CyclicRangeFactory::new(num_threads, layout), dataset)
            }
            Method::Block => {
                self.run_with_factory(BlockRangeFactory::new(num_threads, layout), dataset)
            }
            Method::Farming => {
                self.run_with_factory(FarmingRangeFactory::new(num_threads, layout), dataset)
            }
        }
    }

    fn run_with_factory<F: RangeFactory>(
        &self,
        range_factory: F,
        dataset: &mut Dataset,
    ) -> Result<Measurement, Error>
    where
        F::Range: Sync,
    {
        let ranges = (0..self.num_threads.get())
            .map(|id| range_factory.range(id))
            .collect::<Vec<_>>();
        let range_orchestrator = range_factory.orchestrator();

        let mut timings = Timings::default();
        for _trial in 0..self.num_trials.get() {
            // The orchestrator's shared state must be reset before spawning the workers.
            range_orchestrator.reset_ranges();

            let kernel = dataset.kernel();
            let start = Instant::now();
            std::thread::scope(|scope| run_trial(scope, &ranges, &kernel, self.cpu_pinning))?;
            let elapsed = start.elapsed();

            log_debug!("[main thread] Trial #{_trial} took {elapsed:?}");
            timings.record(elapsed);
        }

        #[cfg(feature = "log_parallelism")]
        range_orchestrator.print_statistics();

        Ok(Measurement {
            mean_elapsed: timings.mean(),
            load_balance: range_orchestrator.load_balance(),
        })
    }
}

/// Spawns one worker per range and waits for all of them to finish.
fn run_trial<'scope, R: Range + Sync>(
    scope: &'scope Scope<'scope, '_>,
    ranges: &'scope [R],
    kernel: &'scope MinKernel<'_>,
    cpu_pinning: CpuPinningPolicy,
) -> Result<(), Error> {
    let mut handles = Vec::with_capacity(ranges.len());
    let mut spawned = Ok(());
    for (id, range) in ranges.iter().enumerate() {
        let context = ThreadContext {
            id,
            range,
            kernel,
            cpu_pinning,
        };
        let handle = std::thread::Builder::new()
            .name(format!("worker-{id}"))
            .spawn_scoped(scope, move || context.run());
        match handle {
            Ok(handle) => handles.push(handle),
            Err(source) => {
                log_error!("[main thread] Failed to spawn thread #{id}: {source}");
                spawned = Err(Error::Spawn { id, source });
                break;
            }
        }
    }
    log_debug!("[main thread] Spawned {} threads", handles.len());

    join_workers(handles, spawned)
}

/// Joins all the given workers, then returns the first error: either the
/// `spawned` error or the first worker panic.
///
/// Every handle is joined before returning, so that the enclosing scope never
/// propagates a worker panic itself.
fn join_workers(
    handles: Vec<ScopedJoinHandle<'_, ()>>,
    spawned: Result<(), Error>,
) -> Result<(), Error> {
    let mut result = spawned;
    for (id, handle) in handles.into_iter().enumerate() {
        if handle.join().is_err() {
            log_error!("[main thread] Thread {id} panicked");
            if result.is_ok() {
                result = Err(Error::WorkerPanic { id });
            }
        }
    }
    log_debug!("[main thread] Joined threads.");
    result
}

/// Context object owned by a worker thread.
struct ThreadContext<'scope, 'data, R: Range> {
    /// Thread index.
    id: usize,
    /// Range of items that this worker thread needs to process.
    range: &'scope R,
    /// Element-wise minimum to compute on each item.
    kernel: &'scope MinKernel<'data>,
    /// Policy to pin this thread to a CPU.
    cpu_pinning: CpuPinningPolicy,
}

impl<R: Range> ThreadContext<'_, '_, R> {
    /// Main function run by this thread.
    fn run(self) {
        pin_current_thread(self.id, self.cpu_pinning);
        for i in self.range.iter() {
            // SAFETY: Due to the safety guarantees of `RangeFactory`, each index in
            // `0..num_elements` is yielded by exactly one range, once, in this trial.
            // The kernel lives only for the duration of the trial.
            unsafe {
                self.kernel.process_index(i);
            }
        }
    }
}

/// Accumulator of the elapsed time of each trial.
#[derive(Default)]
struct Timings {
    /// Sum of the elapsed times.
    total: Duration,
    /// Number of recorded trials.
    count: usize,
}

impl Timings {
    /// Records the elapsed time of one trial.
    fn record(&mut self, elapsed: Duration) {
        self.total += elapsed;
        self.count += 1;
    }

    /// Returns the arithmetic mean of the recorded times, or zero if nothing
    /// was recorded.
    fn mean(&self) -> Duration {
        match u32::try_from(self.count) {
            Ok(count) => self.total.checked_div(count).unwrap_or_default(),
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.count as f64),
        }
    }
}

// Copyright 2024-2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Strategies to partition the output indices among worker threads.

use crate::macros::log_debug;
#[cfg(feature = "log_parallelism")]
use crate::macros::{log_info, log_trace};
use crate::report::LoadBalance;
use crossbeam_utils::CachePadded;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Geometry of an array of `num_elements` items split into consecutive blocks
/// of `block_size` items. The last block is truncated to the end of the array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockLayout {
    /// Total number of items.
    num_elements: usize,
    /// Number of items in each block (except possibly the last one).
    block_size: usize,
}

impl BlockLayout {
    /// Creates a layout for the given number of items and block size.
    pub fn new(num_elements: usize, block_size: NonZeroUsize) -> Self {
        Self {
            num_elements,
            block_size: block_size.get(),
        }
    }

    /// Returns the total number of items.
    pub fn num_elements(self) -> usize {
        self.num_elements
    }

    /// Returns the number of blocks, counting a truncated last block.
    pub fn num_blocks(self) -> usize {
        self.num_elements.div_ceil(self.block_size)
    }

    /// Returns the range of items covered by the given block. The end of the
    /// last block is clamped to the number of items.
    #[inline(always)]
    pub fn block(self, index: usize) -> std::ops::Range<usize> {
        debug_assert!(index < self.num_blocks());
        let start = index * self.block_size;
        let end = start.saturating_add(self.block_size).min(self.num_elements);
        start..end
    }
}

/// A factory for handing out ranges of output indices to worker threads.
///
/// # Safety
///
/// Implementers of the [`RangeFactory`] must guarantee the following contract.
///
/// Given a number of threads `num_threads`, a layout `layout` and a factory
/// created by `RangeFactory::new(num_threads, layout)`, from which are derived
/// `num_threads` ranges as `(0..num_threads).map(|i| factory.range(i))` and an
/// orchestrator as `factory.orchestrator()`:
///
/// - after calling `orchestrator.reset_ranges()`, calling `range.iter()` once
///   on every range and exhausting the resulting iterators (possibly
///   concurrently) yields each index in `0..layout.num_elements()` once and
///   only once across all the iterators, and never any other index.
pub trait RangeFactory {
    type Range: Range;
    type Orchestrator: RangeOrchestrator;

    /// Creates a new factory for the given layout split across the given
    /// number of threads.
    fn new(num_threads: usize, layout: BlockLayout) -> Self;

    /// Returns the orchestrator object for all the ranges created by this
    /// factory.
    fn orchestrator(self) -> Self::Orchestrator;

    /// Returns the range for the given thread.
    fn range(&self, thread_id: usize) -> Self::Range;
}

/// An orchestrator for the ranges given to all the threads.
pub trait RangeOrchestrator {
    /// Resets all the shared state of the ranges to prepare a new trial.
    ///
    /// The caller must ensure that this happens before any call to
    /// [`Range::iter()`] for the trial.
    fn reset_ranges(&self);

    /// Returns the spread of completed blocks among threads during the last
    /// trial. This is only available for strategies that distribute work
    /// dynamically.
    fn load_balance(&self) -> Option<LoadBalance> {
        None
    }

    /// Hook to display various debugging statistics.
    #[cfg(feature = "log_parallelism")]
    fn print_statistics(&self) {}
}

/// The subset of output indices processed by one worker thread.
pub trait Range {
    /// Type of iterator returned by [`iter()`](Self::iter).
    type Iter<'a>: Iterator<Item = usize>
    where
        Self: 'a;

    /// Returns an iterator over the indices that this thread must process in
    /// the current trial.
    fn iter(&self) -> Self::Iter<'_>;
}

/// An orchestrator for strategies whose assignment of indices is fully
/// determined in advance, and therefore has no state to reset.
pub struct StaticRangeOrchestrator;

impl RangeOrchestrator for StaticRangeOrchestrator {
    fn reset_ranges(&self) {}
}

/// A factory that deals single items to the threads in a round-robin fashion.
pub struct CyclicRangeFactory {
    /// Number of threads that iterate.
    num_threads: usize,
    /// Total number of items.
    num_elements: usize,
}

// Here is a proof that `CyclicRangeFactory` upholds the safety contract of
// `RangeFactory`.
//
// The range of thread `id` yields exactly the indices `i` in `0..num_elements`
// such that `i % num_threads == id`, in increasing order. Every index has
// exactly one remainder modulo `num_threads`, which is a valid thread index, so
// each index in `0..num_elements` is yielded by exactly one thread, exactly
// once.
impl RangeFactory for CyclicRangeFactory {
    type Range = CyclicRange;
    type Orchestrator = StaticRangeOrchestrator;

    fn new(num_threads: usize, layout: BlockLayout) -> Self {
        assert!(num_threads > 0, "cannot split work among zero threads");
        Self {
            num_threads,
            num_elements: layout.num_elements(),
        }
    }

    fn orchestrator(self) -> StaticRangeOrchestrator {
        StaticRangeOrchestrator
    }

    fn range(&self, thread_id: usize) -> CyclicRange {
        CyclicRange {
            id: thread_id,
            num_threads: self.num_threads,
            num_elements: self.num_elements,
        }
    }
}

/// Every `num_threads`-th item, starting at the thread's index.
pub struct CyclicRange {
    /// Index of the thread that owns this range.
    id: usize,
    /// Total number of threads.
    num_threads: usize,
    /// Total number of items.
    num_elements: usize,
}

impl Range for CyclicRange {
    type Iter<'a> = std::iter::StepBy<std::ops::Range<usize>>;

    fn iter(&self) -> Self::Iter<'_> {
        (self.id..self.num_elements).step_by(self.num_threads)
    }
}

/// A factory that deals whole blocks to the threads in a round-robin fashion.
pub struct BlockRangeFactory {
    /// Number of threads that iterate.
    num_threads: usize,
    /// Geometry of the blocks.
    layout: BlockLayout,
}

// Here is a proof that `BlockRangeFactory` upholds the safety contract of
// `RangeFactory`.
//
// The blocks `layout.block(b)` for `b` in `0..num_blocks` are consecutive and
// non-empty, start at 0 and end at `num_elements` (the last one being clamped),
// so they partition `0..num_elements`. The range of thread `id` visits exactly
// the blocks `b` such that `b % num_threads == id` and yields all the items of
// each visited block. By the same argument as for `CyclicRangeFactory`, each
// block is visited by exactly one thread, exactly once.
impl RangeFactory for BlockRangeFactory {
    type Range = BlockRange;
    type Orchestrator = StaticRangeOrchestrator;

    fn new(num_threads: usize, layout: BlockLayout) -> Self {
        assert!(num_threads > 0, "cannot split work among zero threads");
        Self {
            num_threads,
            layout,
        }
    }

    fn orchestrator(self) -> StaticRangeOrchestrator {
        StaticRangeOrchestrator
    }

    fn range(&self, thread_id: usize) -> BlockRange {
        BlockRange {
            id: thread_id,
            num_threads: self.num_threads,
            layout: self.layout,
        }
    }
}

/// Every `num_threads`-th block, starting at the thread's index.
pub struct BlockRange {
    /// Index of the thread that owns this range.
    id: usize,
    /// Total number of threads.
    num_threads: usize,
    /// Geometry of the blocks.
    layout: BlockLayout,
}

impl Range for BlockRange {
    type Iter<'a> = BlockRangeIterator;

    fn iter(&self) -> Self::Iter<'_> {
        BlockRangeIterator {
            layout: self.layout,
            num_blocks: self.layout.num_blocks(),
            next_block: self.id,
            stride: self.num_threads,
            current: 0..0,
        }
    }
}

/// Iterator over the items of a [`BlockRange`].
pub struct BlockRangeIterator {
    /// Geometry of the blocks.
    layout: BlockLayout,
    /// Cached number of blocks in the layout.
    num_blocks: usize,
    /// Next block to visit once the current one is exhausted.
    next_block: usize,
    /// Distance between two blocks visited by this thread.
    stride: usize,
    /// Remaining items of the current block.
    current: std::ops::Range<usize>,
}

impl Iterator for BlockRangeIterator {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        loop {
            if let Some(index) = self.current.next() {
                return Some(index);
            }
            if self.next_block >= self.num_blocks {
                return None;
            }
            self.current = self.layout.block(self.next_block);
            self.next_block = self.next_block.saturating_add(self.stride);
        }
    }
}

/// A factory for ranges that pull blocks on demand from a shared counter
/// ("farming"), until all the blocks have been handed out.
pub struct FarmingRangeFactory {
    /// Geometry of the blocks.
    layout: BlockLayout,
    /// State shared among all the threads.
    farm: Arc<Farm>,
}

/// State shared by all the threads of a farming run.
struct Farm {
    /// Index of the next block to hand out. Each thread's last claim finds no
    /// more work, so after a trial this overshoots the number of blocks by the
    /// number of threads.
    next_block: CachePadded<AtomicUsize>,
    /// Number of blocks completed by each thread in the current trial.
    completed: Box<[CachePadded<AtomicUsize>]>,
}

impl Farm {
    /// Claims the next block that no thread has claimed yet, or returns
    /// [`None`] if all the blocks have been handed out.
    #[inline(always)]
    fn claim(&self, num_blocks: usize) -> Option<usize> {
        // The read-modify-write is the whole critical section: the claimed index
        // is only validated against the number of blocks afterwards.
        let block = self.next_block.fetch_add(1, Ordering::Relaxed);
        (block < num_blocks).then_some(block)
    }
}

// Here is a proof that `FarmingRangeFactory` upholds the safety contract of
// `RangeFactory`.
//
// Upon calling `FarmingRangeOrchestrator::reset_ranges()`, the shared counter
// is set to 0. This uses `Ordering::Relaxed`, which is fine because it's the
// caller's responsibility to ensure that `reset_ranges()` happens before any
// call to `range.iter()` (the trial runner spawns the worker threads after
// resetting).
//
// All claims go through a single `fetch_add(1)` on the counter. Atomic
// read-modify-write operations on one variable are totally ordered, so the
// claims return the successive values 0, 1, 2, ... each to exactly one caller,
// regardless of the memory ordering. A thread only yields the items of blocks
// it claimed with an index below `num_blocks`, and yields all of them before
// claiming again, so each block is processed at most once.
//
// Conversely, a thread stops only after a claim returned an index at or beyond
// `num_blocks`. The counter only grows, so all the smaller indices were handed
// out beforehand, each to a thread that processes it fully before stopping. So
// once all the threads are exhausted, every block has been processed exactly
// once, and the blocks partition `0..num_elements` as shown for
// `BlockRangeFactory`.
impl RangeFactory for FarmingRangeFactory {
    type Range = FarmingRange;
    type Orchestrator = FarmingRangeOrchestrator;

    fn new(num_threads: usize, layout: BlockLayout) -> Self {
        assert!(num_threads > 0, "cannot split work among zero threads");
        Self {
            layout,
            farm: Arc::new(Farm {
                next_block: CachePadded::new(AtomicUsize::new(0)),
                completed: (0..num_threads)
                    .map(|_| CachePadded::new(AtomicUsize::new(0)))
                    .collect(),
            }),
        }
    }

    fn orchestrator(self) -> FarmingRangeOrchestrator {
        FarmingRangeOrchestrator {
            #[cfg(feature = "log_parallelism")]
            num_blocks: self.layout.num_blocks(),
            farm: self.farm,
        }
    }

    fn range(&self, thread_id: usize) -> FarmingRange {
        FarmingRange {
            id: thread_id,
            layout: self.layout,
            farm: self.farm.clone(),
        }
    }
}

/// An orchestrator for the [`FarmingRangeFactory`].
pub struct FarmingRangeOrchestrator {
    /// Total number of blocks to hand out.
    #[cfg(feature = "log_parallelism")]
    num_blocks: usize,
    /// State shared among all the threads.
    farm: Arc<Farm>,
}

impl FarmingRangeOrchestrator {
    /// Returns the number of blocks completed by each thread in the last
    /// trial.
    ///
    /// The caller must ensure that all the threads of the trial have been
    /// joined, otherwise some counts may still be zero.
    fn blocks_completed(&self) -> Vec<usize> {
        self.farm
            .completed
            .iter()
            .map(|count| count.load(Ordering::Relaxed))
            .collect()
    }
}

impl RangeOrchestrator for FarmingRangeOrchestrator {
    fn reset_ranges(&self) {
        log_debug!(
            "Resetting the block counter and {} completion counters",
            self.farm.completed.len()
        );
        self.farm.next_block.store(0, Ordering::Relaxed);
        for count in self.farm.completed.iter() {
            count.store(0, Ordering::Relaxed);
        }
    }

    fn load_balance(&self) -> Option<LoadBalance> {
        LoadBalance::from_counts(&self.blocks_completed())
    }

    #[cfg(feature = "log_parallelism")]
    fn print_statistics(&self) {
        log_info!("Farming statistics:");
        log_info!("- blocks: {}", self.num_blocks);
        log_info!("- claims: {}", self.farm.next_block.load(Ordering::Relaxed));
        for (id, count) in self.blocks_completed().into_iter().enumerate() {
            log_info!("- thread #{id}: {count} blocks");
        }
    }
}

/// A range that pulls blocks from a shared counter.
pub struct FarmingRange {
    /// Index of the thread that owns this range.
    id: usize,
    /// Geometry of the blocks.
    layout: BlockLayout,
    /// State shared among all the threads.
    farm: Arc<Farm>,
}

impl Range for FarmingRange {
    type Iter<'a> = FarmingRangeIterator<'a>;

    fn iter(&self) -> Self::Iter<'_> {
        FarmingRangeIterator {
            id: self.id,
            layout: self.layout,
            num_blocks: self.layout.num_blocks(),
            farm: &self.farm,
            current: 0..0,
            in_block: false,
            completed: 0,
            exhausted: false,
        }
    }
}

/// Iterator over the items of a [`FarmingRange`].
///
/// The number of completed blocks is counted locally and published to the
/// shared state once, when the iterator runs out of blocks.
pub struct FarmingRangeIterator<'a> {
    /// Index of the thread that owns this iterator.
    id: usize,
    /// Geometry of the blocks.
    layout: BlockLayout,
    /// Cached number of blocks in the layout.
    num_blocks: usize,
    /// State shared among all the threads.
    farm: &'a Farm,
    /// Remaining items of the current block.
    current: std::ops::Range<usize>,
    /// Whether `current` comes from a claimed block.
    in_block: bool,
    /// Number of blocks fully yielded so far.
    completed: usize,
    /// Whether the shared counter ran out of blocks.
    exhausted: bool,
}

impl Iterator for FarmingRangeIterator<'_> {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        loop {
            if let Some(index) = self.current.next() {
                return Some(index);
            }
            if self.exhausted {
                return None;
            }
            if self.in_block {
                self.completed += 1;
                self.in_block = false;
            }
            match self.farm.claim(self.num_blocks) {
                Some(block) => {
                    #[cfg(feature = "log_parallelism")]
                    log_trace!("[thread {}] Claimed block {block}", self.id);
                    self.current = self.layout.block(block);
                    self.in_block = true;
                }
                None => {
                    // Published with `Ordering::Relaxed`: the trial runner only reads the
                    // counts after joining this thread.
                    self.farm.completed[self.id].store(self.completed, Ordering::Relaxed);
                    self.exhausted = true;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;

    fn make_layout(num_elements: usize, block_size: usize) -> BlockLayout {
        BlockLayout::new(num_elements, NonZeroUsize::try_from(block_size).unwrap())
    }

    /// Resets the ranges and exhausts them one after the other on the current
    /// thread.
    fn collect_sequential<F: RangeFactory>(
        num_threads: usize,
        layout: BlockLayout,
    ) -> Vec<Vec<usize>> {
        let factory = F::new(num_threads, layout);
        let ranges = (0..num_threads)
            .map(|i| factory.range(i))
            .collect::<Vec<_>>();
        factory.orchestrator().reset_ranges();
        ranges.iter().map(|range| range.iter().collect()).collect()
    }

    /// Checks that the given sets of indices are disjoint and cover exactly
    /// `0..num_elements`.
    fn assert_partition(values: &[Vec<usize>], num_elements: usize) {
        let mut all_values = vec![false; num_elements];
        for set in values {
            for &x in set {
                assert!(x < num_elements, "index {x} out of bounds");
                assert!(!all_values[x], "index {x} yielded twice");
                all_values[x] = true;
            }
        }
        assert!(all_values.iter().all(|x| *x));
    }

    #[test]
    fn test_block_layout() {
        let layout = make_layout(10, 4);
        assert_eq!(layout.num_blocks(), 3);
        assert_eq!(layout.block(0), 0..4);
        assert_eq!(layout.block(1), 4..8);
        assert_eq!(layout.block(2), 8..10);

        let layout = make_layout(8, 4);
        assert_eq!(layout.num_blocks(), 2);
        assert_eq!(layout.block(1), 4..8);

        let layout = make_layout(0, 4);
        assert_eq!(layout.num_blocks(), 0);
    }

    #[test]
    fn test_block_layout_block_sizes() {
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        for _ in 0..1000 {
            let num_elements = rng.random_range(1..100_000);
            let block_size = rng.random_range(1..5_000);
            let layout = make_layout(num_elements, block_size);
            let num_blocks = layout.num_blocks();
            for b in 0..num_blocks - 1 {
                assert_eq!(layout.block(b).len(), block_size);
            }
            let remainder = num_elements - block_size * (num_elements / block_size);
            let expected_last = if remainder != 0 {
                remainder
            } else {
                block_size
            };
            let last = layout.block(num_blocks - 1);
            assert_eq!(last.len(), expected_last);
            assert_eq!(last.end, num_elements);
        }
    }

    #[test]
    fn test_cyclic_range() {
        let values = collect_sequential::<CyclicRangeFactory>(3, make_layout(10, 4));
        assert_eq!(values, vec![vec![0, 3, 6, 9], vec![1, 4, 7], vec![2, 5, 8]]);
    }

    #[test]
    fn test_cyclic_range_is_congruent_to_thread_index() {
        let num_threads = 7;
        let values = collect_sequential::<CyclicRangeFactory>(num_threads, make_layout(1000, 16));
        for (id, set) in values.iter().enumerate() {
            assert_eq!(
                *set,
                (0..1000)
                    .filter(|i| i % num_threads == id)
                    .collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_cyclic_range_more_threads_than_elements() {
        let values = collect_sequential::<CyclicRangeFactory>(4, make_layout(2, 4));
        assert_eq!(values, vec![vec![0], vec![1], vec![], vec![]]);
    }

    #[test]
    fn test_block_range() {
        let values = collect_sequential::<BlockRangeFactory>(2, make_layout(8, 4));
        assert_eq!(values, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
    }

    #[test]
    fn test_block_range_truncates_last_block() {
        let values = collect_sequential::<BlockRangeFactory>(2, make_layout(10, 4));
        assert_eq!(values, vec![vec![0, 1, 2, 3, 8, 9], vec![4, 5, 6, 7]]);

        let values = collect_sequential::<BlockRangeFactory>(3, make_layout(10, 4));
        assert_eq!(values, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
    }

    #[test]
    fn test_block_range_more_threads_than_blocks() {
        let values = collect_sequential::<BlockRangeFactory>(4, make_layout(5, 4));
        assert_eq!(values, vec![vec![0, 1, 2, 3], vec![4], vec![], vec![]]);
    }

    #[test]
    fn test_farming_range_sequential() {
        // The first thread drains the whole counter before the others start.
        let values = collect_sequential::<FarmingRangeFactory>(3, make_layout(10, 4));
        assert_eq!(values, vec![(0..10).collect::<Vec<_>>(), vec![], vec![]]);
    }

    #[test]
    fn test_partitions_are_exhaustive_and_disjoint() {
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        for _ in 0..200 {
            let num_elements = rng.random_range(0..10_000);
            let block_size = rng.random_range(1..300);
            let num_threads = rng.random_range(1..10);
            let layout = make_layout(num_elements, block_size);

            let values = collect_sequential::<CyclicRangeFactory>(num_threads, layout);
            assert_partition(&values, num_elements);
            let values = collect_sequential::<BlockRangeFactory>(num_threads, layout);
            assert_partition(&values, num_elements);
            let values = collect_sequential::<FarmingRangeFactory>(num_threads, layout);
            assert_partition(&values, num_elements);
        }
    }

    #[test]
    fn test_static_orchestrator_has_no_load_balance() {
        let factory = BlockRangeFactory::new(4, make_layout(100, 8));
        let orchestrator = factory.orchestrator();
        orchestrator.reset_ranges();
        assert_eq!(orchestrator.load_balance(), None);
    }

    #[test]
    fn test_farming_range_multi_threaded() {
        const NUM_THREADS: usize = 4;
        #[cfg(not(miri))]
        const NUM_ELEMENTS: usize = 10000;
        #[cfg(miri)]
        const NUM_ELEMENTS: usize = 100;
        const BLOCK_SIZE: usize = 7;

        let layout = make_layout(NUM_ELEMENTS, BLOCK_SIZE);
        let num_blocks = layout.num_blocks();
        let factory = FarmingRangeFactory::new(NUM_THREADS, layout);
        let ranges: [_; NUM_THREADS] = std::array::from_fn(|i| factory.range(i));
        let orchestrator = factory.orchestrator();

        std::thread::scope(|s| {
            for _ in 0..10 {
                orchestrator.reset_ranges();
                let handles = ranges
                    .each_ref()
                    .map(|range| s.spawn(move || range.iter().collect::<Vec<_>>()));
                let values: [Vec<usize>; NUM_THREADS] =
                    handles.map(|handle| handle.join().unwrap());

                assert_partition(&values, NUM_ELEMENTS);

                // Claims are validated after the increment: each thread's last claim overshoots.
                assert_eq!(
                    orchestrator.farm.next_block.load(Ordering::Relaxed),
                    num_blocks + NUM_THREADS
                );

                let completed = orchestrator.blocks_completed();
                assert_eq!(completed.iter().sum::<usize>(), num_blocks);
                // Only the thread that processed the last block gets a truncated block.
                let padding = num_blocks * BLOCK_SIZE - NUM_ELEMENTS;
                for (set, &count) in values.iter().zip(&completed) {
                    let truncated = if set.contains(&(NUM_ELEMENTS - 1)) {
                        padding
                    } else {
                        0
                    };
                    assert_eq!(set.len(), count * BLOCK_SIZE - truncated);
                }
            }
        });
    }

    #[test]
    fn test_farming_load_balance() {
        // 5 blocks split between 2 threads.
        let layout = make_layout(20, 4);
        let factory = FarmingRangeFactory::new(2, layout);
        let ranges: [_; 2] = std::array::from_fn(|i| factory.range(i));
        let orchestrator = factory.orchestrator();

        for _ in 0..10 {
            orchestrator.reset_ranges();
            std::thread::scope(|s| {
                for range in &ranges {
                    s.spawn(move || range.iter().count());
                }
            });
            let balance = orchestrator.load_balance().unwrap();
            assert!(balance.min <= balance.max);
            assert!(balance.max <= 5);
            assert_eq!(balance.min + balance.max, 5);
        }
    }

    #[test]
    fn test_farming_reset_clears_counters() {
        let factory = FarmingRangeFactory::new(3, make_layout(100, 10));
        let ranges: [_; 3] = std::array::from_fn(|i| factory.range(i));
        let orchestrator = factory.orchestrator();

        orchestrator.reset_ranges();
        assert_eq!(ranges[1].iter().count(), 100);
        assert_eq!(orchestrator.blocks_completed(), vec![0, 10, 0]);
        assert_eq!(
            orchestrator.load_balance(),
            Some(LoadBalance { min: 0, max: 10 })
        );

        orchestrator.reset_ranges();
        assert_eq!(orchestrator.farm.next_block.load(Ordering::Relaxed), 0);
        assert_eq!(orchestrator.blocks_completed(), vec![0, 0, 0]);

        assert_eq!(ranges[2].iter().count(), 100);
        assert_eq!(orchestrator.blocks_completed(), vec![0, 0, 10]);
    }

    #[test]
    fn test_farming_iterator_stays_exhausted() {
        let factory = FarmingRangeFactory::new(1, make_layout(10, 4));
        let range = factory.range(0);
        let orchestrator = factory.orchestrator();
        orchestrator.reset_ranges();

        let mut iter = range.iter();
        assert_eq!(iter.by_ref().count(), 10);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
        // Only one unsuccessful claim was made.
        assert_eq!(orchestrator.farm.next_block.load(Ordering::Relaxed), 4);
        assert_eq!(orchestrator.blocks_completed(), vec![3]);
    }
}

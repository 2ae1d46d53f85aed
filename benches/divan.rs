// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

fn main() {
    divan::main();
}

const NUM_THREADS: &[usize] = &[1, 2, 4, 8];
const LENGTHS: &[usize] = &[10_000, 100_000, 1_000_000];

/// Baseline benchmark using serial iterators (without any multi-threading
/// involved).
mod serial {
    use super::LENGTHS;
    use divan::counter::BytesCount;
    use divan::{black_box, Bencher};

    #[divan::bench(args = LENGTHS)]
    fn min(bencher: Bencher, len: usize) {
        let left = (0..len).map(|i| i as f64).collect::<Vec<f64>>();
        let right = (0..len).map(|i| (len - i) as f64).collect::<Vec<f64>>();
        let mut output = vec![0.0; len];

        let left_slice = left.as_slice();
        let right_slice = right.as_slice();
        let output_slice = output.as_mut_slice();

        bencher
            .counter(BytesCount::of_many::<f64>(len * 3))
            .bench_local(|| {
                black_box(left_slice)
                    .iter()
                    .zip(black_box(right_slice))
                    .zip(black_box(output_slice.iter_mut()))
                    .for_each(|((&a, &b), out)| *out = if a < b { a } else { b })
            })
    }
}

/// Benchmarks of a single trial of each method, spawning fresh threads on each
/// iteration.
mod trials {
    use super::{LENGTHS, NUM_THREADS};
    use divan::counter::BytesCount;
    use divan::{black_box, Bencher};
    use min_array_bench::{CpuPinningPolicy, Dataset, Method, TrialRunner, DEFAULT_BLOCK_SIZE};
    use std::num::NonZeroUsize;

    fn run<const NUM_THREADS: usize>(
        bencher: Bencher,
        len: usize,
        method: Method,
        cpu_pinning: CpuPinningPolicy,
    ) {
        let mut dataset = Dataset::new(len).unwrap();
        let runner = TrialRunner {
            num_threads: NonZeroUsize::try_from(NUM_THREADS).unwrap(),
            method,
            cpu_pinning,
            block_size: DEFAULT_BLOCK_SIZE,
            num_trials: NonZeroUsize::MIN,
        };
        bencher
            .counter(BytesCount::of_many::<f64>(len * 3))
            .bench_local(|| black_box(runner.run(black_box(&mut dataset)).unwrap()))
    }

    #[divan::bench(consts = NUM_THREADS, args = LENGTHS)]
    fn cyclic<const NUM_THREADS: usize>(bencher: Bencher, len: usize) {
        run::<NUM_THREADS>(bencher, len, Method::Cyclic, CpuPinningPolicy::No)
    }

    #[divan::bench(consts = NUM_THREADS, args = LENGTHS)]
    fn block<const NUM_THREADS: usize>(bencher: Bencher, len: usize) {
        run::<NUM_THREADS>(bencher, len, Method::Block, CpuPinningPolicy::No)
    }

    #[divan::bench(consts = NUM_THREADS, args = LENGTHS)]
    fn farming<const NUM_THREADS: usize>(bencher: Bencher, len: usize) {
        run::<NUM_THREADS>(bencher, len, Method::Farming, CpuPinningPolicy::No)
    }

    #[divan::bench(consts = NUM_THREADS, args = LENGTHS)]
    fn farming_pinned<const NUM_THREADS: usize>(bencher: Bencher, len: usize) {
        run::<NUM_THREADS>(bencher, len, Method::Farming, CpuPinningPolicy::IfSupported)
    }
}

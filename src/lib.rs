// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![doc = include_str!("../README.md")]
#![forbid(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

mod core;
mod error;
mod macros;
mod report;

use std::num::NonZeroUsize;

pub use crate::core::{
    CpuPinningPolicy, Dataset, Measurement, Method, TrialRunner, CPU_PINNING_SUPPORTED,
};
pub use error::Error;
pub use report::{LoadBalance, Report};

/// Default number of elements in each array.
pub const DEFAULT_ARRAY_SIZE: usize = 100_000_000;

/// Default number of elements per block, for the block-based strategies.
pub const DEFAULT_BLOCK_SIZE: NonZeroUsize = non_zero(2048);

/// Default number of trials to average.
pub const DEFAULT_NUM_TRIALS: NonZeroUsize = non_zero(10);

const fn non_zero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("value must be non-zero"),
    }
}

// Copyright 2024-2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Core engine: dataset, partition strategies, CPU pinning and timed trials.

mod affinity;
mod dataset;
mod range;
mod trial;

pub use affinity::{CpuPinningPolicy, CPU_PINNING_SUPPORTED};
pub use dataset::Dataset;
pub use trial::{Measurement, Method, TrialRunner};

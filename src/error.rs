// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::TryReserveError;
use thiserror::Error;

/// Fatal errors that abort a benchmark run.
///
/// Failing to pin a worker thread to a CPU is deliberately absent: it is
/// logged as a warning and the worker continues unpinned.
#[derive(Debug, Error)]
pub enum Error {
    /// One of the arrays of the [`Dataset`](crate::Dataset) couldn't be
    /// allocated.
    #[error("failed to allocate {len} elements for array {array}")]
    Allocation {
        /// Name of the array that failed to allocate.
        array: &'static str,
        /// Requested number of elements.
        len: usize,
        /// Underlying allocation error.
        #[source]
        source: TryReserveError,
    },
    /// The operating system refused to spawn a worker thread.
    #[error("failed to spawn worker thread #{id}")]
    Spawn {
        /// Index of the worker that couldn't be spawned.
        id: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A worker thread panicked during a trial.
    #[error("worker thread #{id} panicked")]
    WorkerPanic {
        /// Index of the worker that panicked.
        id: usize,
    },
}

// Copyright 2024-2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Input and output arrays of the element-wise minimum.

use crate::error::Error;
use crate::macros::log_debug;
use std::marker::PhantomData;

/// Two input arrays and one output array of the same length, allocated and
/// initialized once before any trial.
///
/// The inputs are `left[i] = i` and `right[i] = len - i`, so that the output
/// of the element-wise minimum is a "tent" rising up to the middle of the
/// array and falling back.
///
/// ```
/// # use min_array_bench::Dataset;
/// let dataset = Dataset::new(4).unwrap();
/// assert_eq!(dataset.left(), [0.0, 1.0, 2.0, 3.0]);
/// assert_eq!(dataset.right(), [4.0, 3.0, 2.0, 1.0]);
/// ```
#[derive(Debug)]
pub struct Dataset {
    left: Vec<f64>,
    right: Vec<f64>,
    output: Vec<f64>,
}

impl Dataset {
    /// Allocates and initializes the arrays for the given number of elements.
    ///
    /// The output array is zero-filled, so that all its pages are mapped before
    /// the first trial.
    pub fn new(len: usize) -> Result<Self, Error> {
        let mut left = allocate("left", len)?;
        let mut right = allocate("right", len)?;
        let mut output = allocate("output", len)?;

        left.extend((0..len).map(|i| i as f64));
        right.extend((0..len).map(|i| (len - i) as f64));
        output.resize(len, 0.0);
        log_debug!(
            "Allocated 3 arrays of {len} elements ({} MiB each)",
            len * std::mem::size_of::<f64>() >> 20
        );

        Ok(Self {
            left,
            right,
            output,
        })
    }

    /// Returns the number of elements in each array.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    /// Returns true if the arrays are empty.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Returns the first input array.
    pub fn left(&self) -> &[f64] {
        &self.left
    }

    /// Returns the second input array.
    pub fn right(&self) -> &[f64] {
        &self.right
    }

    /// Returns the output array, as written by the last trial.
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Returns a kernel that computes the element-wise minimum into the output
    /// array, and that can be shared among worker threads.
    pub(crate) fn kernel(&mut self) -> MinKernel<'_> {
        MinKernel {
            left: &self.left,
            right: &self.right,
            len: self.output.len(),
            output: MutPtrWrapper(self.output.as_mut_ptr()),
            _phantom: PhantomData,
        }
    }
}

/// Reserves room for exactly `len` elements, reporting failures as an error
/// rather than aborting.
fn allocate(array: &'static str, len: usize) -> Result<Vec<f64>, Error> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|source| Error::Allocation { array, len, source })?;
    Ok(vec)
}

/// Computes `output[i] = min(left[i], right[i])` for indices handed out by a
/// [`RangeFactory`](super::range::RangeFactory).
pub(crate) struct MinKernel<'data> {
    left: &'data [f64],
    right: &'data [f64],
    len: usize,
    output: MutPtrWrapper<f64>,
    _phantom: PhantomData<&'data mut [f64]>,
}

impl MinKernel<'_> {
    /// Writes the minimum of both inputs at the given index into the output.
    ///
    /// # Safety
    ///
    /// The caller must ensure that no other thread accesses the output at the
    /// same index while the kernel is alive, i.e. that each index is processed
    /// at most once by a single thread. The partitions of a
    /// [`RangeFactory`](super::range::RangeFactory) guarantee this.
    #[inline(always)]
    pub(crate) unsafe fn process_index(&self, index: usize) {
        assert!(index < self.len);
        let a = self.left[index];
        let b = self.right[index];
        let min = if a < b { a } else { b };
        // SAFETY:
        // - The offset `index * size_of::<f64>()` fits in an `isize` and stays in
        //   bounds of the output array, because `index < self.len` as asserted above
        //   and the array is a well-formed `Vec` of length `self.len`.
        // - The resulting pointer is aligned and non-null, being derived from the
        //   array's base pointer.
        // - No other reference to this element exists for the duration of the write:
        //   the output array is exclusively borrowed by this kernel, and the caller
        //   guarantees that no other thread accesses the same index.
        unsafe {
            self.output.get().add(index).write(min);
        }
    }
}

/// A helper struct that wraps a [`*mut T`](pointer), to let worker threads
/// write disjoint elements of a [`&mut [T]`](slice).
struct MutPtrWrapper<T>(*mut T);

impl<T> MutPtrWrapper<T> {
    fn get(&self) -> *mut T {
        self.0
    }
}

/// SAFETY:
///
/// A [`MutPtrWrapper`] is shared among threads as a way to write items of type
/// `T` from other threads (see the safety comments in
/// [`MinKernel::process_index`]). This amounts to sending a
/// [`&mut T`](reference) to each thread, so we make it [`Sync`] if and only if
/// `T` is [`Send`].
unsafe impl<T: Send> Sync for MutPtrWrapper<T> {}

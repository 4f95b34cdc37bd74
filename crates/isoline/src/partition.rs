//! Static work partitioning across the worker pool.

use std::ops::Range;

/// Contiguous slice of `0..len` owned by worker `id` out of `workers`.
///
/// Slices for `id = 0..workers` are disjoint and cover `0..len`. A slice is
/// empty when there are more workers than items.
#[inline]
pub fn slice_bounds(id: usize, workers: usize, len: usize) -> Range<usize> {
    debug_assert!(workers > 0 && id < workers);
    let start = id * len / workers;
    let end = ((id + 1) * len / workers).min(len);
    start..end
}

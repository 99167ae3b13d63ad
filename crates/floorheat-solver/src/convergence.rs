//! Convergence monitoring between sweeps.
//!
//! The monitor computes the maximum absolute change over room cells between
//! the pre-sweep and post-sweep buffers. Halo and wall cells are excluded:
//! they copy forward and would only add zeros to the reduction.

use floorheat_core::{GridDims, InteriorMask};
use rayon::prelude::*;

/// Maximum |delta| over room cells in padded row `i`.
#[inline]
fn row_delta(src: &[f64], dst: &[f64], mask: &InteriorMask, dims: GridDims, i: usize) -> f64 {
    let pw = dims.padded_width();
    let base = i * pw;
    let mut worst = 0.0f64;
    for j in 1..pw - 1 {
        if mask.is_room(i - 1, j - 1) {
            worst = worst.max((dst[base + j] - src[base + j]).abs());
        }
    }
    worst
}

/// Maximum absolute change over room cells between two buffers.
///
/// Returns 0.0 when the mask has no room cells.
pub fn max_delta(src: &[f64], dst: &[f64], mask: &InteriorMask, dims: GridDims) -> f64 {
    let mut worst = 0.0f64;
    for i in 1..dims.padded_height() - 1 {
        worst = worst.max(row_delta(src, dst, mask, dims, i));
    }
    worst
}

/// Same reduction as [`max_delta`], computed row-parallel.
///
/// Max is order-independent, so this produces the identical value.
pub fn max_delta_parallel(src: &[f64], dst: &[f64], mask: &InteriorMask, dims: GridDims) -> f64 {
    (1..dims.padded_height() - 1)
        .into_par_iter()
        .map(|i| row_delta(src, dst, mask, dims, i))
        .reduce(|| 0.0, f64::max)
}

//! The Jacobi sweep kernel.
//!
//! One sweep maps the current buffer to the next one cell by cell:
//!
//! - halo cells copy forward (fixed Dirichlet boundary),
//! - room cells take the 4-neighbor average of the PREVIOUS sweep's values,
//! - wall/exterior cells copy forward (frozen at their initial temperature).
//!
//! Reading only previous-sweep values is what makes the update Jacobi
//! rather than Gauss-Seidel; it also makes every cell independent within a
//! sweep, which is what the threaded and GPU backends exploit. All host
//! backends route through [`sweep_row`] so the per-cell arithmetic is
//! bit-identical no matter which backend ran it.

use floorheat_core::{GridDims, InteriorMask};

/// Apply one full sweep: read `src`, write every cell of `dst`.
///
/// Both slices must have the padded length for `dims`; `dst` holds the
/// complete next field afterwards, including halo and frozen cells.
pub fn apply_sweep(src: &[f64], dst: &mut [f64], mask: &InteriorMask, dims: GridDims) {
    debug_assert_eq!(src.len(), dims.padded_len());
    debug_assert_eq!(dst.len(), dims.padded_len());

    let pw = dims.padded_width();
    let ph = dims.padded_height();

    dst[..pw].copy_from_slice(&src[..pw]);
    dst[(ph - 1) * pw..].copy_from_slice(&src[(ph - 1) * pw..]);
    for i in 1..ph - 1 {
        sweep_row(src, &mut dst[i * pw..(i + 1) * pw], mask, dims, i);
    }
}

/// Compute padded row `i` of the next buffer into `row_dst`.
///
/// `i` must be a non-halo row index (1..=height). `row_dst` is exactly the
/// padded-width slice of the destination buffer for that row.
#[inline]
pub fn sweep_row(src: &[f64], row_dst: &mut [f64], mask: &InteriorMask, dims: GridDims, i: usize) {
    let pw = dims.padded_width();
    let base = i * pw;

    row_dst[0] = src[base];
    row_dst[pw - 1] = src[base + pw - 1];
    for j in 1..pw - 1 {
        let idx = base + j;
        row_dst[j] = if mask.is_room(i - 1, j - 1) {
            0.25 * (src[idx - pw] + src[idx + pw] + src[idx - 1] + src[idx + 1])
        } else {
            src[idx]
        };
    }
}

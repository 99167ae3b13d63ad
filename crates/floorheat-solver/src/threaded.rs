//! Per-cell parallel backend on host threads.
//!
//! One sweep is a single synchronized rayon pass: destination rows are
//! disjoint chunks handed to the pool, every worker reads only the
//! previous-sweep buffer, and rayon's join forms the barrier before the
//! buffer swap. No locks anywhere; the double buffer replaces mutual
//! exclusion. The per-cell arithmetic is `sweep::sweep_row`, shared with
//! the scalar backend, so both produce bit-identical fields.

use floorheat_core::{Grid, InteriorMask};
use rayon::prelude::*;

use crate::backend::{BackendKind, RelaxationBackend};
use crate::config::SolveConfig;
use crate::convergence::max_delta_parallel;
use crate::error::Result;
use crate::report::{SolveReport, Termination};
use crate::sweep::sweep_row;

/// Data-parallel sweeps across the grid's rows, one barrier per sweep.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadedBackend;

impl ThreadedBackend {
    pub fn new() -> Self {
        Self
    }
}

fn parallel_sweep(src: &[f64], dst: &mut [f64], mask: &InteriorMask, dims: floorheat_core::GridDims) {
    let pw = dims.padded_width();
    let ph = dims.padded_height();
    dst.par_chunks_mut(pw)
        .enumerate()
        .for_each(|(i, row_dst)| {
            if i == 0 || i == ph - 1 {
                row_dst.copy_from_slice(&src[i * pw..(i + 1) * pw]);
            } else {
                sweep_row(src, row_dst, mask, dims, i);
            }
        });
}

impl RelaxationBackend for ThreadedBackend {
    fn solve(
        &self,
        grid: &mut Grid,
        mask: &InteriorMask,
        config: &SolveConfig,
    ) -> Result<SolveReport> {
        config.validate()?;
        mask.check_alignment(grid)?;
        let dims = grid.dims();

        let mut last_delta = 0.0;
        for iteration in 1..=config.max_iter {
            let (src, dst) = grid.pair_mut();
            parallel_sweep(src, dst, mask, dims);
            // Convergence checking costs an extra parallel reduction per
            // sweep; skipped entirely when no tolerance is configured.
            if let Some(tol) = config.tolerance {
                last_delta = max_delta_parallel(src, dst, mask, dims);
                grid.swap();
                if last_delta < tol {
                    log::debug!(
                        "threaded solve converged after {} sweeps (delta {:.3e})",
                        iteration,
                        last_delta
                    );
                    return Ok(SolveReport {
                        iterations: iteration,
                        last_delta,
                        termination: Termination::Converged,
                    });
                }
            } else {
                if iteration == config.max_iter {
                    last_delta = max_delta_parallel(src, dst, mask, dims);
                }
                grid.swap();
            }
        }

        log::debug!(
            "threaded solve hit the iteration budget of {} (delta {:.3e})",
            config.max_iter,
            last_delta
        );
        Ok(SolveReport {
            iterations: config.max_iter,
            last_delta,
            termination: Termination::IterationLimit,
        })
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Threads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::ScalarBackend;

    fn checkerboard(height: usize, width: usize) -> (Vec<f64>, Vec<bool>) {
        let field = (0..height * width)
            .map(|k| if k % 2 == 0 { 30.0 } else { 5.0 })
            .collect();
        let mask = (0..height * width).map(|k| k % 3 != 0).collect();
        (field, mask)
    }

    #[test]
    fn test_matches_scalar_bitwise() {
        let (field, cells) = checkerboard(17, 23);
        let mask = InteriorMask::new(cells, 17, 23).unwrap();
        let config = SolveConfig::default().with_max_iter(50).without_early_exit();

        let mut seq_grid = Grid::from_interior(&field, 17, 23, 12.0).unwrap();
        let mut par_grid = seq_grid.clone();

        let seq = ScalarBackend::new()
            .solve(&mut seq_grid, &mask, &config)
            .unwrap();
        let par = ThreadedBackend::new()
            .solve(&mut par_grid, &mask, &config)
            .unwrap();

        assert_eq!(seq.iterations, par.iterations);
        assert_eq!(seq.last_delta, par.last_delta);
        assert_eq!(seq_grid.current(), par_grid.current());
    }

    #[test]
    fn test_converges_like_scalar() {
        let (field, cells) = checkerboard(9, 9);
        let mask = InteriorMask::new(cells, 9, 9).unwrap();
        let config = SolveConfig::default().with_tolerance(1e-8);

        let mut seq_grid = Grid::from_interior(&field, 9, 9, 20.0).unwrap();
        let mut par_grid = seq_grid.clone();

        let seq = ScalarBackend::new()
            .solve(&mut seq_grid, &mask, &config)
            .unwrap();
        let par = ThreadedBackend::new()
            .solve(&mut par_grid, &mask, &config)
            .unwrap();

        assert!(seq.converged());
        assert!(par.converged());
        assert_eq!(seq.iterations, par.iterations);
        assert_eq!(seq_grid.current(), par_grid.current());
    }
}

//! Sequential single-thread backend.

use floorheat_core::{Grid, InteriorMask};

use crate::backend::{BackendKind, RelaxationBackend};
use crate::config::SolveConfig;
use crate::convergence::max_delta;
use crate::error::Result;
use crate::report::{SolveReport, Termination};
use crate::sweep::apply_sweep;

/// One worker, one sweep at a time: sweep, measure, swap, repeat.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarBackend;

impl ScalarBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RelaxationBackend for ScalarBackend {
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
            apply_sweep(src, dst, mask, dims);
            last_delta = max_delta(src, dst, mask, dims);
            grid.swap();

            if let Some(tol) = config.tolerance {
                if last_delta < tol {
                    log::debug!(
                        "scalar solve converged after {} sweeps (delta {:.3e})",
                        iteration,
                        last_delta
                    );
                    return Ok(SolveReport {
                        iterations: iteration,
                        last_delta,
                        termination: Termination::Converged,
                    });
                }
            }
        }

        log::debug!(
            "scalar solve hit the iteration budget of {} (delta {:.3e})",
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
        BackendKind::Scalar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_room_converges_in_one_sweep() {
        // Uniform border B: the single room cell becomes exactly B after one
        // sweep and the next sweep measures delta 0.
        let mut grid = Grid::from_interior(&[0.0], 1, 1, 37.5).unwrap();
        let mask = InteriorMask::all_rooms(1, 1).unwrap();
        let config = SolveConfig::default().with_tolerance(1e-12);

        let report = ScalarBackend::new().solve(&mut grid, &mask, &config).unwrap();
        assert!(report.converged());
        assert_eq!(report.iterations, 2);
        assert_eq!(grid.value(1, 1), 37.5);
        assert_eq!(report.last_delta, 0.0);
    }

    #[test]
    fn test_budget_exhaustion_is_not_an_error() {
        let mut grid = Grid::from_interior(&vec![0.0; 64], 8, 8, 100.0).unwrap();
        let mask = InteriorMask::all_rooms(8, 8).unwrap();
        let config = SolveConfig::default().with_max_iter(3).with_tolerance(1e-12);

        let report = ScalarBackend::new().solve(&mut grid, &mask, &config).unwrap();
        assert_eq!(report.termination, Termination::IterationLimit);
        assert_eq!(report.iterations, 3);
        assert!(report.last_delta > 0.0);
    }

    #[test]
    fn test_misaligned_mask_rejected() {
        let mut grid = Grid::from_interior(&[0.0; 4], 2, 2, 0.0).unwrap();
        let mask = InteriorMask::all_rooms(3, 3).unwrap();
        let err = ScalarBackend::new()
            .solve(&mut grid, &mask, &SolveConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Core(floorheat_core::Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_fixed_budget_run_reports_delta() {
        let mut grid = Grid::from_interior(&vec![0.0; 16], 4, 4, 10.0).unwrap();
        let mask = InteriorMask::all_rooms(4, 4).unwrap();
        let config = SolveConfig::default().with_max_iter(5).without_early_exit();

        let report = ScalarBackend::new().solve(&mut grid, &mask, &config).unwrap();
        assert_eq!(report.iterations, 5);
        assert!(report.last_delta.is_finite());
    }
}

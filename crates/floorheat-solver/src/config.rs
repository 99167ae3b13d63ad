//! Solve configuration.

use floorheat_core::Error as CoreError;

use crate::error::Result;

/// Default iteration budget, sized for 512x512 production floorplans.
pub const DEFAULT_MAX_ITER: usize = 20_000;

/// Default convergence tolerance for backends that support early exit.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Configuration for a single building's solve.
#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    /// Maximum number of sweeps. Must be at least 1.
    pub max_iter: usize,
    /// Early-exit tolerance on the max room-cell delta. `None` disables
    /// convergence checking and the solve runs the full iteration budget.
    /// The fused device backend ignores this entirely: it has no
    /// host-visible per-sweep reduction to check against.
    pub tolerance: Option<f64>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
            tolerance: Some(DEFAULT_TOLERANCE),
        }
    }
}

impl SolveConfig {
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Disable convergence checking; the full iteration budget always runs.
    pub fn without_early_exit(mut self) -> Self {
        self.tolerance = None;
        self
    }

    /// Check the preconditions every backend requires.
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(CoreError::InvalidIterationBudget.into());
        }
        if let Some(tol) = self.tolerance {
            if !(tol > 0.0) {
                return Err(CoreError::InvalidTolerance(tol).into());
            }
        }
        Ok(())
    }
}

//! Fused multi-iteration GPU backend.

use std::sync::Arc;

use floorheat_core::{Grid, InteriorMask};
use floorheat_solver::{
    BackendKind, RelaxationBackend, Result, SolveConfig, SolveReport, Termination,
};

use crate::context::WgpuContext;
use crate::relax::{GridSession, RelaxPipelines};

/// Default sweeps encoded per command submission.
pub const DEFAULT_SWEEPS_PER_SUBMIT: usize = 512;

/// Runs of sweeps encoded into single submissions, no host round trips.
///
/// The whole iteration budget executes on the device: consecutive dispatches
/// in one compute pass are ordered by implicit storage barriers, and the
/// buffer swap is just the alternation of ping-pong bind groups. Removing
/// the per-sweep launch and readback overhead is the point of this backend;
/// the cost is that no convergence check can run mid-flight, so the
/// configured tolerance is ignored and the budget always runs to
/// completion. One delta reduction after the final sweep populates
/// `last_delta` so callers can still judge how converged the field is.
///
/// Submissions are chunked to bound command-buffer size on long budgets.
pub struct FusedDeviceBackend {
    pipelines: Arc<RelaxPipelines>,
    sweeps_per_submit: usize,
}

impl FusedDeviceBackend {
    /// Acquire a device and compile the kernels.
    pub fn new() -> crate::error::Result<Self> {
        let ctx = Arc::new(WgpuContext::new()?);
        Self::with_context(ctx)
    }

    /// Build on an existing context, sharing it with other backends.
    pub fn with_context(ctx: Arc<WgpuContext>) -> crate::error::Result<Self> {
        Ok(Self {
            pipelines: Arc::new(RelaxPipelines::new(ctx)?),
            sweeps_per_submit: DEFAULT_SWEEPS_PER_SUBMIT,
        })
    }

    /// Reuse already-compiled pipelines (shared with a per-iteration backend).
    pub fn with_pipelines(pipelines: Arc<RelaxPipelines>) -> Self {
        Self {
            pipelines,
            sweeps_per_submit: DEFAULT_SWEEPS_PER_SUBMIT,
        }
    }

    pub fn with_sweeps_per_submit(mut self, sweeps: usize) -> Self {
        self.sweeps_per_submit = sweeps.max(1);
        self
    }
}

impl RelaxationBackend for FusedDeviceBackend {
    fn solve(
        &self,
        grid: &mut Grid,
        mask: &InteriorMask,
        config: &SolveConfig,
    ) -> Result<SolveReport> {
        config.validate()?;
        mask.check_alignment(grid)?;

        if config.tolerance.is_some() {
            log::debug!("fused device backend ignores the tolerance; running the full budget");
        }

        let session = GridSession::new(&self.pipelines, grid, mask)?;

        let mut completed = 0;
        while completed < config.max_iter {
            let count = self.sweeps_per_submit.min(config.max_iter - completed);
            session.run_sweeps(completed, count);
            completed += count;
        }

        let last_delta = session.measure_delta()?;
        let field = session.read_field(completed)?;
        grid.write_current(&field)?;

        Ok(SolveReport {
            iterations: completed,
            last_delta,
            termination: Termination::IterationLimit,
        })
    }

    fn kind(&self) -> BackendKind {
        BackendKind::DeviceFused
    }
}

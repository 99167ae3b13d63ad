//! Per-iteration GPU backend.

use std::sync::Arc;

use floorheat_core::{Grid, InteriorMask};
use floorheat_solver::{
    BackendKind, RelaxationBackend, Result, SolveConfig, SolveReport, Termination,
};

use crate::context::WgpuContext;
use crate::relax::{GridSession, RelaxPipelines};

/// One relaxation dispatch per sweep, with the iteration loop on the host.
///
/// Every cell of a sweep computes concurrently on the device; the submission
/// boundary is the global barrier before the ping-pong flip. When the config
/// carries a tolerance, each iteration also runs the delta reduction and
/// transfers the scalar result back, which roughly doubles the per-sweep
/// cost. That overhead is the price of early exit on this backend; run
/// without a tolerance (or use the fused backend) to avoid it.
pub struct DeviceBackend {
    pipelines: Arc<RelaxPipelines>,
}

impl DeviceBackend {
    /// Acquire a device and compile the kernels.
    pub fn new() -> crate::error::Result<Self> {
        let ctx = Arc::new(WgpuContext::new()?);
        Self::with_context(ctx)
    }

    /// Build on an existing context, sharing it with other backends.
    pub fn with_context(ctx: Arc<WgpuContext>) -> crate::error::Result<Self> {
        Ok(Self {
            pipelines: Arc::new(RelaxPipelines::new(ctx)?),
        })
    }

    /// Reuse already-compiled pipelines (shared with a fused backend).
    pub fn with_pipelines(pipelines: Arc<RelaxPipelines>) -> Self {
        Self { pipelines }
    }

    pub fn pipelines(&self) -> &Arc<RelaxPipelines> {
        &self.pipelines
    }
}

impl RelaxationBackend for DeviceBackend {
    fn solve(
        &self,
        grid: &mut Grid,
        mask: &InteriorMask,
        config: &SolveConfig,
    ) -> Result<SolveReport> {
        config.validate()?;
        mask.check_alignment(grid)?;

        let session = GridSession::new(&self.pipelines, grid, mask)?;

        let mut completed = 0;
        let mut last_delta = f64::INFINITY;
        let mut termination = Termination::IterationLimit;

        if let Some(tol) = config.tolerance {
            while completed < config.max_iter {
                session.run_sweeps(completed, 1);
                completed += 1;
                last_delta = session.measure_delta()?;
                if last_delta < tol {
                    log::debug!(
                        "device solve converged after {} sweeps (delta {:.3e})",
                        completed,
                        last_delta
                    );
                    termination = Termination::Converged;
                    break;
                }
            }
        } else {
            while completed < config.max_iter {
                session.run_sweeps(completed, 1);
                completed += 1;
            }
            last_delta = session.measure_delta()?;
        }

        let field = session.read_field(completed)?;
        grid.write_current(&field)?;

        Ok(SolveReport {
            iterations: completed,
            last_delta,
            termination,
        })
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Device
    }
}

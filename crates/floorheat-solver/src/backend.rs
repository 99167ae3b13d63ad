//! The execution backend abstraction.

use floorheat_core::{Grid, InteriorMask};

use crate::config::SolveConfig;
use crate::error::Result;
use crate::report::SolveReport;

/// Which execution strategy a backend implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Sequential single-thread sweeps.
    Scalar,
    /// Per-cell parallel sweeps on host threads, synchronized per sweep.
    Threads,
    /// GPU sweeps, one dispatch per iteration under host loop control.
    Device,
    /// GPU sweeps fused into large multi-iteration submissions.
    DeviceFused,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Scalar => write!(f, "scalar"),
            BackendKind::Threads => write!(f, "threads"),
            BackendKind::Device => write!(f, "device"),
            BackendKind::DeviceFused => write!(f, "device-fused"),
        }
    }
}

/// A strategy for driving repeated sweeps over one building's grid.
///
/// Implementations must honor the shared contract:
/// - validate the config and grid/mask alignment before the first sweep;
/// - apply the Jacobi update rule exactly as `sweep::apply_sweep` defines it;
/// - stop at convergence (when the config carries a tolerance and the
///   backend supports checking) or at the iteration budget;
/// - leave the final field in the grid's current buffer and report the last
///   measured delta.
///
/// Exhausting the budget without converging is a normal outcome, reported
/// via [`crate::report::Termination::IterationLimit`].
pub trait RelaxationBackend: Send + Sync {
    fn solve(&self, grid: &mut Grid, mask: &InteriorMask, config: &SolveConfig)
        -> Result<SolveReport>;

    fn kind(&self) -> BackendKind;
}

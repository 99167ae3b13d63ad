//! Masked Jacobi relaxation engine.
//!
//! This crate provides the sweep kernel and convergence monitor at the heart
//! of the heat simulation, plus the CPU execution backends. Every backend
//! drives the same per-cell update rule, so results are interchangeable:
//! the sequential and threaded backends agree to rounding, and the GPU
//! backends (in `floorheat-backend-wgpu`) agree within f32 tolerance.

pub mod backend;
pub mod config;
pub mod convergence;
pub mod error;
pub mod report;
pub mod scalar;
pub mod sweep;
pub mod threaded;

pub use backend::{BackendKind, RelaxationBackend};
pub use config::{SolveConfig, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE};
pub use convergence::{max_delta, max_delta_parallel};
pub use error::{Error, Result};
pub use report::{SolveReport, Termination};
pub use scalar::ScalarBackend;
pub use sweep::apply_sweep;
pub use threaded::ThreadedBackend;

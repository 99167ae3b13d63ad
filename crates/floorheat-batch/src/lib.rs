//! Batch orchestration: run the relaxation engine over a worklist of
//! independent buildings and collect per-building summary statistics.
//!
//! Buildings share nothing but the (read-only) source and backend, so the
//! batch axis is an embarrassingly parallel map: each worker loads, solves,
//! and summarizes one building. Failures are isolated per building and
//! reported alongside the completed results.

pub mod error;
pub mod run;
pub mod select;

pub use error::{Error, Result, SourceError};
pub use run::{
    run_batch, BatchConfig, BatchOutcome, BuildingDomain, BuildingFailure, BuildingSource,
    BuildingSummary, ParallelConfig,
};
pub use select::BackendSelector;

//! Error types for floorheat-batch.

use thiserror::Error;

/// Error produced by a [`crate::run::BuildingSource`] implementation.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] floorheat_core::Error),

    #[error(transparent)]
    Solver(#[from] floorheat_solver::Error),

    #[error("failed to load building: {0}")]
    Source(SourceError),
}

pub type Result<T> = std::result::Result<T, Error>;

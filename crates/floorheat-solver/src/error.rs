//! Error types for floorheat-solver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] floorheat_core::Error),

    #[error("device backend failure: {0}")]
    Device(String),
}

pub type Result<T> = std::result::Result<T, Error>;

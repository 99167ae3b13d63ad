//! Error types for floorheat-core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("dimension mismatch: field is {field_height}x{field_width}, mask is {mask_height}x{mask_width}")]
    DimensionMismatch {
        field_height: usize,
        field_width: usize,
        mask_height: usize,
        mask_width: usize,
    },

    #[error("buffer length {len} does not match {height}x{width} cells")]
    BadBufferLength {
        len: usize,
        height: usize,
        width: usize,
    },

    #[error("domain must have at least one interior cell")]
    EmptyDomain,

    #[error("building has no room cells, statistics are undefined")]
    NoRoomCells,

    #[error("iteration budget must be at least 1")]
    InvalidIterationBudget,

    #[error("convergence tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the wgpu backend.

use std::fmt;

/// GPU backend error type.
#[derive(Debug)]
#[non_exhaustive]
pub enum WgpuError {
    /// No suitable GPU adapter found.
    NoAdapter,
    /// GPU device initialization failed.
    DeviceInit(String),
    /// Buffer creation or mapping failed.
    Buffer(String),
    /// GPU operation failed.
    Compute(String),
}

impl fmt::Display for WgpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WgpuError::NoAdapter => write!(f, "no suitable GPU adapter found"),
            WgpuError::DeviceInit(msg) => write!(f, "GPU device initialization failed: {}", msg),
            WgpuError::Buffer(msg) => write!(f, "GPU buffer operation failed: {}", msg),
            WgpuError::Compute(msg) => write!(f, "GPU compute operation failed: {}", msg),
        }
    }
}

impl std::error::Error for WgpuError {}

impl From<WgpuError> for floorheat_solver::Error {
    fn from(err: WgpuError) -> Self {
        floorheat_solver::Error::Device(err.to_string())
    }
}

/// Result type for wgpu operations.
pub type Result<T> = std::result::Result<T, WgpuError>;

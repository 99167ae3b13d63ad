//! GPU execution backends for the relaxation engine.
//!
//! Two strategies over the same WGSL kernel:
//!
//! - [`DeviceBackend`]: one relaxation dispatch per sweep under host loop
//!   control. Early exit is available, paid for by a reduction dispatch and
//!   a scalar readback every iteration.
//! - [`FusedDeviceBackend`]: many sweeps encoded per submission with no
//!   host-visible work in between. No convergence checking is possible
//!   inside the run; the full iteration budget always executes.
//!
//! Kernels run in f32. Fields are converted on upload and readback, so
//! results match the CPU backends within f32 tolerance rather than bitwise.

pub mod context;
pub mod device;
pub mod error;
pub mod fused;
pub mod relax;

pub use context::WgpuContext;
pub use device::DeviceBackend;
pub use error::{Result, WgpuError};
pub use fused::FusedDeviceBackend;

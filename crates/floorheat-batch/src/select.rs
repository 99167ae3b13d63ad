//! Backend selection.

use floorheat_solver::{BackendKind, RelaxationBackend, ScalarBackend, ThreadedBackend};

use crate::error::Result;

/// Selector for choosing a relaxation backend.
///
/// A preferred backend that turns out to be unavailable (GPU support not
/// compiled in, or no adapter at runtime) degrades toward the threaded and
/// scalar backends with a logged warning rather than failing the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendSelector {
    preferred: Option<BackendKind>,
}

impl BackendSelector {
    /// Automatic selection: the threaded backend.
    ///
    /// The GPU backends run f32 kernels, so they are opt-in rather than
    /// auto-detected; callers that want them ask for them explicitly.
    pub fn auto() -> Self {
        Self::default()
    }

    /// Force the sequential scalar backend.
    pub fn scalar_only() -> Self {
        Self::prefer(BackendKind::Scalar)
    }

    pub fn prefer(kind: BackendKind) -> Self {
        Self {
            preferred: Some(kind),
        }
    }

    pub fn preferred(&self) -> Option<BackendKind> {
        self.preferred
    }

    /// Create the backend, falling back when the preference is unavailable.
    pub fn create_backend(&self) -> Result<Box<dyn RelaxationBackend>> {
        match self.preferred {
            Some(BackendKind::Scalar) => Ok(Box::new(ScalarBackend::new())),
            None | Some(BackendKind::Threads) => Ok(Box::new(ThreadedBackend::new())),
            Some(kind @ (BackendKind::Device | BackendKind::DeviceFused)) => {
                self.create_device_backend(kind)
            }
        }
    }

    #[cfg(feature = "gpu")]
    fn create_device_backend(&self, kind: BackendKind) -> Result<Box<dyn RelaxationBackend>> {
        use floorheat_backend_wgpu::{DeviceBackend, FusedDeviceBackend};

        match kind {
            BackendKind::Device => match DeviceBackend::new() {
                Ok(backend) => return Ok(Box::new(backend)),
                Err(e) => log::warn!("device backend unavailable: {}", e),
            },
            _ => match FusedDeviceBackend::new() {
                Ok(backend) => return Ok(Box::new(backend)),
                Err(e) => log::warn!("device-fused backend unavailable: {}", e),
            },
        }
        log::warn!("falling back to the threads backend");
        Ok(Box::new(ThreadedBackend::new()))
    }

    #[cfg(not(feature = "gpu"))]
    fn create_device_backend(&self, kind: BackendKind) -> Result<Box<dyn RelaxationBackend>> {
        log::warn!(
            "{} backend not compiled in (enable the `gpu` feature), falling back to threads",
            kind
        );
        Ok(Box::new(ThreadedBackend::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_is_threads() {
        let backend = BackendSelector::auto().create_backend().unwrap();
        assert_eq!(backend.kind(), BackendKind::Threads);
    }

    #[test]
    fn test_scalar_only() {
        let backend = BackendSelector::scalar_only().create_backend().unwrap();
        assert_eq!(backend.kind(), BackendKind::Scalar);
    }

    #[cfg(not(feature = "gpu"))]
    #[test]
    fn test_device_preference_degrades_without_gpu_support() {
        let backend = BackendSelector::prefer(BackendKind::DeviceFused)
            .create_backend()
            .unwrap();
        assert_eq!(backend.kind(), BackendKind::Threads);
    }
}

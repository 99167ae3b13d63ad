//! WebGPU device context management.

use crate::error::{Result, WgpuError};
use std::sync::Arc;

/// WebGPU context holding device and queue.
///
/// Create one context and share it across backends: device acquisition is
/// the expensive step, and one queue serializes all relaxation work anyway.
pub struct WgpuContext {
    pub(crate) device: Arc<wgpu::Device>,
    pub(crate) queue: Arc<wgpu::Queue>,
    pub(crate) adapter_info: wgpu::AdapterInfo,
}

impl WgpuContext {
    /// Create a new WebGPU context using the best available adapter.
    ///
    /// Prefers discrete GPUs, falls back to integrated GPUs.
    pub fn new() -> Result<Self> {
        Self::with_power_preference(wgpu::PowerPreference::HighPerformance)
    }

    /// Create a new WebGPU context with a specific power preference.
    pub fn with_power_preference(power_preference: wgpu::PowerPreference) -> Result<Self> {
        pollster::block_on(Self::new_async(power_preference))
    }

    async fn new_async(power_preference: wgpu::PowerPreference) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::METAL | wgpu::Backends::VULKAN | wgpu::Backends::DX12,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or(WgpuError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Selected GPU adapter: {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Floorheat Relaxation Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| WgpuError::DeviceInit(e.to_string()))?;

        log::info!("WebGPU device initialized successfully");

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
        })
    }

    /// Check if a WebGPU-capable GPU is available on this system.
    pub fn is_available() -> bool {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::METAL | wgpu::Backends::VULKAN | wgpu::Backends::DX12,
                ..Default::default()
            });
            instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .is_some()
        })
    }

    /// Get the adapter name.
    pub fn adapter_name(&self) -> &str {
        &self.adapter_info.name
    }

    /// Get the backend being used (Metal, Vulkan, etc.).
    pub fn backend(&self) -> wgpu::Backend {
        self.adapter_info.backend
    }

    /// Get the underlying device.
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    /// Get the underlying queue.
    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }
}

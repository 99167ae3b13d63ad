//! Relaxation compute pipelines and per-solve GPU state.
//!
//! One shader module carries two entry points over a shared binding set:
//! the masked Jacobi sweep and a workgroup-level max-|delta| reduction.
//! A [`GridSession`] owns the ping-pong field buffers for one solve; bind
//! groups exist in both orientations, so a buffer swap is a parity flip on
//! the host with no data movement on the device.
//!
//! Dispatches within one compute pass are ordered by WebGPU's implicit
//! storage barriers, which is what lets the fused backend chain whole runs
//! of sweeps into a single submission.

use crate::context::WgpuContext;
use crate::error::{Result, WgpuError};
use bytemuck::{Pod, Zeroable};
use floorheat_core::{Grid, GridDims, InteriorMask};
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Threads per workgroup axis for the sweep kernel.
const SWEEP_TILE: u32 = 16;

/// Threads per workgroup for the delta reduction.
const REDUCE_GROUP: u32 = 256;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Params {
    padded_width: u32,
    padded_height: u32,
    interior_width: u32,
    interior_height: u32,
}

/// Compiled pipelines, shared across solves and across both GPU backends.
pub struct RelaxPipelines {
    ctx: Arc<WgpuContext>,
    sweep_pipeline: wgpu::ComputePipeline,
    reduce_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl RelaxPipelines {
    pub fn new(ctx: Arc<WgpuContext>) -> Result<Self> {
        let shader = ctx
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Relaxation Shader"),
                source: wgpu::ShaderSource::Wgsl(RELAX_SHADER.into()),
            });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout =
            ctx.device()
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Relaxation Bind Group Layout"),
                    entries: &[
                        // Uniforms (grid dimensions)
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // Pre-sweep field
                        storage_entry(1, true),
                        // Post-sweep field
                        storage_entry(2, false),
                        // Room mask, one u32 per interior cell
                        storage_entry(3, true),
                        // Per-workgroup delta partials
                        storage_entry(4, false),
                    ],
                });

        let pipeline_layout =
            ctx.device()
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Relaxation Pipeline Layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    push_constant_ranges: &[],
                });

        let sweep_pipeline =
            ctx.device()
                .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some("Jacobi Sweep Pipeline"),
                    layout: Some(&pipeline_layout),
                    module: &shader,
                    entry_point: Some("sweep"),
                    compilation_options: Default::default(),
                    cache: None,
                });

        let reduce_pipeline =
            ctx.device()
                .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some("Max Delta Pipeline"),
                    layout: Some(&pipeline_layout),
                    module: &shader,
                    entry_point: Some("max_delta"),
                    compilation_options: Default::default(),
                    cache: None,
                });

        Ok(Self {
            ctx,
            sweep_pipeline,
            reduce_pipeline,
            bind_group_layout,
        })
    }

    pub fn context(&self) -> &Arc<WgpuContext> {
        &self.ctx
    }
}

/// GPU-side state for one building's solve.
///
/// Parity convention: after `n` completed sweeps the current field lives in
/// buffer `n % 2`. Bind group `p` reads buffer `p` and writes buffer `1-p`,
/// so sweep `n+1` uses bind group `n % 2`.
pub struct GridSession<'a> {
    pipelines: &'a RelaxPipelines,
    dims: GridDims,
    fields: [wgpu::Buffer; 2],
    partials: wgpu::Buffer,
    partials_staging: wgpu::Buffer,
    field_staging: wgpu::Buffer,
    bind_groups: [wgpu::BindGroup; 2],
    reduce_groups: u32,
}

impl<'a> GridSession<'a> {
    /// Upload a grid's current field and mask, ready for sweeping.
    pub fn new(pipelines: &'a RelaxPipelines, grid: &Grid, mask: &InteriorMask) -> Result<Self> {
        let dims = grid.dims();
        let device = pipelines.ctx.device();

        let field_f32: Vec<f32> = grid.current().iter().map(|&v| v as f32).collect();
        let mask_u32: Vec<u32> = mask.cells().iter().map(|&room| room as u32).collect();

        let params = Params {
            padded_width: dims.padded_width() as u32,
            padded_height: dims.padded_height() as u32,
            interior_width: dims.width as u32,
            interior_height: dims.height as u32,
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Relaxation Params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let fields = [0, 1].map(|slot| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(if slot == 0 { "Field Ping" } else { "Field Pong" }),
                contents: bytemuck::cast_slice(&field_f32),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            })
        });

        let mask_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Room Mask"),
            contents: bytemuck::cast_slice(&mask_u32),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let interior_cells = (dims.height * dims.width) as u32;
        let reduce_groups = interior_cells.div_ceil(REDUCE_GROUP);
        let partials_size = (reduce_groups as usize * std::mem::size_of::<f32>()) as u64;
        let partials = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Delta Partials"),
            size: partials_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let partials_staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Delta Partials Staging"),
            size: partials_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let field_size = (dims.padded_len() * std::mem::size_of::<f32>()) as u64;
        let field_staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Field Staging"),
            size: field_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_groups = [0usize, 1].map(|parity| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Relaxation Bind Group"),
                layout: &pipelines.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: fields[parity].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: fields[1 - parity].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: mask_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: partials.as_entire_binding(),
                    },
                ],
            })
        });

        Ok(Self {
            pipelines,
            dims,
            fields,
            partials,
            partials_staging,
            field_staging,
            bind_groups,
            reduce_groups,
        })
    }

    fn sweep_workgroups(&self) -> (u32, u32) {
        let x = (self.dims.padded_width() as u32).div_ceil(SWEEP_TILE);
        let y = (self.dims.padded_height() as u32).div_ceil(SWEEP_TILE);
        (x, y)
    }

    /// Encode and submit `count` consecutive sweeps starting at sweep number
    /// `completed` (i.e. with `completed` sweeps already done).
    pub fn run_sweeps(&self, completed: usize, count: usize) {
        let (wx, wy) = self.sweep_workgroups();
        let mut encoder =
            self.pipelines
                .ctx
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Sweep Encoder"),
                });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Sweep Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.sweep_pipeline);
            for n in completed..completed + count {
                pass.set_bind_group(0, &self.bind_groups[n % 2], &[]);
                pass.dispatch_workgroups(wx, wy, 1);
            }
        }
        self.pipelines
            .ctx
            .queue()
            .submit(std::iter::once(encoder.finish()));
    }

    /// Max |delta| over room cells between the two field buffers.
    ///
    /// Valid right after a sweep: the buffers then hold the pre- and
    /// post-sweep fields. The reduction runs on the device; only the
    /// per-workgroup partial maxima cross back to the host.
    pub fn measure_delta(&self) -> Result<f64> {
        let mut encoder =
            self.pipelines
                .ctx
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Delta Encoder"),
                });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Delta Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.reduce_pipeline);
            pass.set_bind_group(0, &self.bind_groups[0], &[]);
            pass.dispatch_workgroups(self.reduce_groups, 1, 1);
        }
        encoder.copy_buffer_to_buffer(
            &self.partials,
            0,
            &self.partials_staging,
            0,
            self.partials_staging.size(),
        );
        self.pipelines
            .ctx
            .queue()
            .submit(std::iter::once(encoder.finish()));

        let partials = read_staging(self.pipelines.ctx.as_ref(), &self.partials_staging)?;
        Ok(partials.into_iter().fold(0.0f32, f32::max) as f64)
    }

    /// Read back the field holding the result of `completed` sweeps.
    pub fn read_field(&self, completed: usize) -> Result<Vec<f64>> {
        let mut encoder =
            self.pipelines
                .ctx
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Readback Encoder"),
                });
        encoder.copy_buffer_to_buffer(
            &self.fields[completed % 2],
            0,
            &self.field_staging,
            0,
            self.field_staging.size(),
        );
        self.pipelines
            .ctx
            .queue()
            .submit(std::iter::once(encoder.finish()));

        let field = read_staging(self.pipelines.ctx.as_ref(), &self.field_staging)?;
        Ok(field.into_iter().map(|v| v as f64).collect())
    }
}

/// Map a staging buffer and copy its f32 contents to the host.
fn read_staging(ctx: &WgpuContext, staging: &wgpu::Buffer) -> Result<Vec<f32>> {
    let buffer_slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    ctx.device().poll(wgpu::Maintain::Wait);
    rx.recv()
        .map_err(|_| WgpuError::Compute("failed to receive map result".into()))?
        .map_err(|e| WgpuError::Buffer(format!("buffer map failed: {:?}", e)))?;

    let data = buffer_slice.get_mapped_range();
    let values: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
    drop(data);
    staging.unmap();
    Ok(values)
}

/// WGSL kernels: masked Jacobi sweep and masked max-|delta| reduction.
///
/// Both entry points share one binding set. `sweep` reads `u_prev` and
/// writes `u_next`; `max_delta` reads both fields and writes one partial
/// maximum per workgroup. The delta kernel indexes the interior only, so
/// halo cells never contribute.
const RELAX_SHADER: &str = r#"
struct Params {
    padded_width: u32,
    padded_height: u32,
    interior_width: u32,
    interior_height: u32,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> u_prev: array<f32>;
@group(0) @binding(2) var<storage, read_write> u_next: array<f32>;
@group(0) @binding(3) var<storage, read> room_mask: array<u32>;
@group(0) @binding(4) var<storage, read_write> partials: array<f32>;

@compute @workgroup_size(16, 16)
fn sweep(@builtin(global_invocation_id) gid: vec3<u32>) {
    let j = gid.x;
    let i = gid.y;
    if (i >= params.padded_height || j >= params.padded_width) {
        return;
    }
    let idx = i * params.padded_width + j;

    // Halo border: fixed boundary, copy forward.
    if (i == 0u || j == 0u || i == params.padded_height - 1u || j == params.padded_width - 1u) {
        u_next[idx] = u_prev[idx];
        return;
    }

    let cell = (i - 1u) * params.interior_width + (j - 1u);
    if (room_mask[cell] != 0u) {
        u_next[idx] = 0.25 * (u_prev[idx - params.padded_width]
            + u_prev[idx + params.padded_width]
            + u_prev[idx - 1u]
            + u_prev[idx + 1u]);
    } else {
        // Wall or outside the building: frozen.
        u_next[idx] = u_prev[idx];
    }
}

var<workgroup> scratch: array<f32, 256>;

@compute @workgroup_size(256)
fn max_delta(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(local_invocation_index) lid: u32,
    @builtin(workgroup_id) wid: vec3<u32>,
) {
    let cells = params.interior_width * params.interior_height;
    var diff: f32 = 0.0;
    let k = gid.x;
    if (k < cells && room_mask[k] != 0u) {
        let i = k / params.interior_width;
        let j = k % params.interior_width;
        let idx = (i + 1u) * params.padded_width + (j + 1u);
        diff = abs(u_next[idx] - u_prev[idx]);
    }
    scratch[lid] = diff;
    workgroupBarrier();

    var stride: u32 = 128u;
    while (stride > 0u) {
        if (lid < stride) {
            scratch[lid] = max(scratch[lid], scratch[lid + stride]);
        }
        workgroupBarrier();
        stride = stride / 2u;
    }

    if (lid == 0u) {
        partials[wid.x] = scratch[0];
    }
}
"#;

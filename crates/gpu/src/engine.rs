use crate::context::{GpuContext, GpuError};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use ringlife_common::{FieldSize, GridLabel, WorkgroupCount};
use ringlife_kernel::{ComputeEngine, ConvolutionKernel, EngineError, FieldParams, PaintParams};
use std::sync::Arc;
use wgpu::util::DeviceExt;

const RESULT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct FieldUniform {
    field_width: u32,
    field_height: u32,
    kernel_width: u32,
    kernel_height: u32,
    kernel_mult: f32,
    seed: u32,
    _pad: [u32; 2],
}

impl From<&FieldParams> for FieldUniform {
    fn from(p: &FieldParams) -> Self {
        Self {
            field_width: p.field_width,
            field_height: p.field_height,
            kernel_width: p.kernel_width,
            kernel_height: p.kernel_height,
            kernel_mult: p.kernel_mult,
            seed: p.seed,
            _pad: [0; 2],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct CursorUniform {
    rad_sqr: f32,
    fill: f32,
    x: i32,
    y: i32,
    offset_x: u32,
    offset_y: u32,
    _pad: [u32; 2],
}

impl From<&PaintParams> for CursorUniform {
    fn from(p: &PaintParams) -> Self {
        Self {
            rad_sqr: p.cursor_rad_sqr,
            fill: p.cursor_fill,
            x: p.cursor_x,
            y: p.cursor_y,
            offset_x: p.draw_offset_x,
            offset_y: p.draw_offset_y,
            _pad: [0; 2],
        }
    }
}

/// One grid of f32 cells in a storage buffer. Destroyed on drop.
pub struct GpuGrid {
    label: GridLabel,
    size: FieldSize,
    buffer: wgpu::Buffer,
}

impl GpuGrid {
    pub fn label(&self) -> GridLabel {
        self.label
    }

    pub fn size(&self) -> FieldSize {
        self.size
    }
}

impl Drop for GpuGrid {
    fn drop(&mut self) {
        self.buffer.destroy();
        tracing::debug!(grid = %self.label, "released grid buffer");
    }
}

/// Read-only kernel weights in a storage buffer. Destroyed on drop.
pub struct GpuKernel {
    buffer: wgpu::Buffer,
}

impl Drop for GpuKernel {
    fn drop(&mut self) {
        self.buffer.destroy();
        tracing::debug!("released kernel buffer");
    }
}

/// Field-sized RGBA texture written by the render pass.
struct RenderTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Drop for RenderTarget {
    fn drop(&mut self) {
        self.texture.destroy();
        tracing::debug!("released render target");
    }
}

/// [`ComputeEngine`] backed by wgpu compute pipelines.
pub struct WgpuEngine {
    ctx: Arc<GpuContext>,
    noise_fill: wgpu::ComputePipeline,
    iterate: wgpu::ComputePipeline,
    render: wgpu::ComputePipeline,
    cursor_draw: wgpu::ComputePipeline,
    field_uniform: wgpu::Buffer,
    cursor_uniform: wgpu::Buffer,
    target: Option<RenderTarget>,
}

impl WgpuEngine {
    pub fn new(ctx: Arc<GpuContext>) -> Self {
        let device = &ctx.device;
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("automaton_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::AUTOMATON_SHADER.into()),
        });

        let [noise_fill, iterate, render, cursor_draw] =
            shaders::ENTRY_POINTS.map(|entry| compute_pipeline(device, &module, entry));

        let field_uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("field_uniform"),
            size: std::mem::size_of::<FieldUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let cursor_uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cursor_uniform"),
            size: std::mem::size_of::<CursorUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            ctx,
            noise_fill,
            iterate,
            render,
            cursor_draw,
            field_uniform,
            cursor_uniform,
            target: None,
        }
    }

    pub fn context(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    /// View of the render target, once `configure` has sized it.
    pub fn result_view(&self) -> Option<&wgpu::TextureView> {
        self.target.as_ref().map(|t| &t.view)
    }

    /// Copy a grid back to the CPU. Blocks until the GPU is done.
    pub fn read_grid(&self, grid: &GpuGrid) -> Result<Vec<f32>, GpuError> {
        let device = &self.ctx.device;
        let bytes = grid.buffer.size();
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grid_readback"),
            size: bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("readback_encoder"),
        });
        encoder.copy_buffer_to_buffer(&grid.buffer, 0, &staging, 0, bytes);
        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = std::sync::mpsc::channel();
        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.ctx.wait_idle();
        rx.recv().map_err(|_| GpuError::ReadbackChannel)??;

        let cells = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, f32>(&data).to_vec()
        };
        staging.unmap();
        Ok(cells)
    }

    fn dispatch(
        &self,
        label: &str,
        pipeline: &wgpu::ComputePipeline,
        entries: &[wgpu::BindGroupEntry<'_>],
        groups: WorkgroupCount,
    ) {
        if groups.is_empty() {
            return;
        }
        let device = &self.ctx.device;
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &pipeline.get_bind_group_layout(0),
            entries,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(label),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups.x, groups.y, groups.z);
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        tracing::trace!(pass = label, %groups, "dispatched");
    }

    fn create_target(&self, width: u32, height: u32) -> RenderTarget {
        let texture = self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("result_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: RESULT_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        RenderTarget { texture, view }
    }
}

impl ComputeEngine for WgpuEngine {
    type Grid = GpuGrid;
    type Kernel = GpuKernel;

    fn configure(&mut self, params: &FieldParams) {
        self.ctx.queue.write_buffer(
            &self.field_uniform,
            0,
            bytemuck::bytes_of(&FieldUniform::from(params)),
        );
        self.target = Some(self.create_target(params.field_width, params.field_height));
    }

    fn create_grid(&mut self, label: GridLabel, size: FieldSize) -> Result<GpuGrid, EngineError> {
        let bytes = grid_bytes(size);
        let max = self.ctx.device.limits().max_storage_buffer_binding_size as u64;
        if bytes > max {
            return Err(EngineError::Allocation {
                what: label.as_str().to_string(),
                reason: format!("{bytes} bytes exceeds storage binding limit of {max}"),
            });
        }
        let buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label.as_str()),
            size: bytes,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        tracing::info!(grid = %label, field = %size, bytes, "allocated grid buffer");
        Ok(GpuGrid {
            label,
            size,
            buffer,
        })
    }

    fn upload_kernel(&mut self, kernel: &ConvolutionKernel) -> Result<GpuKernel, EngineError> {
        if kernel.weights().is_empty() {
            return Err(EngineError::Allocation {
                what: "kernel".into(),
                reason: "kernel has no weights".into(),
            });
        }
        let buffer = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kernel_weights"),
                contents: bytemuck::cast_slice(kernel.weights()),
                usage: wgpu::BufferUsages::STORAGE,
            });
        Ok(GpuKernel { buffer })
    }

    fn seed(&mut self, target: &GpuGrid, groups: WorkgroupCount) {
        self.dispatch(
            "noise_fill",
            &self.noise_fill,
            &[
                uniform_entry(0, &self.field_uniform),
                storage_entry(1, &target.buffer),
            ],
            groups,
        );
    }

    fn step(&mut self, from: &GpuGrid, to: &GpuGrid, kernel: &GpuKernel, groups: WorkgroupCount) {
        self.dispatch(
            "iterate",
            &self.iterate,
            &[
                uniform_entry(0, &self.field_uniform),
                storage_entry(1, &from.buffer),
                storage_entry(2, &to.buffer),
                storage_entry(3, &kernel.buffer),
            ],
            groups,
        );
    }

    fn render(&mut self, source: &GpuGrid, groups: WorkgroupCount) {
        let Some(target) = &self.target else {
            tracing::warn!("render before configure; skipping");
            return;
        };
        self.dispatch(
            "render",
            &self.render,
            &[
                uniform_entry(0, &self.field_uniform),
                storage_entry(2, &source.buffer),
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&target.view),
                },
            ],
            groups,
        );
    }

    fn paint(&mut self, target: &GpuGrid, params: &PaintParams, groups: WorkgroupCount) {
        self.ctx.queue.write_buffer(
            &self.cursor_uniform,
            0,
            bytemuck::bytes_of(&CursorUniform::from(params)),
        );
        self.dispatch(
            "cursor_draw",
            &self.cursor_draw,
            &[
                uniform_entry(0, &self.field_uniform),
                storage_entry(1, &target.buffer),
                uniform_entry(5, &self.cursor_uniform),
            ],
            groups,
        );
    }
}

fn compute_pipeline(
    device: &wgpu::Device,
    module: &wgpu::ShaderModule,
    entry: &str,
) -> wgpu::ComputePipeline {
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(entry),
        layout: None,
        module,
        entry_point: Some(entry),
        compilation_options: Default::default(),
        cache: None,
    })
}

fn uniform_entry(binding: u32, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: buffer.as_entire_binding(),
    }
}

fn storage_entry(binding: u32, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: buffer.as_entire_binding(),
    }
}

/// Byte size of one grid buffer.
fn grid_bytes(size: FieldSize) -> u64 {
    (size.cell_count() * std::mem::size_of::<f32>()) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_are_sixteen_byte_multiples() {
        assert_eq!(std::mem::size_of::<FieldUniform>(), 32);
        assert_eq!(std::mem::size_of::<CursorUniform>(), 32);
    }

    #[test]
    fn field_uniform_from_params() {
        let kernel = ConvolutionKernel::ring(25, 25);
        let params = FieldParams::new(FieldSize::new(320, 320), &kernel, 5);
        let u = FieldUniform::from(&params);
        assert_eq!((u.field_width, u.field_height), (320, 320));
        assert_eq!((u.kernel_width, u.kernel_height), (25, 25));
        assert_eq!(u.kernel_mult, 1.0 / 625.0);
        assert_eq!(u.seed, 5);
    }

    #[test]
    fn cursor_uniform_from_params() {
        let params = PaintParams {
            cursor_rad_sqr: 400.0,
            cursor_fill: 1.0,
            cursor_x: -3,
            cursor_y: 12,
            draw_offset_x: 0,
            draw_offset_y: 64,
        };
        let u = CursorUniform::from(&params);
        assert_eq!(u.rad_sqr, 400.0);
        assert_eq!((u.x, u.y), (-3, 12));
        assert_eq!((u.offset_x, u.offset_y), (0, 64));
        assert_eq!(bytemuck::bytes_of(&u).len(), 32);
    }

    #[test]
    fn grid_bytes_is_four_per_cell() {
        assert_eq!(grid_bytes(FieldSize::new(1024, 1024)), 4 * 1024 * 1024);
    }
}

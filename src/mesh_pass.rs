//! The scene render pass.
//!
//! [`MeshPass`] owns the single render pipeline every object is drawn with,
//! the depth buffer, and a uniform buffer holding one [`DrawUniforms`] record
//! per draw.
//!
//! # Architecture
//!
//! The pipeline uses two bind groups:
//! - **Group 0**: The per-draw uniform record, selected with a dynamic offset
//! - **Group 1**: The terrain texture and sampler (a 1x1 white texture when
//!   the terrain has none)
//!
//! All records for a frame are written in one `write_buffer` call before the
//! pass is encoded, so each draw reads its own uniforms.
//!
//! # Depth Buffer
//!
//! The depth buffer is recreated whenever the surface size changes; see
//! [`MeshPass::ensure_depth_size`].

use std::borrow::Cow;
use std::num::NonZeroU64;
use std::path::Path;

use crate::draw_plan::{DrawRecord, DrawUniforms};
use crate::error::{Result, ViewerError};
use crate::gpu::GpuContext;
use crate::mesh::Vertex3d;
use crate::scene::SceneState;
use crate::texture::Texture;

/// Depth format of the scene pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Shader compiled into the binary, used when the asset directory has none.
pub const BUILTIN_SHADER: &str = include_str!("shaders/scene.wgsl");

/// WGSL source for the scene pipeline.
pub struct ShaderSource {
    pub label: String,
    pub code: Cow<'static, str>,
}

impl ShaderSource {
    /// Reads `path` when it exists, otherwise returns the built-in shader.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No {} found, using built-in shader", path.display());
            return Ok(Self::builtin());
        }
        let code = std::fs::read_to_string(path).map_err(|source| ViewerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded shader {}", path.display());
        Ok(Self {
            label: path.display().to_string(),
            code: Cow::Owned(code),
        })
    }

    pub fn builtin() -> Self {
        Self {
            label: "scene.wgsl".to_string(),
            code: Cow::Borrowed(BUILTIN_SHADER),
        }
    }
}

/// Byte distance between consecutive uniform records in the buffer.
fn record_stride(alignment: u32) -> u64 {
    let size = std::mem::size_of::<DrawUniforms>() as u64;
    let alignment = alignment.max(1) as u64;
    size.div_ceil(alignment) * alignment
}

/// Lays records out at `stride` byte intervals.
fn pack_records(records: &[DrawRecord], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; records.len() * stride];
    for (chunk, record) in bytes.chunks_exact_mut(stride).zip(records) {
        let src = bytemuck::bytes_of(&record.uniforms);
        chunk[..src.len()].copy_from_slice(src);
    }
    bytes
}

/// Renders the scene with depth testing and back-face culling.
pub struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_capacity: usize,
    record_stride: u64,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group: wgpu::BindGroup,
    default_texture: Texture,
    /// The depth texture used for depth testing.
    pub(crate) depth_texture: wgpu::Texture,
    /// View into the depth texture for render pass attachment.
    pub(crate) depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl MeshPass {
    /// Builds the pipeline from `shader`.
    ///
    /// Compilation and validation errors are caught in an error scope and
    /// returned as [`ViewerError::Shader`].
    pub fn new(gpu: &GpuContext, shader: &ShaderSource) -> Result<Self> {
        let device = &gpu.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&shader.label),
            source: wgpu::ShaderSource::Wgsl(shader.code.clone()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniforms Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ViewerError::Shader {
                name: shader.label.clone(),
                message: error.to_string(),
            });
        }

        let record_stride = record_stride(device.limits().min_uniform_buffer_offset_alignment);
        // Terrain, two pads of a few parts each, vehicle.
        let uniform_capacity = 16;
        let (uniform_buffer, uniform_bind_group) =
            Self::create_uniforms(gpu, &uniform_layout, record_stride, uniform_capacity);

        let default_texture =
            Texture::from_rgba(gpu, &[255, 255, 255, 255], 1, 1, "Default White Texture");
        let texture_bind_group =
            Self::create_texture_bind_group(gpu, &texture_bind_group_layout, &default_texture);

        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);

        Ok(Self {
            pipeline,
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_capacity,
            record_stride,
            texture_bind_group_layout,
            texture_bind_group,
            default_texture,
            depth_texture,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        })
    }

    fn create_uniforms(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniforms Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Grows the uniform buffer to hold at least `records` draws.
    fn ensure_uniform_capacity(&mut self, gpu: &GpuContext, records: usize) {
        if records <= self.uniform_capacity {
            return;
        }
        let capacity = records.next_power_of_two();
        log::debug!("Growing draw uniform buffer to {capacity} records");
        self.uniform_buffer.destroy();
        let (buffer, bind_group) =
            Self::create_uniforms(gpu, &self.uniform_layout, self.record_stride, capacity);
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
    }

    fn create_texture_bind_group(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        texture: &Texture,
    ) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    /// Binds the terrain texture, or the white fallback for `None`.
    pub fn set_texture(&mut self, gpu: &GpuContext, texture: Option<&Texture>) {
        let texture = texture.unwrap_or(&self.default_texture);
        self.texture_bind_group =
            Self::create_texture_bind_group(gpu, &self.texture_bind_group_layout, texture);
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Ensures the depth buffer matches the current screen size.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_texture.destroy();
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Clears `target` and draws every planned record.
    ///
    /// Records whose mesh is missing or empty are skipped.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        target: &wgpu::TextureView,
        clear_color: wgpu::Color,
        scene: &SceneState,
        plan: &[DrawRecord],
    ) {
        self.ensure_depth_size(gpu);
        self.ensure_uniform_capacity(gpu, plan.len());

        if !plan.is_empty() {
            let bytes = pack_records(plan, self.record_stride);
            gpu.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(1, &self.texture_bind_group, &[]);

            for (i, record) in plan.iter().enumerate() {
                let Some(mesh) = scene.mesh(record.target) else {
                    continue;
                };
                if mesh.index_count() == 0 {
                    continue;
                }
                let offset = (i as u64 * self.record_stride) as u32;
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count(), 0, 0..1);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Frees the pass's own GPU resources.
    pub fn destroy(&self) {
        self.uniform_buffer.destroy();
        self.depth_texture.destroy();
        self.default_texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw_plan::DrawTarget;

    #[test]
    fn stride_respects_alignment() {
        assert_eq!(record_stride(256), 256);
        assert_eq!(record_stride(64), 256);
        assert_eq!(record_stride(16), 208);
        assert_eq!(record_stride(512), 512);
    }

    #[test]
    fn records_land_at_stride_offsets() {
        let second = DrawUniforms {
            use_texture: 1,
            ..Default::default()
        };
        let records = [
            DrawRecord {
                target: DrawTarget::Terrain,
                uniforms: DrawUniforms::default(),
            },
            DrawRecord {
                target: DrawTarget::Vehicle,
                uniforms: second,
            },
        ];

        let bytes = pack_records(&records, 256);
        assert_eq!(bytes.len(), 512);
        let size = std::mem::size_of::<DrawUniforms>();
        let decoded: DrawUniforms = bytemuck::pod_read_unaligned(&bytes[256..256 + size]);
        assert_eq!(decoded.use_texture, 1);
        assert!(bytes[size..256].iter().all(|&b| b == 0));
    }

    #[test]
    fn builtin_shader_declares_entry_points() {
        assert!(BUILTIN_SHADER.contains("fn vs("));
        assert!(BUILTIN_SHADER.contains("fn fs("));
    }
}

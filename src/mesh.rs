//! GPU-resident meshes and the vertex format they share.
//!
//! Every mesh in the viewer, whether it came from an OBJ file or from the
//! procedural builder, uses the same interleaved [`Vertex3d`] layout:
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |
//!
//! That is eight floats (32 bytes) per vertex. The layout is exposed as
//! [`Vertex3d::LAYOUT`] for pipeline creation.

use crate::geometry::MeshData;
use crate::gpu::GpuContext;
use glam::Vec3;

/// A vertex with position, normal, and texture coordinates.
///
/// `#[repr(C)]` plus [`bytemuck::Pod`] lets a `&[Vertex3d]` be handed to the
/// GPU as raw bytes without copying.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// Object-space position.
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// Vertex buffer layout: position (loc 0), normal (loc 1), uv (loc 2).
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    /// Creates a new vertex.
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// GPU-resident geometry: vertex buffer, index buffer and an optional flat color.
///
/// Meshes are immutable once uploaded. `material_color` is set for meshes that
/// are drawn with a per-draw color instead of the terrain texture (landing pad
/// sub-meshes and the vehicle).
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
    /// Flat RGB color for material-colored draws.
    pub material_color: Option<Vec3>,
}

impl Mesh {
    /// Uploads `data` into fresh vertex and index buffers.
    ///
    /// An empty mesh is valid but draws nothing.
    pub fn new(gpu: &GpuContext, data: &MeshData, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.index_count(),
            material_color: None,
        }
    }

    /// Sets the flat material color.
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.material_color = Some(color);
        self
    }

    /// Number of indices submitted per draw.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Frees the GPU buffers immediately instead of waiting for drop.
    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

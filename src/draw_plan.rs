//! Per-frame draw list.
//!
//! The whole frame is drawn with one pipeline and one uniform layout. Before
//! any GPU work, [`plan_frame`] walks the scene in draw order and records the
//! uniform block each draw sees. Uniform state is sticky across draws, exactly
//! like a reused shader program: a draw only changes what it needs, and the
//! flags a group turned on are turned back off afterwards.
//!
//! Draw order is fixed: terrain, every pad sub-mesh at the first pad, every
//! pad sub-mesh at the second pad, then the vehicle.

use glam::Vec3;

use crate::math::Mat44;

/// World-space direction toward the light (before normalization).
pub const LIGHT_DIRECTION: Vec3 = Vec3::new(0.0, 1.0, -1.0);
pub const AMBIENT: Vec3 = Vec3::splat(0.2);
pub const DIFFUSE: Vec3 = Vec3::splat(0.8);

/// Uniform block shared by every draw.
///
/// Matrices are column-major (already transposed from [`Mat44`]'s row-major
/// storage). Vectors are padded to 16 bytes to match WGSL's uniform layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    /// Projection · view · model.
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub material_color: [f32; 4],
    pub use_texture: u32,
    pub use_material_color: u32,
    pub _padding: [u32; 2],
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self {
            mvp: Mat44::IDENTITY.to_gpu(),
            model: Mat44::IDENTITY.to_gpu(),
            light_dir: LIGHT_DIRECTION.normalize().extend(0.0).to_array(),
            ambient: AMBIENT.extend(1.0).to_array(),
            diffuse: DIFFUSE.extend(1.0).to_array(),
            material_color: [1.0; 4],
            use_texture: 0,
            use_material_color: 0,
            _padding: [0; 2],
        }
    }
}

/// Which mesh a draw refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawTarget {
    Terrain,
    /// Pad sub-mesh by index.
    Pad(usize),
    Vehicle,
}

/// One recorded draw: the mesh and the uniforms in effect when it is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRecord {
    pub target: DrawTarget,
    pub uniforms: DrawUniforms,
}

/// Everything the planner needs to know about the scene this frame.
#[derive(Clone, Debug)]
pub struct FrameInputs<'a> {
    /// Clip-space projection as uploaded (depth range already remapped).
    pub projection: Mat44,
    pub view: Mat44,
    pub has_texture: bool,
    /// Color of each pad sub-mesh, in draw order.
    pub pad_colors: &'a [Vec3],
    pub pad_positions: [Vec3; 2],
    /// Vehicle color, or `None` when there is no vehicle to draw.
    pub vehicle: Option<Vec3>,
    pub vehicle_position: Vec3,
}

/// Sticky uniform state, mirroring a bound shader program.
struct UniformState {
    current: DrawUniforms,
    projection_view: Mat44,
    records: Vec<DrawRecord>,
}

impl UniformState {
    fn new(inputs: &FrameInputs) -> Self {
        Self {
            current: DrawUniforms::default(),
            projection_view: inputs.projection * inputs.view,
            records: Vec::with_capacity(2 + 2 * inputs.pad_colors.len()),
        }
    }

    fn set_model(&mut self, model: Mat44) {
        self.current.mvp = (self.projection_view * model).to_gpu();
        self.current.model = model.to_gpu();
    }

    fn set_use_texture(&mut self, on: bool) {
        self.current.use_texture = on as u32;
    }

    fn set_use_material_color(&mut self, on: bool) {
        self.current.use_material_color = on as u32;
    }

    fn set_material_color(&mut self, color: Vec3) {
        self.current.material_color = color.extend(1.0).to_array();
    }

    fn draw(&mut self, target: DrawTarget) {
        self.records.push(DrawRecord {
            target,
            uniforms: self.current,
        });
    }
}

/// Records every draw of the frame in order.
pub fn plan_frame(inputs: &FrameInputs) -> Vec<DrawRecord> {
    let mut state = UniformState::new(inputs);

    state.set_model(Mat44::IDENTITY);
    state.set_use_texture(inputs.has_texture);
    state.draw(DrawTarget::Terrain);

    if !inputs.pad_colors.is_empty() {
        state.set_use_texture(false);
        state.set_use_material_color(true);
        for position in inputs.pad_positions {
            state.set_model(Mat44::translation(position));
            for (index, &color) in inputs.pad_colors.iter().enumerate() {
                state.set_material_color(color);
                state.draw(DrawTarget::Pad(index));
            }
        }
        state.set_use_texture(inputs.has_texture);
        state.set_use_material_color(false);
    }

    if let Some(color) = inputs.vehicle {
        state.set_use_texture(false);
        state.set_use_material_color(true);
        state.set_model(Mat44::translation(inputs.vehicle_position));
        state.set_material_color(color);
        state.draw(DrawTarget::Vehicle);
        state.set_use_material_color(false);
    }

    state.records
}

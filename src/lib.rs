//! # Landfall
//!
//! **A small terrain viewer: an island, two landing pads and a rocket.**
//!
//! Landfall loads a textured terrain model, instances a multi-material landing
//! pad at two spots derived from the terrain bounds, builds a vehicle out of
//! boxes, cylinders and spheres, and lets you fly around it all with a
//! free-look camera under a single directional light.
//!
//! ## Quick Start
//!
//! ```no_run
//! use landfall::{ViewerConfig, run};
//!
//! fn main() -> landfall::Result<()> {
//!     run(ViewerConfig::new().asset_dir("assets/cw2"))
//! }
//! ```
//!
//! ## Controls
//!
//! | Input | Action |
//! |---|---|
//! | W / S | forward / back |
//! | A / D | left / right |
//! | E / Q | up / down |
//! | Shift | 5× speed |
//! | Ctrl | 0.2× speed |
//! | Right mouse | toggle mouselook |
//! | Escape | quit |
//!
//! ## Layout
//!
//! Everything that does not need a GPU is plain data and plain functions:
//! the [`Mat44`] kernel, primitive builders, OBJ ingestion, instance
//! placement, the camera controller and the per-frame draw plan. The GPU side
//! ([`GpuContext`], [`Mesh`], [`Texture`], [`MeshPass`]) only uploads and
//! draws what those produce.

mod app;
mod camera;
mod config;
mod draw_plan;
mod error;
mod freelook_camera;
mod geometry;
mod gpu;
mod input;
mod math;
mod mesh;
mod mesh_pass;
mod obj;
mod placement;
mod primitives;
mod scene;
mod texture;

pub use app::run;
pub use camera::{Camera, MAX_PITCH, PITCH_MARGIN, clamp_pitch};
pub use config::{CONFIG_FILE, ViewerConfig};
pub use draw_plan::{
    AMBIENT, DIFFUSE, DrawRecord, DrawTarget, DrawUniforms, FrameInputs, LIGHT_DIRECTION,
    plan_frame,
};
pub use error::{Result, ViewerError};
pub use freelook_camera::{FAST_MULTIPLIER, FreelookController, SLOW_MULTIPLIER};
pub use geometry::{Bounds, MeshData};
pub use gpu::GpuContext;
pub use input::InputState;
pub use math::Mat44;
pub use mesh::{Mesh, Vertex3d};
pub use mesh_pass::{BUILTIN_SHADER, DEPTH_FORMAT, MeshPass, ShaderSource};
pub use obj::{
    DEFAULT_MATERIAL_COLOR, DEFAULT_NORMAL, NO_MATERIAL, ObjIndex, ObjMaterial, ObjScene,
    ObjShape, PadPart, pad_parts, terrain_mesh,
};
pub use placement::{
    MIN_SEPARATION_FRACTION, Placement, VEHICLE_LIFT, WATER_LEVEL, place, separate,
};
pub use primitives::{VEHICLE_COLOR, build_vehicle, push_box, push_cylinder, push_sphere};
pub use scene::SceneState;
pub use texture::{TexelFormat, Texture, TextureImage, fit_within, mip_level_count};

// Re-export glam vector types for convenience
pub use glam::{Vec2, Vec3, Vec4};

// Re-export the winit key codes the controller reads
pub use winit::keyboard::KeyCode;

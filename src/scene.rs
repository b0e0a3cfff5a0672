//! Scene assembly and ownership.
//!
//! [`SceneState`] owns every GPU resource the viewer draws plus the camera and
//! input state that drive it. It is built once after the render pipeline is
//! ready and released when the window closes.

use std::path::Path;

use glam::Vec3;

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::draw_plan::{DrawRecord, DrawTarget, FrameInputs, plan_frame};
use crate::error::{Result, ViewerError};
use crate::freelook_camera::FreelookController;
use crate::geometry::Bounds;
use crate::gpu::GpuContext;
use crate::input::InputState;
use crate::math::Mat44;
use crate::mesh::Mesh;
use crate::obj::{ObjScene, pad_parts, terrain_mesh};
use crate::placement::{Placement, place};
use crate::primitives::build_vehicle;
use crate::texture::Texture;

/// Starting pitch, looking slightly down.
pub const INITIAL_PITCH: f32 = -0.3;

/// Camera placed above and behind the terrain, facing -Z.
pub fn initial_camera(bounds: &Bounds) -> Camera {
    let c = bounds.center();
    let max = bounds.max_extent();
    Camera::new(
        Vec3::new(c.x, c.y + max * 0.5, c.z + max * 1.5),
        0.0,
        INITIAL_PITCH,
    )
}

/// Projection parameters fixed at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lens {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Lens {
    /// GL-style perspective remapped to wgpu's depth range.
    pub fn projection(&self, aspect: f32) -> Mat44 {
        Mat44::GL_TO_WGPU_DEPTH * Mat44::perspective(self.fov, aspect, self.near, self.far)
    }
}

/// Everything the viewer renders and the state that moves through it.
pub struct SceneState {
    pub camera: Camera,
    pub controller: FreelookController,
    pub input: InputState,
    pub lens: Lens,
    pub terrain: Mesh,
    pub terrain_bounds: Bounds,
    pub terrain_texture: Option<Texture>,
    /// One sub-mesh per pad material; empty if the pad failed to load.
    pub pad: Vec<Mesh>,
    pub vehicle: Mesh,
    pub placement: Placement,
}

impl SceneState {
    /// Loads terrain, texture and pad, builds the vehicle and places
    /// everything.
    ///
    /// Only terrain problems are fatal. A missing texture or pad is logged and
    /// the scene is drawn without it.
    pub fn load(gpu: &GpuContext, config: &ViewerConfig) -> Result<Self> {
        let terrain_path = config.resolve_terrain()?;
        log::info!("Loading terrain {}", terrain_path.display());
        let terrain_obj = ObjScene::load(&terrain_path)?;
        let terrain_data = terrain_mesh(&terrain_obj, &terrain_path)?;
        let terrain_bounds = terrain_data
            .bounds()
            .ok_or_else(|| ViewerError::EmptyTerrain {
                path: terrain_path.clone(),
            })?;

        log::info!(
            "Terrain: {} vertices, {} indices",
            terrain_data.vertex_count(),
            terrain_data.index_count()
        );
        log::info!("Has texture coordinates: {}", terrain_obj.has_texcoords());
        log::info!(
            "Terrain bounds: min {:?}, max {:?}",
            terrain_bounds.min,
            terrain_bounds.max
        );
        log::info!(
            "Terrain center {:?}, size {:?}",
            terrain_bounds.center(),
            terrain_bounds.size()
        );

        let terrain = Mesh::new(gpu, &terrain_data, "Terrain");

        let terrain_texture = if terrain_obj.has_texcoords() {
            let dir = terrain_path.parent().unwrap_or(Path::new("."));
            load_texture(gpu, &terrain_obj, dir, &config.texture_fallbacks)
        } else {
            None
        };

        let pad = load_pad(gpu, &config.pad_path());

        let vehicle_data = build_vehicle();
        log::info!(
            "Vehicle: {} vertices, {} indices",
            vehicle_data.vertex_count(),
            vehicle_data.index_count()
        );
        let vehicle = Mesh::new(gpu, &vehicle_data, "Vehicle").with_color(config.vehicle_color());

        let placement = place(&terrain_bounds, config.water_level);
        log::info!(
            "Landing pads at {:?} and {:?} ({:.2} apart)",
            placement.pads[0],
            placement.pads[1],
            placement.separation()
        );
        log::info!("Vehicle at {:?}", placement.vehicle);

        Ok(Self {
            camera: initial_camera(&terrain_bounds),
            controller: FreelookController::new()
                .speed(config.move_speed)
                .sensitivity(config.mouse_sensitivity),
            input: InputState::new(),
            lens: Lens {
                fov: config.fov_radians(),
                near: config.near,
                far: config.far,
            },
            terrain,
            terrain_bounds,
            terrain_texture,
            pad,
            vehicle,
            placement,
        })
    }

    /// The mesh a planned draw refers to.
    pub fn mesh(&self, target: DrawTarget) -> Option<&Mesh> {
        match target {
            DrawTarget::Terrain => Some(&self.terrain),
            DrawTarget::Pad(index) => self.pad.get(index),
            DrawTarget::Vehicle => Some(&self.vehicle),
        }
    }

    /// Advances the camera by one frame.
    pub fn update(&mut self, dt: f32) {
        self.controller.update(&mut self.camera, &self.input, dt);
    }

    /// Records this frame's draws for a surface with the given aspect ratio.
    pub fn plan(&self, aspect: f32) -> Vec<DrawRecord> {
        let pad_colors: Vec<Vec3> = self
            .pad
            .iter()
            .map(|m| m.material_color.unwrap_or(Vec3::ONE))
            .collect();
        let vehicle = (self.vehicle.index_count() > 0)
            .then(|| self.vehicle.material_color.unwrap_or(Vec3::ONE));

        plan_frame(&FrameInputs {
            projection: self.lens.projection(aspect),
            view: self.camera.view_matrix(),
            has_texture: self.terrain_texture.is_some(),
            pad_colors: &pad_colors,
            pad_positions: self.placement.pads,
            vehicle,
            vehicle_position: self.placement.vehicle,
        })
    }

    /// Frees every buffer and texture the scene owns.
    pub fn release(self) {
        self.terrain.destroy();
        if let Some(texture) = &self.terrain_texture {
            texture.destroy();
        }
        for mesh in &self.pad {
            mesh.destroy();
        }
        self.vehicle.destroy();
        log::debug!("Scene resources released");
    }
}

/// Tries each texture candidate in order; `None` if none loads.
fn load_texture(
    gpu: &GpuContext,
    terrain: &ObjScene,
    dir: &Path,
    fallbacks: &[String],
) -> Option<Texture> {
    let Some(path) = terrain
        .texture_candidates(dir, fallbacks)
        .into_iter()
        .find(|p| p.exists())
    else {
        log::warn!("No texture file found, rendering without texture");
        return None;
    };

    log::info!("Loading texture: {}", path.display());
    match Texture::from_file(gpu, &path) {
        Ok(texture) => Some(texture),
        Err(err) => {
            log::warn!("{err}");
            None
        }
    }
}

/// Loads the landing pad as one mesh per material; empty on failure.
fn load_pad(gpu: &GpuContext, path: &Path) -> Vec<Mesh> {
    let obj = match ObjScene::load(path) {
        Ok(obj) => obj,
        Err(err) => {
            log::warn!("Landing pad unavailable: {err}");
            return Vec::new();
        }
    };

    let parts = pad_parts(&obj);
    log::info!("Landing pad: {} material groups", parts.len());
    parts
        .into_iter()
        .map(|part| {
            log::info!(
                "  material {}: {} vertices, {} indices, color {:?}",
                part.material_id,
                part.mesh.vertex_count(),
                part.mesh.index_count(),
                part.color
            );
            let label = format!("Landing Pad Material {}", part.material_id);
            Mesh::new(gpu, &part.mesh, &label).with_color(part.color)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_starts_above_and_behind() {
        let bounds = Bounds {
            min: Vec3::new(-50.0, 0.0, -100.0),
            max: Vec3::new(50.0, 20.0, 100.0),
        };
        let camera = initial_camera(&bounds);
        assert_eq!(camera.position, Vec3::new(0.0, 110.0, 300.0));
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.pitch, INITIAL_PITCH);
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let lens = Lens {
            fov: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
        };
        let p = lens.projection(16.0 / 9.0);
        let near = p * glam::Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = p * glam::Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }
}

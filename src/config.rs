//! Viewer settings.
//!
//! Every field has a default, so a `viewer.toml` only needs the keys it wants
//! to change:
//!
//! ```toml
//! asset_dir = "assets/cw2"
//! fov_degrees = 75.0
//! move_speed = 25.0
//! clear_color = [0.1, 0.1, 0.15]
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};
use crate::placement::WATER_LEVEL;
use crate::primitives::VEHICLE_COLOR;

/// File looked up in the working directory by [`ViewerConfig::load_or_default`].
pub const CONFIG_FILE: &str = "viewer.toml";

/// Settings for window, assets, camera and scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Directory holding the shader, models and textures.
    pub asset_dir: PathBuf,
    /// Terrain candidates; the first one that exists is loaded.
    pub terrain_files: Vec<String>,
    pub pad_file: String,
    /// Texture names tried after the terrain materials' own texture.
    pub texture_fallbacks: Vec<String>,
    /// Vertical field of view.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Base camera speed in units per second.
    pub move_speed: f32,
    /// Radians per pixel.
    pub mouse_sensitivity: f32,
    pub clear_color: [f32; 3],
    pub vehicle_color: [f32; 3],
    pub water_level: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Landfall".to_string(),
            width: 1280,
            height: 720,
            asset_dir: PathBuf::from("assets/cw2"),
            terrain_files: vec!["parlahti.obj".to_string(), "langerso.obj".to_string()],
            pad_file: "landingpad.obj".to_string(),
            texture_fallbacks: vec![
                "L4343A-4k.jpeg".to_string(),
                "langerso.jpg".to_string(),
                "langerso.png".to_string(),
            ],
            fov_degrees: 60.0,
            near: 0.1,
            far: 10_000.0,
            move_speed: 10.0,
            mouse_sensitivity: 0.002,
            clear_color: [0.2, 0.3, 0.4],
            vehicle_color: VEHICLE_COLOR.to_array(),
            water_level: WATER_LEVEL,
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `viewer.toml` from the working directory, or returns the
    /// defaults when it does not exist.
    pub fn load_or_default() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            let config = Self::load(path)?;
            log::info!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Reads a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ViewerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|message| ViewerError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parses TOML text, returning the parser's message on failure.
    pub fn from_toml(contents: &str) -> std::result::Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = dir.into();
        self
    }

    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self
    }

    pub fn clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    pub fn mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    /// Vertical field of view in radians.
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn vehicle_color(&self) -> Vec3 {
        Vec3::from(self.vehicle_color)
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.clear_color;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }

    /// First terrain file that exists under `asset_dir`.
    pub fn resolve_terrain(&self) -> Result<PathBuf> {
        let found = self
            .terrain_files
            .iter()
            .position(|name| self.asset_dir.join(name).exists());
        match found {
            Some(index) => {
                if index > 0 {
                    log::info!(
                        "{} not found, using {}",
                        self.terrain_files[0],
                        self.terrain_files[index]
                    );
                }
                Ok(self.asset_dir.join(&self.terrain_files[index]))
            }
            None => Err(ViewerError::MissingTerrain {
                dir: self.asset_dir.clone(),
                tried: self.terrain_files.clone(),
            }),
        }
    }

    pub fn pad_path(&self) -> PathBuf {
        self.asset_dir.join(&self.pad_file)
    }

    /// Optional shader override inside the asset directory.
    pub fn shader_path(&self) -> PathBuf {
        self.asset_dir.join("default.wgsl")
    }
}

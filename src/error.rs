//! Error type shared by every fallible startup step.
//!
//! Only initialization can fail. Once the first frame is drawn the viewer runs
//! until the window closes, so nothing in the frame loop returns a [`ViewerError`].

use std::path::PathBuf;

/// Errors that can stop the viewer from starting.
#[derive(thiserror::Error, Debug)]
pub enum ViewerError {
    /// The platform event loop could not be created or exited abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The window could not be created.
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    /// A presentation surface could not be created for the window.
    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// No adapter is compatible with the surface.
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The logical device could not be opened.
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The shader program failed to compile or validate.
    #[error("shader '{name}' failed to build: {message}")]
    Shader { name: String, message: String },

    /// A file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OBJ parser rejected a file.
    #[error("failed to load OBJ file '{}': {source}", path.display())]
    ObjParse {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    /// A shape still carries non-triangular faces after triangulation.
    #[error("failed to triangulate mesh '{shape}': face with {arity} vertices")]
    Triangulation { shape: String, arity: u32 },

    /// Terrain ingestion produced no indices, so there would be nothing to draw.
    #[error("no indices loaded from OBJ file '{}'", path.display())]
    EmptyTerrain { path: PathBuf },

    /// No terrain file from the configured list exists.
    #[error("no terrain model found in '{}' (tried {tried:?})", dir.display())]
    MissingTerrain { dir: PathBuf, tried: Vec<String> },

    /// A texture could not be decoded.
    #[error("failed to load texture '{}': {source}", path.display())]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The configuration file is malformed.
    #[error("invalid configuration '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ViewerError>;

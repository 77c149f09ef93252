//! Error types for firefly.
//!
//! The simulation itself never fails; errors only come from the edges:
//! building tweens, loading configurations and textures, and bringing up
//! the GPU and window for the viewer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a keyframe [`Tween`](crate::Tween).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TweenError {
    /// `times` and `values` have different lengths.
    #[error("tween has {times} keyframe times but {values} values")]
    LengthMismatch { times: usize, values: usize },
    /// A keyframe time is NaN or infinite.
    #[error("tween keyframe {index} has a non-finite time")]
    NonFiniteTime { index: usize },
    /// A keyframe time is smaller than the one before it.
    #[error("tween keyframe {index} goes back in time ({time} < {previous})")]
    Decreasing { index: usize, time: f32, previous: f32 },
}

/// Errors raised while loading or validating an [`EmitterConfig`](crate::EmitterConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    #[error("failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed JSON, wrong field types or unknown fields.
    #[error("failed to parse emitter config: {0}")]
    Json(#[from] serde_json::Error),
    /// A numeric field is out of its valid range.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors that can occur during texture loading.
#[derive(Debug, Error)]
pub enum TextureError {
    /// Failed to decode the image file.
    #[error("failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Raw pixel data does not match the stated dimensions.
    #[error("RGBA data is {actual} bytes, expected {expected} for {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The particle texture could not be prepared.
    #[error(transparent)]
    Texture(#[from] TextureError),
    /// The mesh handle does not belong to this renderer.
    #[error("no such particle mesh attached to the renderer")]
    NoMesh,
    /// The attribute buffers were resized after the mesh was attached.
    #[error("particle mesh holds {mesh} slots but the buffers hold {buffers}")]
    CapacityMismatch { mesh: usize, buffers: usize },
}

/// Errors that can occur when running the viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The emitter configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

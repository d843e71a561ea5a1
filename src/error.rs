//! Error types for PFE.
//!
//! The engine itself never fails: a missing container, surface or pointer
//! degrades to "nothing happens this frame". Errors only come from loading
//! configuration and from the native window host.

use thiserror::Error;

/// Errors that can occur while loading a [`FieldConfig`](crate::FieldConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid JSON for a field configuration.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The values parse but cannot be used.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur while setting up or using the GPU presenter.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with Vulkan/Metal/DX12/GL support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface ran out of memory while acquiring a frame.
    #[error("GPU surface out of memory")]
    OutOfMemory,
}

/// Errors that can occur when running the native window host.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create or run the event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization or presentation failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The configuration was rejected before the window opened.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

//! Error types for the ocean host

use thiserror::Error;

/// Result type for host-level operations
pub type Result<T> = std::result::Result<T, OceanError>;

/// Errors that can occur while setting up or running the ocean
#[derive(Error, Debug)]
pub enum OceanError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Displacement map error: {0}")]
    DisplacementMap(#[from] image::ImageError),
}

//! Errors raised while bringing up the window and GPU.

use std::fmt;

/// Errors that can occur during window and GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// The platform event loop could not be created.
    EventLoop(winit::error::EventLoopError),
    /// The window could not be created.
    Window(winit::error::OsError),
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            GpuError::Window(e) => write!(f, "Failed to create window: {}", e),
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found"),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::EventLoop(e) => Some(e),
            GpuError::Window(e) => Some(e),
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<winit::error::EventLoopError> for GpuError {
    fn from(e: winit::error::EventLoopError) -> Self {
        GpuError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for GpuError {
    fn from(e: winit::error::OsError) -> Self {
        GpuError::Window(e)
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

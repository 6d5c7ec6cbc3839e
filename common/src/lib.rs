//! Common utilities for the canvas simulations
//!
//! This crate provides shared graphics setup, the pixel-space camera and the
//! GPU error type used by the showcase binary.

pub mod graphics;
pub mod camera;
pub mod error;

pub use graphics::*;
pub use camera::*;
pub use error::GpuError;

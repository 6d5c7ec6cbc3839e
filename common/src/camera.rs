//! Camera for 2D canvas rendering

use glam::{Mat4, Vec2, Vec3};

/// Orthographic camera addressed in window pixels.
///
/// The origin sits at the top-left corner and y grows downwards, matching
/// the coordinate system of a drawing canvas.
#[derive(Debug, Clone)]
pub struct Camera2D {
    pub position: Vec3,
    pub viewport: Vec2,
}

impl Camera2D {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            viewport: Vec2::new(width.max(1.0), height.max(1.0)),
        }
    }

    /// Get the view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        let projection = Mat4::orthographic_rh(
            0.0,
            self.viewport.x,
            self.viewport.y,
            0.0,
            -1.0,
            1.0,
        );

        let view = Mat4::from_translation(-self.position);

        projection * view
    }

    pub fn update_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera_2d(camera: &Camera2D) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_top_left_maps_to_clip_corner() {
        let camera = Camera2D::new(400.0, 300.0);
        let clip = camera.view_projection() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.x + 1.0).abs() < 1e-5);
        assert!((clip.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_bottom_right_maps_to_clip_corner() {
        let camera = Camera2D::new(400.0, 300.0);
        let clip = camera.view_projection() * Vec4::new(400.0, 300.0, 0.0, 1.0);
        assert!((clip.x - 1.0).abs() < 1e-5);
        assert!((clip.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_viewport_is_clamped() {
        let mut camera = Camera2D::new(0.0, 0.0);
        assert_eq!(camera.viewport, Vec2::ONE);
        camera.update_viewport(800.0, 0.0);
        assert_eq!(camera.viewport, Vec2::new(800.0, 1.0));
    }
}

//! Camera state and its GPU uniform.
//!
//! A plain perspective camera; the engine orbits it slowly around the pipe
//! axis each frame.

use glam::{Mat4, Vec3};

/// Perspective camera defined by eye position, target, and projection
/// parameters.
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Camera {
    /// Camera placed to keep a bounding sphere fully in view.
    #[must_use]
    pub fn framing(center: Vec3, radius: f32, aspect: f32) -> Self {
        let fovy: f32 = 45.0;
        // Distance at which the sphere fits the vertical field of view,
        // with some margin.
        let distance =
            (radius.max(0.5) / (fovy.to_radians() * 0.5).sin()) * 1.4;
        let offset = Vec3::new(0.8, 0.45, 0.0).normalize() * distance;

        Self {
            eye: center + offset,
            target: center,
            // The engine orbits the eye in the XY plane around the pipe's
            // Z axis; Z up keeps look_at well-defined for every angle.
            up: Vec3::Z,
            aspect,
            fovy,
            znear: 0.1,
            zfar: distance + radius * 4.0 + 100.0,
        }
    }

    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        // perspective_rh already uses [0,1] depth range (wgpu/Vulkan
        // convention)
        let proj = Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        );
        proj * view
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform buffer holding the view-projection matrix and eye position.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Padding for GPU alignment.
    pub(crate) _pad: f32,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Create a new camera uniform with identity view-projection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            _pad: 0.0,
        }
    }

    /// Refresh the uniform from the camera state.
    pub fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.build_matrix().to_cols_array_2d();
        self.position = camera.eye.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_looks_at_center() {
        let center = Vec3::new(0.0, 0.0, 5.0);
        let camera = Camera::framing(center, 5.0, 1.6);
        assert_eq!(camera.target, center);
        assert!(camera.eye.distance(center) > 5.0);
    }

    #[test]
    fn test_matrix_is_finite() {
        let camera = Camera::framing(Vec3::ZERO, 1.0, 1.0);
        let matrix = camera.build_matrix();
        assert!(matrix.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_uniform_gpu_alignment() {
        // The uniform must be a multiple of 16 bytes for WGSL layout.
        assert_eq!(size_of::<CameraUniform>() % 16, 0);
    }

    #[test]
    fn test_uniform_tracks_camera() {
        let camera = Camera::framing(Vec3::ZERO, 2.0, 1.3);
        let mut uniform = CameraUniform::new();
        uniform.update(&camera);
        assert_eq!(uniform.position, <[f32; 3]>::from(camera.eye));
    }
}

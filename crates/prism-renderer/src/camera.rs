//! Camera uniform

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use prism_core::PerspectiveCamera;

/// Camera uniform buffer data
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    /// Projection times view.
    pub view_proj: [[f32; 4]; 4],
    /// Clip space back to world space, for the cube map background.
    pub inv_view_proj: [[f32; 4]; 4],
    /// Eye position (w unused).
    pub eye: [f32; 4],
    /// Camera right axis in world space, for point sprites.
    pub right: [f32; 4],
    /// Camera up axis in world space, for point sprites.
    pub up: [f32; 4],
    /// x: 1 when the shader must sRGB-encode its output.
    pub output: [f32; 4],
}

impl CameraUniform {
    /// Uniform for `camera` rendering into a target of `format`
    pub fn new(camera: &PerspectiveCamera, format: wgpu::TextureFormat) -> Self {
        let view_proj = camera.view_projection();
        let (right, up) = camera.basis();
        let encode = if format.is_srgb() { 0.0 } else { 1.0 };
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            eye: camera.position.extend(1.0).to_array(),
            right: right.extend(0.0).to_array(),
            up: up.extend(0.0).to_array(),
            output: [encode, 0.0, 0.0, 0.0],
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            inv_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            eye: [0.0, 0.0, 0.0, 1.0],
            right: [1.0, 0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0, 0.0],
            output: [0.0; 4],
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{Vec3, Vec4};
    use prism_core::Settings;

    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::from_settings(&Settings::default().perspective, 1.5)
    }

    #[test]
    fn test_uniform_matches_camera() {
        let camera = camera();
        let uniform = CameraUniform::new(&camera, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(uniform.eye[..3], camera.position.to_array());
        assert_eq!(uniform.output[0], 0.0);

        let inv = Mat4::from_cols_array_2d(&uniform.inv_view_proj);
        let vp = Mat4::from_cols_array_2d(&uniform.view_proj);
        let p = Vec4::new(0.3, -0.2, 0.5, 1.0);
        let back = inv * (vp * p);
        assert_relative_eq!(back.x / back.w, p.x, epsilon = 1e-4);
        assert_relative_eq!(back.z / back.w, p.z, epsilon = 1e-4);
    }

    #[test]
    fn test_sprite_axes_are_orthonormal() {
        let uniform = CameraUniform::new(&camera(), wgpu::TextureFormat::Bgra8Unorm);
        let right = Vec3::from_slice(&uniform.right[..3]);
        let up = Vec3::from_slice(&uniform.up[..3]);
        assert_relative_eq!(right.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(right.dot(up), 0.0, epsilon = 1e-5);
        assert_eq!(uniform.output[0], 1.0);
    }
}

//! Light uniform

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use prism_core::{Light, LightSource, ShadowFilter};

use crate::color::linear_rgb;

/// Light kinds as encoded for the shader
pub mod kind {
    /// No light in the scene
    pub const NONE: f32 = 0.0;
    /// Uniform ambient light
    pub const AMBIENT: f32 = 1.0;
    /// Sky / ground hemisphere light
    pub const HEMISPHERE: f32 = 2.0;
    /// Parallel rays from `position` towards the target
    pub const DIRECTIONAL: f32 = 3.0;
    /// Omnidirectional light at `position`
    pub const POINT: f32 = 4.0;
    /// Cone light at `position` aimed at the target
    pub const SPOT: f32 = 5.0;
}

/// Light uniform data shared by the shadow and main passes
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniform {
    /// Shadow camera projection times view.
    pub view_proj: [[f32; 4]; 4],
    /// xyz: position, w: kind.
    pub position: [f32; 4],
    /// xyz: travel direction, w: cosine of the spot half angle.
    pub direction: [f32; 4],
    /// rgb: linear color times intensity, w: range (0 = unlimited).
    pub color: [f32; 4],
    /// rgb: hemisphere ground color times intensity, w: decay exponent.
    pub ground_color: [f32; 4],
    /// x: shadows on, y: depth bias, z: PCF on, w: shadow map texel size.
    pub shadow: [f32; 4],
}

impl Default for LightUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0, 0.0, 0.0, kind::NONE],
            direction: [0.0, -1.0, 0.0, 1.0],
            color: [0.0; 4],
            ground_color: [0.0; 4],
            shadow: [0.0; 4],
        }
    }
}

impl LightUniform {
    /// Encode `light`; a disabled or missing light contributes nothing
    ///
    /// # Arguments
    /// * `shadows` - Whether shadow mapping is enabled on the render surface
    /// * `filter` - Shadow map filtering
    /// * `map_size` - Shadow map resolution
    pub fn new(light: Option<&Light>, shadows: bool, filter: ShadowFilter, map_size: u32) -> Self {
        let Some(light) = light.filter(|l| l.enabled) else {
            return Self::default();
        };

        let kind = match light.source {
            LightSource::Ambient => kind::AMBIENT,
            LightSource::Hemisphere => kind::HEMISPHERE,
            LightSource::Directional => kind::DIRECTIONAL,
            LightSource::Point => kind::POINT,
            LightSource::Spot => kind::SPOT,
        };
        let [r, g, b] = linear_rgb(light.color).map(|c| c * light.intensity);
        let [gr, gg, gb] = linear_rgb(light.ground_color).map(|c| c * light.intensity);

        let shadow = light.shadow().filter(|_| shadows);
        let (view_proj, shadow_params) = match shadow {
            Some(params) => (
                params.view_proj,
                [
                    1.0,
                    params.bias,
                    if filter == ShadowFilter::Pcf { 1.0 } else { 0.0 },
                    1.0 / map_size.max(1) as f32,
                ],
            ),
            None => (Mat4::IDENTITY, [0.0; 4]),
        };

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            position: light.position.extend(kind).to_array(),
            direction: light.direction().extend(light.angle.cos()).to_array(),
            color: [r, g, b, light.distance],
            ground_color: [gr, gg, gb, light.decay],
            shadow: shadow_params,
        }
    }

    /// Whether the shadow pass has to run
    pub fn casts_shadows(&self) -> bool {
        self.shadow[0] > 0.0
    }
}

#[cfg(test)]
mod tests {
    use prism_core::settings::{LightSettings, SceneSettings};

    use super::*;

    fn light(source: LightSource) -> Light {
        let settings = LightSettings {
            source,
            ..LightSettings::default()
        };
        Light::from_settings(&settings, &SceneSettings::default())
    }

    #[test]
    fn test_encodes_kind_and_intensity() {
        let sun = light(LightSource::Directional);
        let uniform = LightUniform::new(Some(&sun), true, ShadowFilter::Pcf, 1024);
        assert_eq!(uniform.position[3], kind::DIRECTIONAL);
        // White at intensity 2
        assert_eq!(uniform.color[..3], [2.0, 2.0, 2.0]);
        assert!(uniform.casts_shadows());
        assert_eq!(uniform.shadow[2], 1.0);
        assert_eq!(uniform.shadow[3], 1.0 / 1024.0);
    }

    #[test]
    fn test_disabled_light_is_dark() {
        let mut sun = light(LightSource::Directional);
        sun.enabled = false;
        let uniform = LightUniform::new(Some(&sun), true, ShadowFilter::Pcf, 1024);
        assert_eq!(uniform.position[3], kind::NONE);
        assert_eq!(uniform.color, [0.0; 4]);
        assert!(!LightUniform::new(None, true, ShadowFilter::Hard, 1024).casts_shadows());
    }

    #[test]
    fn test_shadows_follow_surface_and_light() {
        let sun = light(LightSource::Directional);
        assert!(!LightUniform::new(Some(&sun), false, ShadowFilter::Pcf, 1024).casts_shadows());

        let ambient = light(LightSource::Ambient);
        let uniform = LightUniform::new(Some(&ambient), true, ShadowFilter::Pcf, 1024);
        assert_eq!(uniform.position[3], kind::AMBIENT);
        assert!(!uniform.casts_shadows());

        let spot = light(LightSource::Spot);
        let uniform = LightUniform::new(Some(&spot), true, ShadowFilter::Hard, 2048);
        assert_eq!(uniform.shadow[2], 0.0);
        assert_eq!(uniform.direction[3], spot.angle.cos());
        assert_eq!(uniform.color[3], 50.0);
    }
}

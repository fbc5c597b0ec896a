//! The single scene light and its helper

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::constants::{
    HELPER_SIZE, LIGHT_DECAY, LIGHT_DISTANCE, POINT_HELPER_RADIUS, SHADOW_FAR, SHADOW_MAP_SIZE,
    SHADOW_NEAR, SHADOW_ORTHO_EXTENT,
};
use crate::settings::{LightSettings, LightSource, SceneSettings};

/// Visual helper drawn for a light
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HelperKind {
    /// Square of `size` facing the target plus a line to it
    Directional { size: f32 },
    /// Octahedron of `size` colored sky over ground
    Hemisphere { size: f32 },
    /// Wire sphere of `radius` around the light
    Point { radius: f32 },
    /// Cone outlining the spot angle
    Spot,
}

/// Shadow camera of a light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    pub view_proj: Mat4,
    pub map_size: u32,
    pub bias: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub source: LightSource,
    pub color: Color,
    /// Hemisphere ground color
    pub ground_color: Color,
    pub intensity: f32,
    pub position: Vec3,
    /// Point the light aims at (directional and spot)
    pub target: Vec3,
    pub cast_shadow: bool,
    /// Spot cone half angle (radians)
    pub angle: f32,
    /// Range of point and spot lights
    pub distance: f32,
    pub decay: f32,
    pub enabled: bool,
}

impl Light {
    /// Build the light selected in the settings
    ///
    /// The hemisphere light takes its colors from the background and the
    /// ground plane rather than the light color.
    pub fn from_settings(light: &LightSettings, scene: &SceneSettings) -> Self {
        let (color, ground_color) = match light.source {
            LightSource::Hemisphere => (scene.color, scene.plane_color),
            _ => (light.color, Color::BLACK),
        };
        let distance = match light.source {
            LightSource::Point | LightSource::Spot => LIGHT_DISTANCE,
            _ => 0.0,
        };
        Self {
            source: light.source,
            color,
            ground_color,
            intensity: light.intensity,
            position: light.position,
            target: Vec3::ZERO,
            cast_shadow: light.shadow,
            angle: light.angle,
            distance,
            decay: LIGHT_DECAY,
            enabled: light.enabled,
        }
    }

    /// Helper associated with this kind of light; ambient has none
    pub fn helper(&self) -> Option<HelperKind> {
        match self.source {
            LightSource::Ambient => None,
            LightSource::Hemisphere => Some(HelperKind::Hemisphere { size: HELPER_SIZE }),
            LightSource::Directional => Some(HelperKind::Directional { size: HELPER_SIZE }),
            LightSource::Point => Some(HelperKind::Point {
                radius: POINT_HELPER_RADIUS,
            }),
            LightSource::Spot => Some(HelperKind::Spot),
        }
    }

    /// Whether the kind of light can cast shadows at all
    pub fn supports_shadows(&self) -> bool {
        matches!(
            self.source,
            LightSource::Directional | LightSource::Point | LightSource::Spot
        )
    }

    /// Normalized direction the light travels in
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Y)
    }

    /// Shadow camera, if this light currently casts shadows
    pub fn shadow(&self) -> Option<ShadowParams> {
        if !self.enabled || !self.cast_shadow || !self.supports_shadows() {
            return None;
        }

        let direction = self.direction();
        let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        // A light sitting on its target looks along the fallback direction
        let eye = if self.position.distance_squared(self.target) < 1e-12 {
            self.target - direction
        } else {
            self.position
        };
        let view = Mat4::look_at_rh(eye, self.target, up);
        let proj = match self.source {
            LightSource::Directional => {
                let e = SHADOW_ORTHO_EXTENT;
                Mat4::orthographic_rh(-e, e, -e, e, SHADOW_NEAR, SHADOW_FAR)
            }
            LightSource::Spot => {
                Mat4::perspective_rh((self.angle * 2.0).max(0.01), 1.0, SHADOW_NEAR, SHADOW_FAR)
            }
            _ => Mat4::perspective_rh(FRAC_PI_2, 1.0, SHADOW_NEAR, SHADOW_FAR),
        };

        let bias = match self.source {
            LightSource::Directional => 0.0005,
            _ => 0.002,
        };
        Some(ShadowParams {
            view_proj: proj * view,
            map_size: SHADOW_MAP_SIZE,
            bias,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn light(source: LightSource) -> Light {
        let settings = LightSettings {
            source,
            ..LightSettings::default()
        };
        Light::from_settings(&settings, &SceneSettings::default())
    }

    #[test]
    fn test_helpers_per_kind() {
        assert_eq!(light(LightSource::Ambient).helper(), None);
        assert_eq!(
            light(LightSource::Directional).helper(),
            Some(HelperKind::Directional { size: 2.0 })
        );
        assert_eq!(light(LightSource::Spot).helper(), Some(HelperKind::Spot));
    }

    #[test]
    fn test_hemisphere_uses_scene_colors() {
        let scene = SceneSettings::default();
        let hemi = light(LightSource::Hemisphere);
        assert_eq!(hemi.color, scene.color);
        assert_eq!(hemi.ground_color, scene.plane_color);
    }

    #[test]
    fn test_point_and_spot_range() {
        assert_eq!(light(LightSource::Point).distance, 50.0);
        assert_eq!(light(LightSource::Directional).distance, 0.0);
    }

    #[test]
    fn test_shadow_camera() {
        assert!(light(LightSource::Ambient).shadow().is_none());
        assert!(light(LightSource::Hemisphere).shadow().is_none());

        let sun = light(LightSource::Directional);
        let shadow = sun.shadow().unwrap();
        assert_eq!(shadow.map_size, 1024);
        // Scene origin lands in the middle of the shadow map
        let center = shadow.view_proj.project_point3(Vec3::ZERO);
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-5);
        assert!(center.z > 0.0 && center.z < 1.0);

        let mut off = sun.clone();
        off.enabled = false;
        assert!(off.shadow().is_none());
    }

    #[test]
    fn test_vertical_light_has_valid_shadow() {
        let mut top = light(LightSource::Spot);
        top.position = Vec3::new(0.0, 8.0, 0.0);
        let shadow = top.shadow().unwrap();
        assert!(shadow.view_proj.is_finite());
    }

    #[test]
    fn test_light_on_its_target_has_valid_shadow() {
        for source in [LightSource::Directional, LightSource::Point, LightSource::Spot] {
            let mut centered = light(source);
            centered.position = centered.target;
            let shadow = centered.shadow().unwrap();
            assert!(shadow.view_proj.is_finite(), "{source:?}");
        }
    }
}

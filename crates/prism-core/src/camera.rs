//! Perspective camera and damped orbit controls

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::constants::{ORBIT_DAMPING, ORBIT_MAX_DISTANCE, ORBIT_MAX_POLAR, ORBIT_MIN_DISTANCE};
use crate::settings::PerspectiveSettings;

/// Perspective camera with a cached projection matrix
///
/// Changing `fov`, `near`, `far` or `aspect` only takes effect after
/// [`PerspectiveCamera::update_projection_matrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::from_settings(&PerspectiveSettings::default(), 1.0)
    }
}

impl PerspectiveCamera {
    pub fn from_settings(settings: &PerspectiveSettings, aspect: f32) -> Self {
        let mut camera = Self {
            position: settings.position,
            target: settings.look,
            up: Vec3::Y,
            fov: settings.fov,
            aspect,
            near: settings.near,
            far: settings.far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the cached projection from fov, aspect, near and far
    pub fn update_projection_matrix(&mut self) {
        let far = self.far.max(self.near + 1e-3);
        self.projection = Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect.max(1e-4),
            self.near,
            far,
        );
    }

    /// Update aspect ratio and projection
    pub fn set_aspect(&mut self, aspect: f32) {
        if (aspect - self.aspect).abs() > f32::EPSILON {
            self.aspect = aspect;
            self.update_projection_matrix();
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        let (target, up) = self.look_frame();
        Mat4::look_at_rh(self.position, target, up)
    }

    /// Look target and up vector that keep the view matrix finite
    ///
    /// A target on the camera position is pushed along -Z; a view parallel
    /// to `up` swaps in the Z axis.
    fn look_frame(&self) -> (Vec3, Vec3) {
        let target = if self.position.distance_squared(self.target) < 1e-12 {
            self.position + Vec3::NEG_Z
        } else {
            self.target
        };
        let forward = (target - self.position).normalize();
        let up = if forward.cross(self.up).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            self.up
        };
        (target, up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// Camera space right and up axes in world space
    pub fn basis(&self) -> (Vec3, Vec3) {
        let (target, up) = self.look_frame();
        let forward = (target - self.position).normalize();
        let right = forward.cross(up).normalize();
        (right, right.cross(forward))
    }

    /// Convert a viewport position to a world ray
    ///
    /// # Arguments
    /// * `screen` - Position in pixels, origin at the top left
    /// * `size` - Viewport size in pixels
    ///
    /// # Returns
    /// Ray origin on the near plane and normalized direction
    pub fn screen_to_ray(&self, screen: Vec2, size: Vec2) -> (Vec3, Vec3) {
        let ndc_x = 2.0 * screen.x / size.x.max(1.0) - 1.0;
        let ndc_y = 1.0 - 2.0 * screen.y / size.y.max(1.0);

        let inv = self.view_projection().inverse();
        // Depth runs 0..1 in clip space
        let near = inv * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        (near, (far - near).normalize_or(Vec3::NEG_Z))
    }

    /// World units per pixel at `point`
    pub fn pixel_size_at(&self, point: Vec3, viewport_height: f32) -> f32 {
        let distance = (point - self.position).length();
        2.0 * distance * (self.fov.to_radians() * 0.5).tan() / viewport_height.max(1.0)
    }
}

/// Damped orbit, dolly and pan around the camera target
///
/// Input only accumulates deltas; [`OrbitControls::update`] applies a
/// `damping` share of them to the camera once per frame.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enabled: bool,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    theta_delta: f32,
    phi_delta: f32,
    pan_offset: Vec3,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enabled: true,
            damping: ORBIT_DAMPING,
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
            min_polar: 0.0,
            max_polar: ORBIT_MAX_POLAR,
            theta_delta: 0.0,
            phi_delta: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotate from a pointer drag in pixels
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if !self.enabled {
            return;
        }
        let h = viewport_height.max(1.0);
        self.theta_delta -= std::f32::consts::TAU * delta.x / h;
        self.phi_delta -= std::f32::consts::TAU * delta.y / h;
    }

    /// Pan from a pointer drag in pixels
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32, camera: &PerspectiveCamera) {
        if !self.enabled {
            return;
        }
        let distance = (camera.position - camera.target).length()
            * (camera.fov.to_radians() * 0.5).tan();
        let h = viewport_height.max(1.0);
        let (right, up) = camera.basis();
        self.pan_offset += right * (-2.0 * delta.x * distance / h);
        self.pan_offset += up * (2.0 * delta.y * distance / h);
    }

    /// Dolly by wheel steps; positive steps move closer
    pub fn zoom(&mut self, steps: f32) {
        if !self.enabled {
            return;
        }
        self.scale *= 0.95_f32.powf(steps);
    }

    /// Drop pending motion
    pub fn reset(&mut self) {
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }

    /// Whether damped motion is still settling
    pub fn is_moving(&self) -> bool {
        self.theta_delta.abs() > 1e-5
            || self.phi_delta.abs() > 1e-5
            || self.pan_offset.length_squared() > 1e-10
            || (self.scale - 1.0).abs() > 1e-6
    }

    /// Apply accumulated motion to `camera`
    ///
    /// Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if !self.is_moving() {
            return false;
        }
        let before = (camera.position, camera.target);

        let offset = camera.position - camera.target;
        let mut radius = offset.length().max(1e-6);
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.theta_delta * self.damping;
        phi += self.phi_delta * self.damping;
        phi = phi
            .clamp(self.min_polar, self.max_polar)
            .clamp(1e-6, std::f32::consts::PI - 1e-6);

        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        camera.target += self.pan_offset * self.damping;

        let sin_phi = phi.sin();
        camera.position = camera.target
            + Vec3::new(
                radius * sin_phi * theta.sin(),
                radius * phi.cos(),
                radius * sin_phi * theta.cos(),
            );

        let keep = 1.0 - self.damping;
        self.theta_delta *= keep;
        self.phi_delta *= keep;
        self.pan_offset *= keep;
        self.scale = 1.0;
        if !self.is_moving() {
            self.reset();
        }

        before.0.distance_squared(camera.position) > 1e-12
            || before.1.distance_squared(camera.target) > 1e-12
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_projection_is_cached() {
        let mut camera = PerspectiveCamera::default();
        let before = camera.projection_matrix();
        camera.fov = 60.0;
        assert_eq!(camera.projection_matrix(), before);
        camera.update_projection_matrix();
        assert_ne!(camera.projection_matrix(), before);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = PerspectiveCamera::default();
        let (origin, dir) = camera.screen_to_ray(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0));
        let expected = (camera.target - camera.position).normalize();
        assert_relative_eq!(dir.dot(expected), 1.0, epsilon = 1e-4);
        assert!(origin.distance(camera.position) < camera.near * 3.0);
    }

    #[test]
    fn test_degenerate_views_stay_finite() {
        let mut camera = PerspectiveCamera::default();
        for (position, target) in [
            (Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO),
            (Vec3::new(0.0, -5.0, 0.0), Vec3::ZERO),
            (Vec3::ZERO, Vec3::ZERO),
        ] {
            camera.position = position;
            camera.target = target;
            assert!(camera.view_projection().is_finite(), "{position} -> {target}");

            let (origin, dir) =
                camera.screen_to_ray(Vec2::new(200.0, 100.0), Vec2::new(800.0, 600.0));
            assert!(origin.is_finite() && dir.is_finite());
            let (right, up) = camera.basis();
            assert_relative_eq!(right.dot(up), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_zoom_respects_distance_limits() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();
        for _ in 0..500 {
            controls.zoom(5.0);
            controls.update(&mut camera);
        }
        let distance = camera.position.distance(camera.target);
        assert_relative_eq!(distance, ORBIT_MIN_DISTANCE, epsilon = 1e-4);
    }

    #[test]
    fn test_polar_angle_stays_above_ground() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();
        controls.rotate(Vec2::new(0.0, -2000.0), 600.0);
        for _ in 0..100 {
            controls.update(&mut camera);
        }
        assert!(camera.position.y >= camera.target.y - 1e-4);
    }

    #[test]
    fn test_damping_settles() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();
        controls.rotate(Vec2::new(100.0, 0.0), 600.0);
        assert!(controls.update(&mut camera));
        for _ in 0..200 {
            controls.update(&mut camera);
        }
        assert!(!controls.is_moving());
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();
        controls.enabled = false;
        controls.rotate(Vec2::new(100.0, 50.0), 600.0);
        controls.zoom(3.0);
        assert!(!controls.is_moving());
    }
}

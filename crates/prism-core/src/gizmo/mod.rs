//! Transform gizmo
//!
//! The gizmo is attached to at most one node. It picks its handles with ray
//! tests, converts pointer drags into translation, rotation or scale of the
//! attached transform, and reports [`GizmoEvent`]s so the caller can suspend
//! orbit controls while dragging and repaint on every change.

pub mod collision;

use glam::{EulerRot, Quat, Vec3};

use crate::camera::PerspectiveCamera;
use crate::constants::gizmo as constants;
use crate::scene::{NodeId, Transform};
use crate::settings::AffineMode;

use collision::{
    ray_cylinder_intersection, ray_plane_intersection, ray_ring_intersection,
    ray_sphere_intersection,
};

/// Gizmo interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl GizmoMode {
    /// Mode for an affine setting; `None` leaves the gizmo detached
    pub fn from_affine(mode: AffineMode) -> Option<Self> {
        match mode {
            AffineMode::None => None,
            AffineMode::Translate => Some(Self::Translate),
            AffineMode::Rotate => Some(Self::Rotate),
            AffineMode::Scale => Some(Self::Scale),
        }
    }
}

/// Gizmo handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoAxis {
    #[default]
    None,
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 3] = [Self::X, Self::Y, Self::Z];

    /// Index used by the shaders, -1 for none
    pub fn to_index(&self) -> i32 {
        match self {
            GizmoAxis::None => -1,
            GizmoAxis::X => 0,
            GizmoAxis::Y => 1,
            GizmoAxis::Z => 2,
        }
    }

    pub fn direction(&self) -> Vec3 {
        match self {
            GizmoAxis::None => Vec3::ZERO,
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
        }
    }
}

/// Notification emitted by the gizmo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoEvent {
    /// A drag started (`true`) or ended (`false`)
    DraggingChanged(bool),
    /// The attached transform changed
    Changed,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    axis: GizmoAxis,
    last_point: Vec3,
    last_angle: f32,
}

#[derive(Debug, Clone, Default)]
pub struct TransformGizmo {
    target: Option<NodeId>,
    mode: GizmoMode,
    /// Cached world position of the target
    position: Vec3,
    hovered: GizmoAxis,
    drag: Option<DragState>,
}

impl TransformGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to `target`, replacing any previous attachment
    pub fn attach(&mut self, target: NodeId, transform: &Transform) {
        self.detach();
        self.target = Some(target);
        self.update(transform);
    }

    /// Detach; an ongoing drag is abandoned
    pub fn detach(&mut self) -> Option<GizmoEvent> {
        self.target = None;
        self.hovered = GizmoAxis::None;
        self.drag
            .take()
            .map(|_| GizmoEvent::DraggingChanged(false))
    }

    pub fn set_mode(&mut self, mode: GizmoMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Refresh the cached pose after the target moved outside the gizmo
    pub fn update(&mut self, transform: &Transform) {
        self.position = transform.position;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Handle drawn highlighted: the dragged one, else the hovered one
    pub fn highlighted_axis(&self) -> GizmoAxis {
        self.drag.map_or(self.hovered, |d| d.axis)
    }

    pub fn set_hovered(&mut self, axis: GizmoAxis) {
        self.hovered = axis;
    }

    /// World size of one gizmo unit for a constant on-screen size
    pub fn world_scale(&self, camera: &PerspectiveCamera) -> f32 {
        let distance = (self.position - camera.position).length().max(1e-3);
        2.0 * distance * (camera.fov.to_radians() * 0.5).tan() * constants::SCREEN_FRACTION
    }

    /// Closest handle under the ray
    pub fn hit_test(&self, origin: Vec3, dir: Vec3, camera: &PerspectiveCamera) -> GizmoAxis {
        if self.target.is_none() {
            return GizmoAxis::None;
        }
        let scale = self.world_scale(camera);
        let center = self.position;

        let distance_to = |axis: GizmoAxis| -> Option<f32> {
            let axis_dir = axis.direction();
            match self.mode {
                GizmoMode::Translate => ray_cylinder_intersection(
                    origin,
                    dir,
                    center,
                    center + axis_dir * constants::ARROW_LENGTH * scale,
                    constants::HIT_RADIUS * scale,
                ),
                GizmoMode::Rotate => ray_ring_intersection(
                    origin,
                    dir,
                    center,
                    axis_dir,
                    constants::RING_RADIUS * scale,
                    constants::RING_HIT_THICKNESS * scale,
                ),
                GizmoMode::Scale => ray_sphere_intersection(
                    origin,
                    dir,
                    center + axis_dir * constants::SCALE_AXIS_LENGTH * scale,
                    constants::SCALE_HIT_SIZE * scale,
                ),
            }
        };

        GizmoAxis::ALL
            .into_iter()
            .filter_map(|axis| distance_to(axis).map(|t| (axis, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(GizmoAxis::None, |(axis, _)| axis)
    }

    /// Start dragging `axis` from the pointer ray
    pub fn begin_drag(
        &mut self,
        axis: GizmoAxis,
        origin: Vec3,
        dir: Vec3,
        camera: &PerspectiveCamera,
    ) -> Option<GizmoEvent> {
        if axis == GizmoAxis::None || self.target.is_none() || self.drag.is_some() {
            return None;
        }

        let normal = self.drag_plane_normal(axis, camera);
        let point = ray_plane_intersection(origin, dir, self.position, normal)?;
        let last_angle = match self.mode {
            GizmoMode::Rotate => angle_on_plane(point - self.position, axis.direction()),
            _ => 0.0,
        };
        self.drag = Some(DragState {
            axis,
            last_point: point,
            last_angle,
        });
        Some(GizmoEvent::DraggingChanged(true))
    }

    /// Apply pointer motion to `transform`
    ///
    /// Returns [`GizmoEvent::Changed`] when the transform was modified.
    pub fn drag(
        &mut self,
        origin: Vec3,
        dir: Vec3,
        camera: &PerspectiveCamera,
        transform: &mut Transform,
    ) -> Option<GizmoEvent> {
        let state = self.drag?;
        let axis_dir = state.axis.direction();
        let normal = self.drag_plane_normal(state.axis, camera);
        let point = ray_plane_intersection(origin, dir, self.position, normal)?;

        match self.mode {
            GizmoMode::Translate => {
                let delta = axis_dir * (point - state.last_point).dot(axis_dir);
                transform.position += delta;
                self.position = transform.position;
                self.set_last(point, 0.0);
            }
            GizmoMode::Rotate => {
                let angle = angle_on_plane(point - self.position, axis_dir);
                let delta = wrap_angle(angle - state.last_angle);
                let current = Quat::from_euler(
                    EulerRot::XYZ,
                    transform.rotation.x,
                    transform.rotation.y,
                    transform.rotation.z,
                );
                let rotated = Quat::from_axis_angle(axis_dir, delta) * current;
                let (x, y, z) = rotated.to_euler(EulerRot::XYZ);
                transform.rotation = Vec3::new(x, y, z);
                self.set_last(point, angle);
            }
            GizmoMode::Scale => {
                let scale = self.world_scale(camera);
                let moved = (point - state.last_point).dot(axis_dir) / scale;
                let factor =
                    1.0 + moved * constants::SCALE_SENSITIVITY / constants::SCALE_AXIS_LENGTH;
                let mut scaled = transform.scale;
                match state.axis {
                    GizmoAxis::X => scaled.x *= factor,
                    GizmoAxis::Y => scaled.y *= factor,
                    GizmoAxis::Z => scaled.z *= factor,
                    GizmoAxis::None => {}
                }
                transform.scale = scaled.max(Vec3::splat(constants::MIN_SCALE));
                self.set_last(point, 0.0);
            }
        }
        Some(GizmoEvent::Changed)
    }

    /// Finish the current drag
    pub fn end_drag(&mut self) -> Option<GizmoEvent> {
        self.drag
            .take()
            .map(|_| GizmoEvent::DraggingChanged(false))
    }

    fn set_last(&mut self, point: Vec3, angle: f32) {
        if let Some(state) = self.drag.as_mut() {
            state.last_point = point;
            state.last_angle = angle;
        }
    }

    /// Plane a drag on `axis` moves in
    ///
    /// Rotation drags stay on the ring plane. Translate and scale drags use the
    /// plane containing the axis that faces the camera the most.
    fn drag_plane_normal(&self, axis: GizmoAxis, camera: &PerspectiveCamera) -> Vec3 {
        let forward = (camera.target - camera.position).normalize_or(Vec3::NEG_Z);
        let axis_dir = axis.direction();
        if axis == GizmoAxis::None {
            return forward;
        }
        if self.mode == GizmoMode::Rotate {
            return axis_dir;
        }

        let up = if axis_dir.y.abs() < 0.9 { Vec3::Y } else { Vec3::X };
        let first = axis_dir.cross(up).normalize();
        let second = axis_dir.cross(first).normalize();
        if forward.dot(first).abs() > forward.dot(second).abs() {
            first
        } else {
            second
        }
    }
}

/// Angle of `offset` around `axis`, measured counter-clockwise
fn angle_on_plane(offset: Vec3, axis: Vec3) -> f32 {
    let up = if axis.y.abs() < 0.9 { Vec3::Y } else { Vec3::X };
    let u = up.cross(axis).normalize();
    let v = axis.cross(u);
    offset.dot(v).atan2(offset.dot(u))
}

fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec2;

    use super::*;

    fn front_camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::default();
        camera.position = Vec3::new(0.0, 0.5, 10.0);
        camera.target = Vec3::new(0.0, 0.5, 0.0);
        camera.fov = 50.0;
        camera.update_projection_matrix();
        camera
    }

    fn attached(mode: GizmoMode) -> (TransformGizmo, Transform) {
        let transform = Transform::resting();
        let mut gizmo = TransformGizmo::new();
        gizmo.attach(NodeId::new(), &transform);
        gizmo.set_mode(mode);
        (gizmo, transform)
    }

    fn ray_at(camera: &PerspectiveCamera, world: Vec3) -> (Vec3, Vec3) {
        (camera.position, (world - camera.position).normalize())
    }

    #[test]
    fn test_detached_gizmo_hits_nothing() {
        let camera = front_camera();
        let gizmo = TransformGizmo::new();
        let (o, d) = ray_at(&camera, Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(gizmo.hit_test(o, d, &camera), GizmoAxis::None);
    }

    #[test]
    fn test_translate_hit_and_drag() {
        let camera = front_camera();
        let (mut gizmo, mut transform) = attached(GizmoMode::Translate);
        let scale = gizmo.world_scale(&camera);

        let handle = gizmo.position() + Vec3::X * 0.6 * scale;
        let (o, d) = ray_at(&camera, handle);
        assert_eq!(gizmo.hit_test(o, d, &camera), GizmoAxis::X);

        assert_eq!(
            gizmo.begin_drag(GizmoAxis::X, o, d, &camera),
            Some(GizmoEvent::DraggingChanged(true))
        );
        assert!(gizmo.is_dragging());

        let (o, d) = ray_at(&camera, handle + Vec3::new(1.0, 0.3, 0.0));
        assert_eq!(
            gizmo.drag(o, d, &camera, &mut transform),
            Some(GizmoEvent::Changed)
        );
        assert_relative_eq!(transform.position.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(transform.position.y, 0.5, epsilon = 1e-5);
        assert_eq!(gizmo.position(), transform.position);

        assert_eq!(gizmo.end_drag(), Some(GizmoEvent::DraggingChanged(false)));
        assert_eq!(gizmo.end_drag(), None);
    }

    #[test]
    fn test_rotate_about_z() {
        let camera = front_camera();
        let (mut gizmo, mut transform) = attached(GizmoMode::Rotate);
        let radius = constants::RING_RADIUS * gizmo.world_scale(&camera);
        let center = gizmo.position();

        let start = center + Vec3::X * radius;
        let (o, d) = ray_at(&camera, start);
        assert_eq!(gizmo.hit_test(o, d, &camera), GizmoAxis::Z);
        gizmo.begin_drag(GizmoAxis::Z, o, d, &camera).unwrap();

        let end = center + Vec3::Y * radius;
        let (o, d) = ray_at(&camera, end);
        gizmo.drag(o, d, &camera, &mut transform).unwrap();
        assert_relative_eq!(transform.rotation.z, std::f32::consts::FRAC_PI_2, epsilon = 1e-3);
        assert_relative_eq!(transform.rotation.x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_scale_grows_one_axis() {
        let camera = front_camera();
        let (mut gizmo, mut transform) = attached(GizmoMode::Scale);
        let scale = gizmo.world_scale(&camera);
        let handle = gizmo.position() + Vec3::Y * constants::SCALE_AXIS_LENGTH * scale;

        let (o, d) = ray_at(&camera, handle);
        assert_eq!(gizmo.hit_test(o, d, &camera), GizmoAxis::Y);
        gizmo.begin_drag(GizmoAxis::Y, o, d, &camera).unwrap();

        let (o, d) = ray_at(&camera, handle + Vec3::Y * 0.5 * scale);
        gizmo.drag(o, d, &camera, &mut transform).unwrap();
        assert!(transform.scale.y > 1.0);
        assert_eq!(transform.scale.x, 1.0);
        assert_eq!(transform.scale.z, 1.0);
    }

    #[test]
    fn test_detach_ends_drag() {
        let camera = front_camera();
        let (mut gizmo, _) = attached(GizmoMode::Translate);
        let handle = gizmo.position() + Vec3::X * 0.5 * gizmo.world_scale(&camera);
        let (o, d) = ray_at(&camera, handle);
        gizmo.begin_drag(GizmoAxis::X, o, d, &camera).unwrap();
        assert_eq!(gizmo.detach(), Some(GizmoEvent::DraggingChanged(false)));
        assert!(gizmo.target().is_none());
        assert_eq!(gizmo.highlighted_axis(), GizmoAxis::None);
    }

    #[test]
    fn test_screen_ray_picks_handle() {
        let camera = front_camera();
        let (gizmo, _) = attached(GizmoMode::Translate);
        let size = Vec2::new(800.0, 600.0);
        let handle = gizmo.position() + Vec3::Y * 0.6 * gizmo.world_scale(&camera);
        let ndc = camera.view_projection().project_point3(handle);
        let screen = Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y);
        let (o, d) = camera.screen_to_ray(screen, size);
        assert_eq!(gizmo.hit_test(o, d, &camera), GizmoAxis::Y);
    }
}

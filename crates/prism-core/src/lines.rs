//! Line-list overlays: axes, light helpers and gizmo handles
//!
//! Every builder returns world-space segments; consecutive vertex pairs form
//! one segment.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::constants::gizmo as gizmo_size;
use crate::gizmo::{GizmoAxis, GizmoMode};
use crate::light::{HelperKind, Light};

/// Axis colors shared by the axes helper and the gizmo
const AXIS_COLORS: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Color of the hovered or dragged gizmo handle
const HIGHLIGHT: [f32; 3] = [1.0, 1.0, 0.0];

const CIRCLE_SEGMENTS: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSegments {
    pub vertices: Vec<LineVertex>,
}

impl LineSegments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn push(&mut self, a: Vec3, b: Vec3, color: [f32; 3]) {
        self.vertices.push(LineVertex {
            position: a.to_array(),
            color,
        });
        self.vertices.push(LineVertex {
            position: b.to_array(),
            color,
        });
    }

    pub fn extend(&mut self, other: LineSegments) {
        self.vertices.extend(other.vertices);
    }

    /// Closed polyline around `center` in the plane spanned by `u` and `v`
    fn circle(&mut self, center: Vec3, u: Vec3, v: Vec3, radius: f32, color: [f32; 3]) {
        let point = |i: usize| {
            let a = i as f32 / CIRCLE_SEGMENTS as f32 * TAU;
            center + (u * a.cos() + v * a.sin()) * radius
        };
        for i in 0..CIRCLE_SEGMENTS {
            self.push(point(i), point(i + 1), color);
        }
    }

    /// The three world axes from the origin, colored X red, Y green, Z blue
    pub fn axes(size: f32) -> Self {
        let mut lines = Self::new();
        for (axis, color) in [Vec3::X, Vec3::Y, Vec3::Z].into_iter().zip(AXIS_COLORS) {
            lines.push(Vec3::ZERO, axis * size, color);
        }
        lines
    }

    /// Outline of a light helper
    pub fn light_helper(kind: HelperKind, light: &Light) -> Self {
        let mut lines = Self::new();
        let color = light.color.to_array();
        let position = light.position;
        let direction = light.direction();
        let (u, v) = plane_basis(direction);

        match kind {
            HelperKind::Directional { size } => {
                let h = size * 0.5;
                let corners = [(-h, -h), (h, -h), (h, h), (-h, h)]
                    .map(|(a, b)| position + u * a + v * b);
                for i in 0..4 {
                    lines.push(corners[i], corners[(i + 1) % 4], color);
                }
                lines.push(position, light.target, color);
            }
            HelperKind::Hemisphere { size } => {
                let sky = light.color.to_array();
                let ground = light.ground_color.to_array();
                let top = position + Vec3::Y * size;
                let bottom = position - Vec3::Y * size;
                let ring =
                    [Vec3::X, Vec3::Z, Vec3::NEG_X, Vec3::NEG_Z].map(|d| position + d * size);
                for i in 0..4 {
                    lines.push(ring[i], ring[(i + 1) % 4], blend(sky, ground));
                    lines.push(top, ring[i], sky);
                    lines.push(bottom, ring[i], ground);
                }
            }
            HelperKind::Point { radius } => {
                lines.circle(position, Vec3::X, Vec3::Y, radius, color);
                lines.circle(position, Vec3::X, Vec3::Z, radius, color);
                lines.circle(position, Vec3::Y, Vec3::Z, radius, color);
            }
            HelperKind::Spot => {
                let length = if light.distance > 0.0 {
                    light.distance
                } else {
                    position.distance(light.target).max(1.0)
                };
                let radius = light.angle.tan() * length;
                let base = position + direction * length;
                lines.circle(base, u, v, radius, color);
                for a in [0.0, 0.25, 0.5, 0.75] {
                    let a: f32 = a * TAU;
                    lines.push(position, base + (u * a.cos() + v * a.sin()) * radius, color);
                }
            }
        }
        lines
    }

    /// Gizmo handles around `center`, sized by `scale` world units per gizmo unit
    pub fn gizmo(mode: GizmoMode, highlighted: GizmoAxis, center: Vec3, scale: f32) -> Self {
        let mut lines = Self::new();
        for (axis, base_color) in GizmoAxis::ALL.into_iter().zip(AXIS_COLORS) {
            let color = if axis == highlighted { HIGHLIGHT } else { base_color };
            let dir = axis.direction();
            let (u, v) = plane_basis(dir);

            match mode {
                GizmoMode::Translate => {
                    let tip = center + dir * gizmo_size::ARROW_LENGTH * scale;
                    lines.push(center, tip, color);
                    let back = tip - dir * 0.15 * scale;
                    for side in [u, -u, v, -v] {
                        lines.push(tip, back + side * 0.06 * scale, color);
                    }
                }
                GizmoMode::Rotate => {
                    lines.circle(center, u, v, gizmo_size::RING_RADIUS * scale, color);
                }
                GizmoMode::Scale => {
                    let end = center + dir * gizmo_size::SCALE_AXIS_LENGTH * scale;
                    lines.push(center, end, color);
                    lines.extend(Self::cube(end, 0.06 * scale, color));
                }
            }
        }
        lines
    }

    fn cube(center: Vec3, half: f32, color: [f32; 3]) -> Self {
        let mut lines = Self::new();
        let corner = |i: usize| {
            center
                + Vec3::new(
                    if i & 1 == 0 { -half } else { half },
                    if i & 2 == 0 { -half } else { half },
                    if i & 4 == 0 { -half } else { half },
                )
        };
        for i in 0..8 {
            for bit in [1, 2, 4] {
                if i & bit == 0 {
                    lines.push(corner(i), corner(i | bit), color);
                }
            }
        }
        lines
    }
}

/// Two unit vectors spanning the plane perpendicular to `normal`
fn plane_basis(normal: Vec3) -> (Vec3, Vec3) {
    let up = if normal.y.abs() < 0.9 { Vec3::Y } else { Vec3::X };
    let u = up.cross(normal).normalize();
    (u, normal.cross(u))
}

fn blend(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [(a[0] + b[0]) * 0.5, (a[1] + b[1]) * 0.5, (a[2] + b[2]) * 0.5]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{LightSettings, LightSource, SceneSettings};

    fn light(source: LightSource) -> Light {
        let settings = LightSettings {
            source,
            ..LightSettings::default()
        };
        Light::from_settings(&settings, &SceneSettings::default())
    }

    #[test]
    fn test_axes() {
        let axes = LineSegments::axes(5.0);
        assert_eq!(axes.segment_count(), 3);
        assert_eq!(axes.vertices[1].position, [5.0, 0.0, 0.0]);
        assert_eq!(axes.vertices[5].color, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_helpers_are_built_at_the_light() {
        for source in [
            LightSource::Directional,
            LightSource::Hemisphere,
            LightSource::Point,
            LightSource::Spot,
        ] {
            let light = light(source);
            let kind = light.helper().unwrap();
            let lines = LineSegments::light_helper(kind, &light);
            assert!(!lines.is_empty());
            assert_eq!(lines.vertices.len() % 2, 0);
        }
    }

    #[test]
    fn test_gizmo_highlight() {
        let lines = LineSegments::gizmo(GizmoMode::Translate, GizmoAxis::Y, Vec3::ZERO, 1.0);
        assert!(lines.vertices.iter().any(|v| v.color == HIGHLIGHT));
        assert!(!lines.vertices.iter().any(|v| v.color == AXIS_COLORS[1]));

        let rings = LineSegments::gizmo(GizmoMode::Rotate, GizmoAxis::None, Vec3::ZERO, 1.0);
        assert_eq!(rings.segment_count(), 3 * CIRCLE_SEGMENTS);

        let handles = LineSegments::gizmo(GizmoMode::Scale, GizmoAxis::None, Vec3::ZERO, 1.0);
        assert_eq!(handles.segment_count(), 3 * (1 + 12));
    }
}

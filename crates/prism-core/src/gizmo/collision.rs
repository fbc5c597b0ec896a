//! Ray picking against gizmo handles
//!
//! Every test returns the ray parameter `t` of the nearest hit in front of
//! the ray origin; the hit point is `origin + dir * t`.

use glam::Vec3;

/// Ray against the side of a finite cylinder
///
/// The ray and the cylinder axis are projected onto the plane perpendicular to
/// the axis, which turns the test into a 2D circle quadratic. The hit is then
/// rejected if it lies beyond either end of the axis segment.
///
/// # Arguments
/// * `origin` - Ray origin
/// * `dir` - Normalized ray direction
/// * `start` - First end of the cylinder axis
/// * `end` - Second end of the cylinder axis
/// * `radius` - Cylinder radius
pub fn ray_cylinder_intersection(
    origin: Vec3,
    dir: Vec3,
    start: Vec3,
    end: Vec3,
    radius: f32,
) -> Option<f32> {
    let length = start.distance(end);
    if length <= f32::EPSILON {
        return None;
    }
    let axis = (end - start) / length;

    let rel = origin - start;
    let d = dir - axis * dir.dot(axis);
    let o = rel - axis * rel.dot(axis);

    let a = d.length_squared();
    if a <= f32::EPSILON {
        // Ray runs along the axis
        return None;
    }
    let b = 2.0 * d.dot(o);
    let c = o.length_squared() - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    if t < 0.0 {
        return None;
    }

    let along = (origin + dir * t - start).dot(axis);
    (0.0..=length).contains(&along).then_some(t)
}

/// Ray against a flat annulus of `radius` ± `thickness`
pub fn ray_ring_intersection(
    origin: Vec3,
    dir: Vec3,
    center: Vec3,
    normal: Vec3,
    radius: f32,
    thickness: f32,
) -> Option<f32> {
    let hit = ray_plane_intersection(origin, dir, center, normal)?;
    let t = hit.distance(origin);
    ((hit.distance(center) - radius).abs() <= thickness).then_some(t)
}

/// Ray against a sphere
pub fn ray_sphere_intersection(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let a = dir.length_squared();
    let b = 2.0 * oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    (t > 0.0).then_some(t)
}

/// Point where a ray crosses a plane, if in front of the origin
pub fn ray_plane_intersection(
    origin: Vec3,
    dir: Vec3,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> Option<Vec3> {
    let denom = dir.dot(plane_normal);
    if denom.abs() < 1e-6 {
        return None;
    }

    let t = (plane_point - origin).dot(plane_normal) / denom;
    (t >= 0.0).then(|| origin + dir * t)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_ray_hits_cylinder() {
        let t = ray_cylinder_intersection(
            Vec3::new(0.5, 0.0, 1.0),
            Vec3::NEG_Z,
            Vec3::ZERO,
            Vec3::X,
            0.1,
        );
        assert_relative_eq!(t.unwrap(), 0.9, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_misses_cylinder() {
        let away = ray_cylinder_intersection(
            Vec3::new(0.5, 0.0, 1.0),
            Vec3::Z,
            Vec3::ZERO,
            Vec3::X,
            0.1,
        );
        assert!(away.is_none());

        let past_end = ray_cylinder_intersection(
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::NEG_Z,
            Vec3::ZERO,
            Vec3::X,
            0.1,
        );
        assert!(past_end.is_none());
    }

    #[test]
    fn test_ray_ring() {
        let center = Vec3::ZERO;
        let on_ring = ray_ring_intersection(
            Vec3::new(1.0, 0.0, 5.0),
            Vec3::NEG_Z,
            center,
            Vec3::Z,
            1.0,
            0.05,
        );
        assert_relative_eq!(on_ring.unwrap(), 5.0, epsilon = 1e-5);

        let inside = ray_ring_intersection(
            Vec3::new(0.2, 0.0, 5.0),
            Vec3::NEG_Z,
            center,
            Vec3::Z,
            1.0,
            0.05,
        );
        assert!(inside.is_none());

        let edge_on = ray_ring_intersection(
            Vec3::new(1.0, 0.0, 5.0),
            Vec3::X,
            center,
            Vec3::Z,
            1.0,
            0.05,
        );
        assert!(edge_on.is_none());
    }

    #[test]
    fn test_ray_sphere() {
        let t = ray_sphere_intersection(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::ZERO, 1.0);
        assert_relative_eq!(t.unwrap(), 4.0, epsilon = 1e-5);
        let miss = ray_sphere_intersection(Vec3::new(0.0, 3.0, 5.0), Vec3::NEG_Z, Vec3::ZERO, 1.0);
        assert!(miss.is_none());
    }

    #[test]
    fn test_ray_plane_behind_origin() {
        let hit = ray_plane_intersection(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, Vec3::ZERO, Vec3::Y);
        assert!(hit.is_none());
    }
}

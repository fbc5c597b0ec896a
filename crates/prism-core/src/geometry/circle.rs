//! Flat disk in the XY plane

use std::f32::consts::PI;

use super::Geometry;

/// Generate a disk facing +Z
pub fn generate_circle(radius: f32, segments: u32) -> Geometry {
    let segments = segments.max(3);
    let mut geometry = Geometry::empty("Circle");

    geometry.positions.push([0.0, 0.0, 0.0]);
    geometry.normals.push([0.0, 0.0, 1.0]);
    geometry.uvs.push([0.5, 0.5]);

    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        geometry.positions.push([radius * cos, radius * sin, 0.0]);
        geometry.normals.push([0.0, 0.0, 1.0]);
        geometry.uvs.push([(cos + 1.0) * 0.5, (1.0 - sin) * 0.5]);
    }

    for i in 1..=segments {
        geometry.indices.extend_from_slice(&[i, i + 1, 0]);
    }

    geometry
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn test_circle() {
        let disk = generate_circle(5.0, 32);
        assert!(disk.is_valid());
        assert_eq!(disk.triangle_count(), 32);
        assert!((disk.bounding_radius() - 5.0).abs() < 1e-4);

        let tri = &disk.indices[0..3];
        let a = Vec3::from_array(disk.positions[tri[0] as usize]);
        let b = Vec3::from_array(disk.positions[tri[1] as usize]);
        let c = Vec3::from_array(disk.positions[tri[2] as usize]);
        assert!((b - a).cross(c - a).z > 0.0);
    }
}

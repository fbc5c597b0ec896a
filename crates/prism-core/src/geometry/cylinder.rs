//! Cylinder and cone mesh generation (with end caps)

use std::f32::consts::PI;

use glam::Vec3;

use super::Geometry;

/// Generate a cone along the Y axis with its apex at `+height / 2`
pub fn generate_cone(radius: f32, height: f32, radial_segments: u32) -> Geometry {
    let mut cone = generate_cylinder(0.0, radius, height, radial_segments);
    cone.label = "Cone".to_string();
    cone
}

/// Generate a (possibly tapered) cylinder along the Y axis
///
/// # Arguments
/// * `radius_top` - Radius at `+height / 2`
/// * `radius_bottom` - Radius at `-height / 2`
/// * `height` - Length along Y
/// * `radial_segments` - Number of segments around the axis
pub fn generate_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> Geometry {
    let segments = radial_segments.max(3);
    let half_height = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;

    let mut geometry = Geometry::empty("Cylinder");

    // Side: two rings of vertices, top ring first
    for row in 0..=1u32 {
        let v = row as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        let y = half_height - v * height;
        for i in 0..=segments {
            let u = i as f32 / segments as f32;
            let theta = u * 2.0 * PI;
            let (sin, cos) = theta.sin_cos();
            geometry.positions.push([radius * sin, y, radius * cos]);
            geometry
                .normals
                .push(Vec3::new(sin, slope, cos).normalize().to_array());
            geometry.uvs.push([u, v]);
        }
    }

    let row = segments + 1;
    for i in 0..segments {
        let a = i;
        let b = row + i;
        let c = row + i + 1;
        let d = i + 1;
        // Skip triangles collapsed onto a zero-radius ring
        if radius_top > 0.0 {
            geometry.indices.extend_from_slice(&[a, b, d]);
        }
        if radius_bottom > 0.0 {
            geometry.indices.extend_from_slice(&[b, c, d]);
        }
    }

    if radius_top > 0.0 {
        push_cap(&mut geometry, radius_top, half_height, segments, true);
    }
    if radius_bottom > 0.0 {
        push_cap(&mut geometry, radius_bottom, -half_height, segments, false);
    }

    geometry
}

fn push_cap(geometry: &mut Geometry, radius: f32, y: f32, segments: u32, top: bool) {
    let sign = if top { 1.0 } else { -1.0 };
    let normal = [0.0, sign, 0.0];

    let center = geometry.positions.len() as u32;
    geometry.positions.push([0.0, y, 0.0]);
    geometry.normals.push(normal);
    geometry.uvs.push([0.5, 0.5]);

    let rim = geometry.positions.len() as u32;
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        geometry.positions.push([radius * sin, y, radius * cos]);
        geometry.normals.push(normal);
        geometry.uvs.push([cos * 0.5 + 0.5, 0.5 - sin * 0.5 * sign]);
    }

    for i in 0..segments {
        if top {
            geometry.indices.extend_from_slice(&[rim + i, rim + i + 1, center]);
        } else {
            geometry.indices.extend_from_slice(&[rim + i + 1, rim + i, center]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cylinder_mesh() {
        let mesh = generate_cylinder(1.0, 1.0, 1.5, 32);
        assert!(mesh.is_valid());
        // Side quads plus two caps
        assert_eq!(mesh.triangle_count(), 32 * 2 + 32 * 2);
        let (min, max) = mesh.bounds().unwrap();
        assert!((max.y - 0.75).abs() < 1e-5);
        assert!((min.y + 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_cone_has_no_top_cap() {
        let mesh = generate_cone(1.0, 2.0, 16);
        assert!(mesh.is_valid());
        // One side triangle per segment plus the bottom cap
        assert_eq!(mesh.triangle_count(), 16 + 16);
        let (_, max) = mesh.bounds().unwrap();
        assert!((max.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_cap_faces_outward() {
        let mesh = generate_cylinder(1.0, 1.0, 1.0, 8);
        let last = mesh.indices.len() - 3;
        let tri = &mesh.indices[last..];
        let a = Vec3::from_array(mesh.positions[tri[0] as usize]);
        let b = Vec3::from_array(mesh.positions[tri[1] as usize]);
        let c = Vec3::from_array(mesh.positions[tri[2] as usize]);
        // Bottom cap triangle points down
        assert!((b - a).cross(c - a).y < 0.0);
    }
}

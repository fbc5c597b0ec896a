//! Sphere mesh generation (UV sphere)

use std::f32::consts::PI;

use super::Geometry;

/// Generate a UV sphere around the Y axis
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `width_segments` - Number of longitude segments
/// * `height_segments` - Number of latitude bands
pub fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI; // 0 at the north pole

        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * 2.0 * PI;

            let x = -phi.cos() * theta.sin();
            let y = theta.cos();
            let z = phi.sin() * theta.sin();

            positions.push([radius * x, radius * y, radius * z]);
            normals.push([x, y, z]);
            uvs.push([u, v]);
        }
    }

    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            // Pole rows collapse to a single triangle
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry::new("Sphere", positions, normals, uvs, indices)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn test_sphere_vertices_on_surface() {
        let sphere = generate_sphere(2.0, 16, 8);
        for p in &sphere.positions {
            assert!((Vec3::from_array(*p).length() - 2.0).abs() < 1e-4);
        }
        assert!(sphere.is_valid());
    }

    #[test]
    fn test_sphere_triangle_count() {
        let sphere = generate_sphere(1.0, 32, 32);
        // Two triangles per quad minus one per quad on each pole row
        assert_eq!(sphere.triangle_count(), 32 * 32 * 2 - 2 * 32);
    }
}
